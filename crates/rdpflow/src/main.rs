mod app;
mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rdp")]
#[command(about = "Disposable Azure remote-desktop VMs, one command each.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a VM and record its credentials
    Create {
        /// VM name
        name: String,
    },
    /// Delete a VM together with its NICs, public IPs, NSGs and OS disk
    Delete {
        /// VM name
        name: String,
        /// Skip the confirmation warning and delete right away
        #[arg(short, long)]
        yes: bool,
    },
    /// Start a VM and report its public IP once it is up
    Start {
        /// VM name
        name: String,
    },
    /// Deallocate a VM and report its power state afterwards
    Stop {
        /// VM name
        name: String,
    },
    /// Show the public IP of a VM
    Ip {
        /// VM name
        name: String,
    },
    /// List VMs in the resource group
    List,
    /// List VMs with recorded credentials
    Saved,
    /// Show recorded credentials and the current IP of a VM
    Get {
        /// VM name
        name: String,
    },
    /// Drop the recorded credentials of a VM without touching Azure
    Forget {
        /// VM name
        name: String,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // version needs no settings
    if matches!(cli.command, Commands::Version) {
        println!("rdpflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let app = app::App::init().await?;

    match cli.command {
        Commands::Create { name } => commands::create::handle(&app, name).await?,
        Commands::Delete { name, yes } => commands::delete::handle(&app, name, yes).await?,
        Commands::Start { name } => commands::power::handle_start(&app, name).await?,
        Commands::Stop { name } => commands::power::handle_stop(&app, name).await?,
        Commands::Ip { name } => commands::info::handle_ip(&app, name).await?,
        Commands::List => commands::info::handle_list(&app).await?,
        Commands::Saved => commands::saved::handle_saved(&app).await?,
        Commands::Get { name } => commands::saved::handle_get(&app, name).await?,
        Commands::Forget { name } => commands::saved::handle_forget(&app, name).await?,
        Commands::Version => unreachable!(),
    }

    Ok(())
}
