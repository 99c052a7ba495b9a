use crate::app::App;
use colored::Colorize;

pub async fn handle_ip(app: &App, name: String) -> anyhow::Result<()> {
    let azure = app.azure().await?;
    let ip = azure.lifecycle.public_ip(&name).await?;
    if ip.is_empty() {
        println!("{}", format!("ℹ VM '{}' has no public IP", name).dimmed());
    } else {
        println!("{}: {}", name, ip.cyan());
    }
    Ok(())
}

pub async fn handle_list(app: &App) -> anyhow::Result<()> {
    let azure = app.azure().await?;
    let table = azure.lifecycle.list().await?;
    if table.trim().is_empty() {
        println!(
            "{}",
            format!("ℹ No VMs in {}", azure.lifecycle.resource_group()).dimmed()
        );
    } else {
        println!("{}", table.trim_end());
    }
    Ok(())
}
