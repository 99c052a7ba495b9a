use crate::app::App;
use colored::Colorize;

pub async fn handle(app: &App, name: String) -> anyhow::Result<()> {
    let azure = app.azure().await?;
    println!("{}", format!("Creating VM '{}'...", name).yellow());
    println!("Resource group: {}", azure.lifecycle.resource_group().cyan());
    println!();

    println!("{}", "[1/3] Provisioning Azure resources...".dimmed());
    let creds = azure
        .lifecycle
        .create(&name, &azure.settings.admin_username)
        .await?;
    println!("{}", "✓ [1/3] Azure resources provisioned".green());

    // recorded before the IP lookup so a lookup failure cannot lose the password
    println!("{}", "[2/3] Recording credentials...".dimmed());
    app.store.save(&name, creds.clone()).await?;
    println!(
        "{}",
        format!("✓ [2/3] Credentials saved to {}", app.store.path().display()).green()
    );

    println!("{}", "[3/3] Getting IP address...".dimmed());
    let ip = match azure.lifecycle.public_ip(&name).await {
        Ok(ip) => {
            println!("{}", "✓ [3/3] IP address retrieved".green());
            Some(ip)
        }
        Err(e) => {
            println!("{}", format!("⚠ Could not get IP address: {}", e).yellow());
            None
        }
    };

    println!();
    println!("{}", format!("✓ VM '{}' created", name).green().bold());
    println!("  IP:       {}", ip.as_deref().unwrap_or("unknown").cyan());
    println!("  Username: {}", creds.username.cyan());
    println!("  Password: {}", creds.password.cyan());
    println!();
    println!(
        "{}",
        format!("Retrieve these later with: rdp get {}", name).dimmed()
    );

    Ok(())
}
