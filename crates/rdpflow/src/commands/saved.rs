use crate::app::App;
use colored::Colorize;

pub async fn handle_saved(app: &App) -> anyhow::Result<()> {
    let saved = app.store.list().await;
    if saved.is_empty() {
        println!("No VMs saved.");
        return Ok(());
    }

    println!("{}", "Saved VMs:".bold());
    for vm in saved {
        println!("  {}", vm);
    }
    Ok(())
}

pub async fn handle_get(app: &App, name: String) -> anyhow::Result<()> {
    let Some(creds) = app.store.get(&name).await else {
        println!(
            "{}",
            format!("VM '{}' not found. Run `rdp saved` to see recorded VMs.", name).yellow()
        );
        return Ok(());
    };

    println!("{}", format!("VM '{}'", name).bold());
    println!("  Username: {}", creds.username.cyan());
    println!("  Password: {}", creds.password.cyan());

    // credentials are still useful when Azure cannot be reached
    let ip = match app.azure().await {
        Ok(azure) => azure
            .lifecycle
            .public_ip(&name)
            .await
            .map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    match ip {
        Ok(ip) => println!("  IP:       {}", ip.cyan()),
        Err(e) => {
            tracing::debug!("IP lookup for {} failed: {}", name, e);
            println!(
                "{}",
                "⚠ Could not get IP address. The VM exists in the local record but may not be active on Azure."
                    .yellow()
            );
        }
    }
    Ok(())
}

pub async fn handle_forget(app: &App, name: String) -> anyhow::Result<()> {
    if app.store.get(&name).await.is_none() {
        println!("{}", format!("ℹ No credentials recorded for '{}'", name).dimmed());
        return Ok(());
    }
    app.store.remove(&name).await?;
    println!("{}", format!("✓ Forgot credentials for '{}'", name).green());
    Ok(())
}
