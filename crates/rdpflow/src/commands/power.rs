use crate::app::App;
use colored::Colorize;
use rdpflow_cloud::FollowUp;

pub async fn handle_start(app: &App, name: String) -> anyhow::Result<()> {
    let azure = app.azure().await?;
    println!("{}", format!("Starting VM '{}'...", name).yellow());
    azure.lifecycle.start(&name).await?;
    println!("{}", format!("✓ VM '{}' started", name).green().bold());

    let delay = azure.settings.start_follow_up;
    println!(
        "{}",
        format!("Checking the public IP in {}s (Ctrl-C to skip)...", delay.as_secs()).dimmed()
    );

    let lifecycle = azure.lifecycle.clone();
    let lookup_name = name;
    let follow_up = FollowUp::schedule(delay, move || async move {
        lifecycle.public_ip(&lookup_name).await
    });
    let abort = follow_up.abort_handle();

    tokio::select! {
        result = follow_up.join() => match result {
            Some(Ok(ip)) => println!("  IP: {}", ip.cyan()),
            Some(Err(e)) => println!("{}", format!("⚠ Could not get IP address: {}", e).yellow()),
            None => {}
        },
        _ = tokio::signal::ctrl_c() => {
            abort.abort();
            println!("{}", "IP check skipped".dimmed());
        }
    }

    Ok(())
}

pub async fn handle_stop(app: &App, name: String) -> anyhow::Result<()> {
    let azure = app.azure().await?;
    println!("{}", format!("Deallocating VM '{}'...", name).yellow());
    azure.lifecycle.stop(&name).await?;
    println!("{}", format!("✓ VM '{}' deallocated", name).green().bold());

    let delay = azure.settings.stop_follow_up;
    println!(
        "{}",
        format!("Checking the power state in {}s (Ctrl-C to skip)...", delay.as_secs()).dimmed()
    );

    let lifecycle = azure.lifecycle.clone();
    let lookup_name = name;
    let follow_up = FollowUp::schedule(delay, move || async move {
        lifecycle.power_state(&lookup_name).await
    });
    let abort = follow_up.abort_handle();

    tokio::select! {
        result = follow_up.join() => match result {
            Some(Ok(state)) => println!("  Power state: {}", state.cyan()),
            Some(Err(e)) => println!("{}", format!("⚠ Could not get power state: {}", e).yellow()),
            None => {}
        },
        _ = tokio::signal::ctrl_c() => {
            abort.abort();
            println!("{}", "Power state check skipped".dimmed());
        }
    }

    Ok(())
}
