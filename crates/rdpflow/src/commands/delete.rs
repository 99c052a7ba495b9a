use crate::app::App;
use colored::Colorize;
use rdpflow_cloud::{CredentialStore, DeprovisionReport, ResourceKind};

pub async fn handle(app: &App, name: String, yes: bool) -> anyhow::Result<()> {
    if !yes {
        println!(
            "{}",
            format!(
                "⚠ This deletes VM '{}' and its NICs, public IPs, NSGs and OS disk.",
                name
            )
            .yellow()
            .bold()
        );
        println!("{}", "This cannot be undone.".yellow());
        println!();
        println!("Re-run with {} to proceed:", "--yes".cyan());
        println!("  rdp delete {} --yes", name);
        return Ok(());
    }

    let azure = app.azure().await?;
    println!(
        "{}",
        format!("Deleting VM '{}' and related resources...", name).yellow()
    );
    println!(
        "{}",
        "This can take a few minutes while Azure confirms the VM is gone.".dimmed()
    );

    let report = azure.lifecycle.deprovision(&name).await?;
    print_report(&report);

    if let Some(warning) = forget_deleted(&app.store, &name).await {
        println!("{}", format!("⚠ {}", warning).yellow());
    }

    Ok(())
}

fn print_report(report: &DeprovisionReport) {
    let name = &report.vm_name;
    println!();
    for kind in [
        ResourceKind::NetworkInterface,
        ResourceKind::PublicIp,
        ResourceKind::NetworkSecurityGroup,
        ResourceKind::OsDisk,
    ] {
        for resource in report.deleted_of(kind) {
            println!("  {} {}: {}", "✓".green(), kind, resource);
        }
    }

    let warnings = report.warnings();
    println!();
    if warnings.is_empty() {
        println!(
            "{}",
            format!("✓ VM '{}' and related resources deleted", name)
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!("✓ VM '{}' deleted, with cleanup warnings:", name)
                .yellow()
                .bold()
        );
        for warning in warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }
    println!("{}", format!("Took {:.1}s", report.duration_ms as f64 / 1000.0).dimmed());
}

/// Drop the saved credentials of a deleted VM, returning a warning on failure
async fn forget_deleted(store: &CredentialStore, name: &str) -> Option<String> {
    match store.remove(name).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("Failed to remove credentials for {}: {}", name, e);
            Some(format!(
                "Could not remove the saved credentials for '{}': {}. Run `rdp forget {}` to retry.",
                name, e, name
            ))
        }
    }
}
