mod common;

use common::{ScriptedGateway, fail};
use rdpflow_cloud::{CloudError, CredentialStore};
use rdpflow_cloud_azure::password::MIN_LENGTH;
use rdpflow_cloud_azure::{AzureError, VmLifecycle, VmProfile};

fn ok_gateway() -> ScriptedGateway {
    ScriptedGateway::new(|cmd| match cmd.verb().as_str() {
        "vm create" | "vm open-port" | "vm start" | "vm deallocate" => Ok("{}".to_string()),
        "vm show" if cmd.target_query() == Some("publicIps") => Ok("20.1.2.3\n".to_string()),
        "vm show" if cmd.target_query() == Some("powerState") => {
            Ok("VM running\n".to_string())
        }
        "vm list" => Ok("Name    ResourceGroup\n------  ---------\nvm1     rg\n".to_string()),
        other => panic!("unexpected command: {}", other),
    })
}

#[tokio::test]
async fn test_create_issues_create_then_open_port() {
    let lifecycle = VmLifecycle::new(ok_gateway(), "rg", "westeurope");

    let creds = lifecycle.create("vm1", "rdpadmin").await.unwrap();
    assert_eq!(creds.username, "rdpadmin");
    assert_eq!(creds.password.len(), MIN_LENGTH);

    let calls = lifecycle.gateway().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].verb(), "vm create");
    assert_eq!(calls[1].verb(), "vm open-port");

    let create = &calls[0];
    assert_eq!(create.target_name(), Some("vm1"));
    assert_eq!(create.target_resource_group(), Some("rg"));
    assert_eq!(create.arg_value("--location"), Some("westeurope"));
    assert_eq!(create.arg_value("--admin-username"), Some("rdpadmin"));
    assert_eq!(
        create.arg_value("--admin-password"),
        Some(creds.password.as_str())
    );
    assert!(!create.to_string().contains(&creds.password));

    assert_eq!(calls[1].arg_value("--port"), Some("3389"));
}

#[tokio::test]
async fn test_custom_profile() {
    let profile = VmProfile {
        size: "Standard_D2s_v5".to_string(),
        rdp_port: 13389,
        ..VmProfile::default()
    };
    let lifecycle = VmLifecycle::new(ok_gateway(), "rg", "eastus").with_profile(profile);

    lifecycle.create("vm1", "rdpadmin").await.unwrap();

    let calls = lifecycle.gateway().calls();
    assert_eq!(calls[0].arg_value("--size"), Some("Standard_D2s_v5"));
    assert_eq!(calls[1].arg_value("--port"), Some("13389"));
}

#[tokio::test]
async fn test_create_failure_propagates() {
    let gateway = ScriptedGateway::new(|cmd| match cmd.verb().as_str() {
        "vm create" => fail(cmd, "QuotaExceeded"),
        other => panic!("unexpected command: {}", other),
    });
    let lifecycle = VmLifecycle::new(gateway, "rg", "eastus");

    let err = lifecycle.create("vm1", "rdpadmin").await.unwrap_err();
    match err {
        AzureError::Cloud(CloudError::CommandFailed { stderr, .. }) => {
            assert_eq!(stderr, "QuotaExceeded")
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_port_failure_is_not_rolled_back() {
    let gateway = ScriptedGateway::new(|cmd| match cmd.verb().as_str() {
        "vm create" => Ok("{}".to_string()),
        "vm open-port" => fail(cmd, "NsgConflict"),
        other => panic!("unexpected command: {}", other),
    });
    let lifecycle = VmLifecycle::new(gateway, "rg", "eastus");

    assert!(lifecycle.create("vm1", "rdpadmin").await.is_err());
    assert!(lifecycle.gateway().calls_to("vm delete").is_empty());
}

#[tokio::test]
async fn test_create_then_record_credentials() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::load(temp_dir.path().join("vms.json"))
        .await
        .unwrap();
    let lifecycle = VmLifecycle::new(ok_gateway(), "rg", "eastus");

    let creds = lifecycle.create("vm1", "rdpadmin").await.unwrap();
    store.save("vm1", creds.clone()).await.unwrap();

    assert_eq!(store.get("vm1").await, Some(creds));
}

#[tokio::test]
async fn test_control_operations() {
    let lifecycle = VmLifecycle::new(ok_gateway(), "rg", "eastus");

    assert_eq!(lifecycle.public_ip("vm1").await.unwrap(), "20.1.2.3");
    assert_eq!(lifecycle.power_state("vm1").await.unwrap(), "VM running");
    assert!(lifecycle.list().await.unwrap().contains("vm1"));
    lifecycle.start("vm1").await.unwrap();
    lifecycle.stop("vm1").await.unwrap();

    let gw = lifecycle.gateway();
    assert_eq!(gw.calls_to("vm start").len(), 1);
    assert_eq!(gw.calls_to("vm deallocate").len(), 1);
    assert!(gw.calls_to("vm list")[0].has_flag("--show-details"));
}

#[tokio::test]
async fn test_invalid_name_rejected_before_create() {
    let lifecycle = VmLifecycle::new(ok_gateway(), "rg", "eastus");

    let err = lifecycle.create("bad name", "rdpadmin").await.unwrap_err();
    assert!(matches!(err, AzureError::InvalidName(_)));
    assert!(lifecycle.gateway().calls().is_empty());
}
