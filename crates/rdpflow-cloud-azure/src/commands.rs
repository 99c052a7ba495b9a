//! az command builders
//!
//! One function per provider operation the lifecycle issues. Queries use
//! JMESPath filters evaluated by the CLI.

use crate::error::{AzureError, Result};
use rdpflow_cloud::{GatewayCommand, OutputFormat};

/// Provisioning parameters that do not vary per VM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmProfile {
    pub image: String,
    pub size: String,
    pub public_ip_sku: String,
    pub authentication_type: String,
    /// Script passed as `--custom-data` on first boot
    pub custom_data: Option<String>,
    pub rdp_port: u16,
}

impl Default for VmProfile {
    fn default() -> Self {
        Self {
            image: "Win2022Datacenter".to_string(),
            size: "Standard_B2s".to_string(),
            public_ip_sku: "Basic".to_string(),
            authentication_type: "password".to_string(),
            custom_data: Some("init.ps1".to_string()),
            rdp_port: 3389,
        }
    }
}

/// Reject names that Azure would refuse or that would break a query filter
pub fn validate_vm_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(AzureError::InvalidName(format!(
            "'{}' must be 1-64 characters",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AzureError::InvalidName(format!(
            "'{}' may only contain letters, digits, '-', '_' and '.'",
            name
        )));
    }
    Ok(())
}

pub fn vm_create(
    name: &str,
    resource_group: &str,
    location: &str,
    admin_username: &str,
    admin_password: &str,
    profile: &VmProfile,
) -> GatewayCommand {
    let mut cmd = GatewayCommand::new(["vm", "create"])
        .resource_group(resource_group)
        .name(name)
        .arg("--image", &profile.image)
        .arg("--size", &profile.size)
        .arg("--admin-username", admin_username)
        .secret_arg("--admin-password", admin_password)
        .arg("--location", location)
        .arg("--authentication-type", &profile.authentication_type);

    if let Some(ref script) = profile.custom_data {
        cmd = cmd.arg("--custom-data", script);
    }

    cmd.arg("--public-ip-sku", &profile.public_ip_sku)
}

pub fn vm_open_port(name: &str, resource_group: &str, port: u16) -> GatewayCommand {
    GatewayCommand::new(["vm", "open-port"])
        .resource_group(resource_group)
        .name(name)
        .arg("--port", port.to_string())
}

/// Describe a VM. Fails once the VM no longer exists.
pub fn vm_show(name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["vm", "show"])
        .resource_group(resource_group)
        .name(name)
}

pub fn vm_os_disk_id(name: &str, resource_group: &str) -> GatewayCommand {
    vm_show(name, resource_group)
        .query("storageProfile.osDisk.managedDisk.id")
        .output(OutputFormat::Tsv)
}

pub fn vm_public_ips(name: &str, resource_group: &str) -> GatewayCommand {
    vm_show(name, resource_group)
        .flag("--show-details")
        .query("publicIps")
        .output(OutputFormat::Tsv)
}

pub fn vm_power_state(name: &str, resource_group: &str) -> GatewayCommand {
    vm_show(name, resource_group)
        .flag("--show-details")
        .query("powerState")
        .output(OutputFormat::Tsv)
}

pub fn vm_list(resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["vm", "list"])
        .resource_group(resource_group)
        .flag("--show-details")
        .output(OutputFormat::Table)
}

pub fn vm_start(name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["vm", "start"])
        .resource_group(resource_group)
        .name(name)
}

/// Stop and release compute so the VM is no longer billed
pub fn vm_deallocate(name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["vm", "deallocate"])
        .resource_group(resource_group)
        .name(name)
}

pub fn vm_delete(name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["vm", "delete"])
        .resource_group(resource_group)
        .name(name)
        .flag("--yes")
}

/// NICs whose attached VM id mentions `vm_name`
pub fn nic_list_attached(vm_name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "nic", "list"])
        .resource_group(resource_group)
        .query(format!(
            "[?virtualMachine.id && contains(virtualMachine.id, '{}')].name",
            vm_name
        ))
        .output(OutputFormat::Tsv)
}

pub fn nic_delete(nic: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "nic", "delete"])
        .resource_group(resource_group)
        .name(nic)
}

/// Public IPs whose name contains `vm_name`
pub fn public_ip_list_matching(vm_name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "public-ip", "list"])
        .resource_group(resource_group)
        .query(format!("[?contains(name, '{}')].name", vm_name))
        .output(OutputFormat::Tsv)
}

pub fn public_ip_delete(ip: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "public-ip", "delete"])
        .resource_group(resource_group)
        .name(ip)
}

/// NSGs whose name contains `vm_name`
pub fn nsg_list_matching(vm_name: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "nsg", "list"])
        .resource_group(resource_group)
        .query(format!("[?contains(name, '{}')].name", vm_name))
        .output(OutputFormat::Tsv)
}

pub fn nsg_delete(nsg: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["network", "nsg", "delete"])
        .resource_group(resource_group)
        .name(nsg)
}

pub fn disk_delete(disk: &str, resource_group: &str) -> GatewayCommand {
    GatewayCommand::new(["disk", "delete"])
        .resource_group(resource_group)
        .name(disk)
        .flag("--yes")
}

/// Split tsv output into trimmed, non-empty lines
pub fn parse_tsv_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Last path segment of an Azure resource id
pub fn resource_name_from_id(id: &str) -> Option<&str> {
    id.trim()
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}
