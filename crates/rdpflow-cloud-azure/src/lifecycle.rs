//! VM lifecycle on Azure
//!
//! Creation is a straight sequence of gateway calls. Deprovisioning is a
//! fixed pipeline: discover dependents, delete the VM, wait for the
//! provider to confirm, then remove NICs, public IPs, NSGs and the OS disk.
//! Only the VM delete itself can fail the run; every other step records a
//! diagnostic and the pipeline moves on.

use crate::commands::{self, VmProfile};
use crate::error::{AzureError, Result};
use crate::password;
use rdpflow_cloud::{
    CleanupStep, CloudGateway, DeletionConfirmation, DeprovisionReport, GatewayCommand,
    ResourceKind, VmRecord,
};
use std::time::{Duration, Instant};

/// Polling budget for VM deletion confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionWait {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for DeletionWait {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 24,
        }
    }
}

/// Dependent resources captured ahead of VM deletion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredResources {
    /// Disk name, taken from the last segment of its resource id
    pub os_disk: Option<String>,
    pub network_interfaces: Vec<String>,
}

/// Creates, controls and deprovisions VMs in one resource group
pub struct VmLifecycle<G> {
    gateway: G,
    resource_group: String,
    location: String,
    profile: VmProfile,
    wait: DeletionWait,
}

impl<G: CloudGateway> VmLifecycle<G> {
    pub fn new(gateway: G, resource_group: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            gateway,
            resource_group: resource_group.into(),
            location: location.into(),
            profile: VmProfile::default(),
            wait: DeletionWait::default(),
        }
    }

    pub fn with_profile(mut self, profile: VmProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_deletion_wait(mut self, wait: DeletionWait) -> Self {
        self.wait = wait;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    /// Create a VM with a freshly generated admin password and open RDP
    ///
    /// Returns the issued credentials; persisting them is up to the caller.
    /// A failure after the VM exists (e.g. opening the port) is returned
    /// as-is, without rolling the VM back.
    pub async fn create(&self, name: &str, admin_username: &str) -> Result<VmRecord> {
        commands::validate_vm_name(name)?;
        let password = password::generate(password::DEFAULT_LENGTH);

        tracing::info!("Creating VM {} in {}", name, self.resource_group);
        self.gateway
            .execute(&commands::vm_create(
                name,
                &self.resource_group,
                &self.location,
                admin_username,
                &password,
                &self.profile,
            ))
            .await?;

        tracing::info!("Opening RDP port {} on {}", self.profile.rdp_port, name);
        self.gateway
            .execute(&commands::vm_open_port(
                name,
                &self.resource_group,
                self.profile.rdp_port,
            ))
            .await?;

        Ok(VmRecord::new(admin_username, password))
    }

    pub async fn public_ip(&self, name: &str) -> Result<String> {
        commands::validate_vm_name(name)?;
        let output = self
            .gateway
            .execute(&commands::vm_public_ips(name, &self.resource_group))
            .await?;
        Ok(output.trim().to_string())
    }

    pub async fn power_state(&self, name: &str) -> Result<String> {
        commands::validate_vm_name(name)?;
        let output = self
            .gateway
            .execute(&commands::vm_power_state(name, &self.resource_group))
            .await?;
        Ok(output.trim().to_string())
    }

    /// Provider-rendered table of VMs in the resource group
    pub async fn list(&self) -> Result<String> {
        Ok(self
            .gateway
            .execute(&commands::vm_list(&self.resource_group))
            .await?)
    }

    pub async fn start(&self, name: &str) -> Result<()> {
        commands::validate_vm_name(name)?;
        tracing::info!("Starting VM {}", name);
        self.gateway
            .execute(&commands::vm_start(name, &self.resource_group))
            .await?;
        Ok(())
    }

    /// Deallocate the VM
    pub async fn stop(&self, name: &str) -> Result<()> {
        commands::validate_vm_name(name)?;
        tracing::info!("Deallocating VM {}", name);
        self.gateway
            .execute(&commands::vm_deallocate(name, &self.resource_group))
            .await?;
        Ok(())
    }

    /// Delete a VM and its dependent resources
    ///
    /// Fails only when the VM delete command fails. Every other failure,
    /// including a deletion confirmation timeout, ends up in the report.
    pub async fn deprovision(&self, name: &str) -> Result<DeprovisionReport> {
        commands::validate_vm_name(name)?;
        let started = Instant::now();
        let rg = self.resource_group.as_str();
        let mut report = DeprovisionReport::new(name);

        tracing::info!("Getting VM resources information for {}...", name);
        let discovered = self.discover(name, &mut report).await;

        tracing::info!("Deleting VM {}...", name);
        self.gateway
            .execute(&commands::vm_delete(name, rg))
            .await
            .map_err(|source| AzureError::VmDeletionFailed {
                vm: name.to_string(),
                source,
            })?;
        report.record_deleted(ResourceKind::VirtualMachine, name);

        report.confirmation = self.await_deletion(name).await;

        if !discovered.network_interfaces.is_empty() {
            tracing::info!("Deleting NICs linked to VM {}...", name);
        }
        for nic in &discovered.network_interfaces {
            self.delete_isolated(
                &mut report,
                CleanupStep::DeleteNetworkInterfaces,
                ResourceKind::NetworkInterface,
                nic,
                commands::nic_delete(nic, rg),
            )
            .await;
        }

        // Public IPs and NSGs are matched by name, not by attachment
        tracing::info!("Deleting Public IPs related to VM {}...", name);
        let ips = self
            .list_isolated(
                &mut report,
                CleanupStep::DeletePublicIps,
                commands::public_ip_list_matching(name, rg),
            )
            .await;
        for ip in &ips {
            self.delete_isolated(
                &mut report,
                CleanupStep::DeletePublicIps,
                ResourceKind::PublicIp,
                ip,
                commands::public_ip_delete(ip, rg),
            )
            .await;
        }

        tracing::info!("Deleting NSGs related to VM {}...", name);
        let nsgs = self
            .list_isolated(
                &mut report,
                CleanupStep::DeleteSecurityGroups,
                commands::nsg_list_matching(name, rg),
            )
            .await;
        for nsg in &nsgs {
            self.delete_isolated(
                &mut report,
                CleanupStep::DeleteSecurityGroups,
                ResourceKind::NetworkSecurityGroup,
                nsg,
                commands::nsg_delete(nsg, rg),
            )
            .await;
        }

        if let Some(ref disk) = discovered.os_disk {
            self.delete_isolated(
                &mut report,
                CleanupStep::DeleteOsDisk,
                ResourceKind::OsDisk,
                disk,
                commands::disk_delete(disk, rg),
            )
            .await;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        if report.is_clean() {
            tracing::info!("Deleted VM {} and related resources successfully.", name);
        } else {
            tracing::warn!("{}", report.message());
        }
        Ok(report)
    }

    /// Capture the OS disk and attached NICs. Failures leave the field empty.
    async fn discover(&self, name: &str, report: &mut DeprovisionReport) -> DiscoveredResources {
        let rg = self.resource_group.as_str();
        let mut discovered = DiscoveredResources::default();

        match self
            .gateway
            .execute(&commands::vm_os_disk_id(name, rg))
            .await
        {
            Ok(output) => {
                if let Some(disk_name) = commands::resource_name_from_id(output.trim()) {
                    tracing::info!("Found OS disk: {}", disk_name);
                    discovered.os_disk = Some(disk_name.to_string());
                }
            }
            Err(e) => {
                tracing::warn!("Could not retrieve OS disk information: {}", e);
                report.record_failure(
                    CleanupStep::Discover,
                    Some(ResourceKind::OsDisk.to_string()),
                    e.to_string(),
                );
            }
        }

        match self
            .gateway
            .execute(&commands::nic_list_attached(name, rg))
            .await
        {
            Ok(output) => {
                discovered.network_interfaces = commands::parse_tsv_lines(&output);
                if !discovered.network_interfaces.is_empty() {
                    tracing::info!("Found NICs: {}", discovered.network_interfaces.join(", "));
                }
            }
            Err(e) => {
                tracing::warn!("Could not retrieve NICs information: {}", e);
                report.record_failure(
                    CleanupStep::Discover,
                    Some(ResourceKind::NetworkInterface.to_string()),
                    e.to_string(),
                );
            }
        }

        discovered
    }

    /// Poll until the VM stops answering or the attempt budget runs out
    async fn await_deletion(&self, name: &str) -> DeletionConfirmation {
        let max = self.wait.max_attempts;
        let check = commands::vm_show(name, &self.resource_group);
        let mut attempts = 0;

        while attempts < max {
            // describe-by-name fails once the VM is gone
            if self.gateway.execute(&check).await.is_err() {
                tracing::info!("VM {} successfully deleted", name);
                return DeletionConfirmation::Confirmed {
                    attempts: attempts + 1,
                };
            }

            tracing::info!(
                "Waiting for VM {} to be deleted... ({}/{})",
                name,
                attempts + 1,
                max
            );
            tokio::time::sleep(self.wait.interval).await;
            attempts += 1;
        }

        tracing::warn!(
            "Timeout reached while waiting for VM {} to be deleted",
            name
        );
        DeletionConfirmation::TimedOut { attempts }
    }

    async fn list_isolated(
        &self,
        report: &mut DeprovisionReport,
        step: CleanupStep,
        command: GatewayCommand,
    ) -> Vec<String> {
        match self.gateway.execute(&command).await {
            Ok(output) => commands::parse_tsv_lines(&output),
            Err(e) => {
                tracing::warn!("Error listing resources for {}: {}", step, e);
                report.record_failure(step, None, e.to_string());
                Vec::new()
            }
        }
    }

    async fn delete_isolated(
        &self,
        report: &mut DeprovisionReport,
        step: CleanupStep,
        kind: ResourceKind,
        resource: &str,
        command: GatewayCommand,
    ) {
        tracing::info!("Deleting {}: {}", kind, resource);
        match self.gateway.execute(&command).await {
            Ok(_) => report.record_deleted(kind, resource),
            Err(e) => {
                tracing::warn!("Error deleting {} {}: {}", kind, resource, e);
                report.record_failure(step, Some(resource.to_string()), e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wait_budget() {
        let wait = DeletionWait::default();
        assert_eq!(wait.interval, Duration::from_secs(5));
        assert_eq!(wait.max_attempts, 24);
    }
}
