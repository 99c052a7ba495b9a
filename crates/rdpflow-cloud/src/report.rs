//! Deprovisioning report types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the deprovisioning pipeline that record isolated failures,
/// in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStep {
    Discover,
    DeleteNetworkInterfaces,
    DeletePublicIps,
    DeleteSecurityGroups,
    DeleteOsDisk,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupStep::Discover => write!(f, "discover"),
            CleanupStep::DeleteNetworkInterfaces => write!(f, "delete-nics"),
            CleanupStep::DeletePublicIps => write!(f, "delete-public-ips"),
            CleanupStep::DeleteSecurityGroups => write!(f, "delete-nsgs"),
            CleanupStep::DeleteOsDisk => write!(f, "delete-os-disk"),
        }
    }
}

/// Provider resource classes touched during deprovisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    VirtualMachine,
    NetworkInterface,
    PublicIp,
    NetworkSecurityGroup,
    OsDisk,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::VirtualMachine => write!(f, "VM"),
            ResourceKind::NetworkInterface => write!(f, "NIC"),
            ResourceKind::PublicIp => write!(f, "Public IP"),
            ResourceKind::NetworkSecurityGroup => write!(f, "NSG"),
            ResourceKind::OsDisk => write!(f, "OS disk"),
        }
    }
}

/// A non-fatal failure recorded by one pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDiagnostic {
    pub step: CleanupStep,

    /// Resource the step was working on, if any
    pub resource: Option<String>,

    pub message: String,
}

impl fmt::Display for StepDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource {
            Some(ref r) => write!(f, "[{}] {}: {}", self.step, r, self.message),
            None => write!(f, "[{}] {}", self.step, self.message),
        }
    }
}

/// Outcome of waiting for the provider to confirm VM deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DeletionConfirmation {
    /// The existence check failed, so the VM is gone
    Confirmed { attempts: u32 },
    /// The attempt budget ran out while the VM still answered
    TimedOut { attempts: u32 },
}

/// Result of a deprovisioning run that got past VM deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeprovisionReport {
    pub vm_name: String,

    pub confirmation: DeletionConfirmation,

    /// Resources whose delete command succeeded
    pub deleted: Vec<(ResourceKind, String)>,

    /// Isolated failures, in the order they happened
    pub diagnostics: Vec<StepDiagnostic>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl DeprovisionReport {
    pub fn new(vm_name: impl Into<String>) -> Self {
        Self {
            vm_name: vm_name.into(),
            confirmation: DeletionConfirmation::Confirmed { attempts: 0 },
            deleted: Vec::new(),
            diagnostics: Vec::new(),
            duration_ms: 0,
        }
    }

    /// The VM itself was removed. Isolated failures never change this.
    pub fn is_success(&self) -> bool {
        self.deleted
            .iter()
            .any(|(kind, _)| *kind == ResourceKind::VirtualMachine)
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.confirmation, DeletionConfirmation::TimedOut { .. })
    }

    /// Everything went through with no diagnostics and a confirmed deletion
    pub fn is_clean(&self) -> bool {
        self.is_success() && !self.timed_out() && self.diagnostics.is_empty()
    }

    pub fn record_deleted(&mut self, kind: ResourceKind, name: impl Into<String>) {
        self.deleted.push((kind, name.into()));
    }

    pub fn record_failure(
        &mut self,
        step: CleanupStep,
        resource: Option<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(StepDiagnostic {
            step,
            resource,
            message: message.into(),
        });
    }

    pub fn deleted_of(&self, kind: ResourceKind) -> Vec<&str> {
        self.deleted
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Human-readable warnings: the timeout first, then each diagnostic
    pub fn warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let DeletionConfirmation::TimedOut { attempts } = self.confirmation {
            out.push(format!(
                "Timeout reached while waiting for VM {} to be deleted ({} attempts)",
                self.vm_name, attempts
            ));
        }
        out.extend(self.diagnostics.iter().map(|d| d.to_string()));
        out
    }

    pub fn message(&self) -> String {
        if self.is_clean() {
            format!(
                "VM {} and all associated resources deleted successfully",
                self.vm_name
            )
        } else {
            format!(
                "VM {} deleted with {} warning(s)",
                self.vm_name,
                self.warnings().len()
            )
        }
    }
}
