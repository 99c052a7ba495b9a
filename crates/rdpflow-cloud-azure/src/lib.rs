//! Azure provider for rdpflow
//!
//! Provisions and tears down Windows remote-desktop VMs through the Azure
//! CLI.
//!
//! # Features
//!
//! - VM creation with a policy-compliant admin password and RDP port open
//! - Start, deallocate, public IP and power-state lookups
//! - Deprovisioning of a VM together with its NICs, public IPs, NSGs and
//!   OS disk
//!
//! # Requirements
//!
//! - `az` CLI must be installed and logged in (`az login`)
//! - Authentication is managed through the az configuration
//!
//! # Example
//!
//! ```ignore
//! use rdpflow_cloud_azure::{AzCli, VmLifecycle};
//!
//! let lifecycle = VmLifecycle::new(AzCli::new(), "rdp-rg", "eastus");
//!
//! let creds = lifecycle.create("rdp-01", "rdpadmin").await?;
//! let report = lifecycle.deprovision("rdp-01").await?;
//! for warning in report.warnings() {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! # Known limitations
//!
//! Public IPs and NSGs are found by substring match on the VM name, so a
//! VM named `rdp-1` also matches resources of `rdp-10`.

pub mod az;
pub mod commands;
pub mod error;
pub mod lifecycle;
pub mod password;

pub use az::AzCli;
pub use commands::VmProfile;
pub use error::{AzureError, Result};
pub use lifecycle::{DeletionWait, DiscoveredResources, VmLifecycle};
