//! rdpflow cloud core
//!
//! Provider-neutral building blocks for provisioning and tearing down
//! short-lived remote-desktop VMs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   rdp CLI                        │
//! │           (create / delete / start ...)          │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               rdpflow-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Gateway Abstraction              │   │
//! │  │  trait CloudGateway { execute(..) }       │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Credentials  │  │  Follow-ups  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  azure (az)   │
//! │   lifecycle   │
//! └───────────────┘
//! ```

pub mod error;
pub mod followup;
pub mod gateway;
pub mod report;
pub mod store;

// Re-exports
pub use error::{CloudError, Result};
pub use followup::{FollowUp, FollowUpHandle};
pub use gateway::{CloudGateway, CommandArg, GatewayCommand, OutputFormat};
pub use report::{
    CleanupStep, DeletionConfirmation, DeprovisionReport, ResourceKind, StepDiagnostic,
};
pub use store::{CredentialStore, SavedVm, VmRecord};
