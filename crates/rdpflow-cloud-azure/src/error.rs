//! Azure provider error types

use rdpflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az CLI not found. Please install: https://aka.ms/installazurecli")]
    AzNotFound,

    #[error("Failed to delete VM {vm}: {source}")]
    VmDeletionFailed {
        vm: String,
        #[source]
        source: CloudError,
    },

    #[error("Invalid VM name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AzureError>;
