//! az CLI wrapper
//!
//! Runs Azure CLI commands as child processes and implements
//! [`CloudGateway`] on top of them.

use crate::error::{AzureError, Result};
use async_trait::async_trait;
use rdpflow_cloud::{CloudError, CloudGateway, GatewayCommand};
use std::process::Stdio;
use tokio::process::Command;

/// az CLI wrapper
pub struct AzCli {
    program: String,
}

impl AzCli {
    pub fn new() -> Self {
        Self::with_program("az")
    }

    /// Use a different executable, e.g. a pinned install path
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the az executable is on PATH and runs
    pub async fn check_installed(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("version")
            .arg("--output")
            .arg("none")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match output {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(AzureError::AzNotFound),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AzureError::AzNotFound),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudGateway for AzCli {
    /// Run an az command and return stdout
    async fn execute(&self, command: &GatewayCommand) -> rdpflow_cloud::Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(command.to_args());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.program, command);

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CloudError::CliNotFound(self.program.clone())
            } else {
                CloudError::Io(e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CloudError::command_failed(
                command.to_string(),
                stderr.trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
