//! Cloud gateway trait definition
//!
//! A gateway executes one named operation against the cloud provider and
//! returns its textual output. Callers treat it as an opaque RPC: one
//! command in flight per call, arbitrary latency, any call may fail.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Shown in place of secret argument values
const MASK: &str = "***";

/// Cloud gateway abstraction trait
///
/// The Azure CLI implements this trait in production; tests substitute a
/// scripted gateway that records every command it receives.
#[async_trait]
pub trait CloudGateway: Send + Sync {
    /// Execute a single provider command and return its stdout
    async fn execute(&self, command: &GatewayCommand) -> Result<String>;
}

#[async_trait]
impl<G: CloudGateway + ?Sized> CloudGateway for std::sync::Arc<G> {
    async fn execute(&self, command: &GatewayCommand) -> Result<String> {
        (**self).execute(command).await
    }
}

/// Output format requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Tsv,
    Table,
    None,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Table => "table",
            OutputFormat::None => "none",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Additional command argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    /// Bare flag such as `--yes`
    Flag(String),
    /// Flag with a value, rendered as-is
    Value(String, String),
    /// Flag with a value that must never reach logs
    Secret(String, String),
}

/// A single provider operation: verb path plus structured parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCommand {
    verb: Vec<String>,
    resource_group: Option<String>,
    name: Option<String>,
    query: Option<String>,
    output: Option<OutputFormat>,
    args: Vec<CommandArg>,
}

impl GatewayCommand {
    /// Create a command from its verb path, e.g. `["vm", "show"]`
    pub fn new<I, S>(verb: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verb: verb.into_iter().map(Into::into).collect(),
            resource_group: None,
            name: None,
            query: None,
            output: None,
            args: Vec::new(),
        }
    }

    pub fn resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// JMESPath filter applied by the provider
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn output(mut self, output: OutputFormat) -> Self {
        self.output = Some(output);
        self
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.args.push(CommandArg::Flag(flag.into()));
        self
    }

    pub fn arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Value(flag.into(), value.into()));
        self
    }

    pub fn secret_arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(CommandArg::Secret(flag.into(), value.into()));
        self
    }

    /// Verb path joined by spaces, e.g. `"network nic delete"`
    pub fn verb(&self) -> String {
        self.verb.join(" ")
    }

    pub fn target_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target_resource_group(&self) -> Option<&str> {
        self.resource_group.as_deref()
    }

    pub fn target_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output
    }

    pub fn extra_args(&self) -> &[CommandArg] {
        &self.args
    }

    /// Look up the value passed for `flag`, secret or not
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args.iter().find_map(|a| match a {
            CommandArg::Value(f, v) | CommandArg::Secret(f, v) if f == flag => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| match a {
            CommandArg::Flag(f) => f == flag,
            CommandArg::Value(f, _) | CommandArg::Secret(f, _) => f == flag,
        })
    }

    /// Full argument vector passed to the provider CLI
    pub fn to_args(&self) -> Vec<String> {
        self.render(false)
    }

    fn render(&self, masked: bool) -> Vec<String> {
        let mut out = self.verb.clone();

        if let Some(ref rg) = self.resource_group {
            out.push("--resource-group".to_string());
            out.push(rg.clone());
        }
        if let Some(ref name) = self.name {
            out.push("--name".to_string());
            out.push(name.clone());
        }
        for arg in &self.args {
            match arg {
                CommandArg::Flag(f) => out.push(f.clone()),
                CommandArg::Value(f, v) => {
                    out.push(f.clone());
                    out.push(v.clone());
                }
                CommandArg::Secret(f, v) => {
                    out.push(f.clone());
                    out.push(if masked { MASK.to_string() } else { v.clone() });
                }
            }
        }
        if let Some(ref query) = self.query {
            out.push("--query".to_string());
            out.push(query.clone());
        }
        if let Some(output) = self.output {
            out.push("--output".to_string());
            out.push(output.as_str().to_string());
        }

        out
    }
}

impl fmt::Display for GatewayCommand {
    /// Log-safe rendering with secret values masked
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true).join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_order() {
        let cmd = GatewayCommand::new(["vm", "show"])
            .resource_group("rg")
            .name("vm1")
            .query("publicIps")
            .output(OutputFormat::Tsv)
            .flag("--show-details");

        assert_eq!(
            cmd.to_args(),
            vec![
                "vm",
                "show",
                "--resource-group",
                "rg",
                "--name",
                "vm1",
                "--show-details",
                "--query",
                "publicIps",
                "--output",
                "tsv",
            ]
        );
        assert_eq!(cmd.verb(), "vm show");
        assert_eq!(cmd.target_name(), Some("vm1"));
    }

    #[test]
    fn test_secret_is_masked_in_display() {
        let cmd = GatewayCommand::new(["vm", "create"])
            .name("vm1")
            .arg("--admin-username", "alice")
            .secret_arg("--admin-password", "hunter2hunter2");

        let shown = cmd.to_string();
        assert!(!shown.contains("hunter2hunter2"));
        assert!(shown.contains("--admin-password ***"));
        assert!(shown.contains("--admin-username alice"));

        assert!(cmd.to_args().contains(&"hunter2hunter2".to_string()));
        assert_eq!(cmd.arg_value("--admin-password"), Some("hunter2hunter2"));
    }

    #[test]
    fn test_has_flag() {
        let cmd = GatewayCommand::new(["vm", "delete"]).flag("--yes");
        assert!(cmd.has_flag("--yes"));
        assert!(!cmd.has_flag("--no-wait"));
    }
}
