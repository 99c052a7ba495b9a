use async_trait::async_trait;
use rdpflow_cloud::{CloudError, CloudGateway, GatewayCommand};
use std::sync::Mutex;

type Handler = Box<dyn Fn(&GatewayCommand) -> Result<String, CloudError> + Send + Sync>;

/// In-memory gateway that records every command and answers from a script
pub struct ScriptedGateway {
    calls: Mutex<Vec<GatewayCommand>>,
    handler: Handler,
}

impl ScriptedGateway {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&GatewayCommand) -> Result<String, CloudError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<GatewayCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands issued with the given verb, e.g. `"network nic delete"`
    pub fn calls_to(&self, verb: &str) -> Vec<GatewayCommand> {
        self.calls()
            .into_iter()
            .filter(|c| c.verb() == verb)
            .collect()
    }

    /// Index of the first call with the given verb
    #[allow(dead_code)]
    pub fn position_of(&self, verb: &str) -> Option<usize> {
        self.calls().iter().position(|c| c.verb() == verb)
    }
}

#[async_trait]
impl CloudGateway for ScriptedGateway {
    async fn execute(&self, command: &GatewayCommand) -> Result<String, CloudError> {
        self.calls.lock().unwrap().push(command.clone());
        (self.handler)(command)
    }
}

pub fn fail(command: &GatewayCommand, stderr: &str) -> Result<String, CloudError> {
    Err(CloudError::command_failed(command.to_string(), stderr))
}

/// The check used while waiting for deletion: `vm show` with no query
#[allow(dead_code)]
pub fn is_existence_check(command: &GatewayCommand) -> bool {
    command.verb() == "vm show" && command.target_query().is_none()
}
