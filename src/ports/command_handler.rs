use thiserror::Error;

use crate::domain::request::FormInput;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Submission rejected: {details}")]
    Rejected { details: String },
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone)]
pub enum Command {
    Submit(FormInput),
    ListOptions,
    HealthCheck,
}

impl Command {
    /// Whether the command needs a connected sheet client.
    pub fn requires_connection(&self) -> bool {
        !matches!(self, Command::ListOptions)
    }
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
