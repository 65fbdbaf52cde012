use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The vendor engine rejected a command (player not created, wrong state).
    #[error("Engine rejected command `{command}`: {message}")]
    EngineRejected { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand used by engine bridges when a native call fails.
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::EngineRejected {
            command: command.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
