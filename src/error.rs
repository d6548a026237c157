//! Error types for the conversation hub.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Intent error: {0}")]
    Intent(#[from] IntentError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An intent was recognised but could not be carried out.
///
/// This is the expected, conversational failure: its message is spoken back
/// to the user rather than treated as a transport error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct IntentHandleError {
    pub message: String,
}

impl IntentHandleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the intent subsystem.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("Unknown intent {intent_type}")]
    UnknownIntent { intent_type: String },

    #[error("Invalid slot info for {intent_type}: missing {slot}")]
    InvalidSlotInfo { intent_type: String, slot: String },

    #[error(transparent)]
    Handle(#[from] IntentHandleError),
}

/// Unexpected failures from an agent. These are never turned into speech.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid sentence template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Intent error: {0}")]
    Intent(#[from] IntentError),

    #[error("Agent backend failed: {0}")]
    Backend(String),
}

/// Service call errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service {domain}.{service} not found")]
    NotFound { domain: String, service: String },

    #[error("Invalid data for {domain}.{service}: {reason}")]
    InvalidData {
        domain: String,
        service: String,
        reason: String,
    },

    #[error("Service {domain}.{service} failed: {source}")]
    Failed {
        domain: String,
        service: String,
        #[source]
        source: AgentError,
    },
}

/// WebSocket command errors, reported back to the client as error results.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command.")]
    UnknownCommand,

    #[error("Message incorrectly formatted: {0}")]
    InvalidFormat(String),

    #[error("{0}")]
    Agent(#[from] AgentError),

    #[error("Unknown error")]
    Unknown,
}

impl CommandError {
    /// Error code sent in the `error.code` field of a result frame.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown_command",
            Self::InvalidFormat(_) => "invalid_format",
            Self::Agent(_) | Self::Unknown => "unknown_error",
        }
    }
}

/// Result type alias for the conversation hub.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_handle_error_displays_message_only() {
        let err = IntentHandleError::new("Device not found");
        assert_eq!(err.to_string(), "Device not found");
    }

    #[test]
    fn intent_error_handle_is_transparent() {
        let err: IntentError = IntentHandleError::new("No such light").into();
        assert_eq!(err.to_string(), "No such light");
    }

    #[test]
    fn command_error_codes() {
        assert_eq!(CommandError::UnknownCommand.code(), "unknown_command");
        assert_eq!(
            CommandError::InvalidFormat("missing id".into()).code(),
            "invalid_format"
        );
        assert_eq!(CommandError::Unknown.code(), "unknown_error");
        let agent = CommandError::from(AgentError::Backend("boom".into()));
        assert_eq!(agent.code(), "unknown_error");
        assert_eq!(agent.to_string(), "Agent backend failed: boom");
    }
}
