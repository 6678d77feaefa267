//! Command parsing errors.

use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Command parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    EmptyCommand,

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("missing {argument} for {verb}")]
    MissingArgument {
        verb: &'static str,
        argument: &'static str,
    },
}

impl ParseError {
    /// Message reported to protocol clients.
    pub fn client_message(&self) -> String {
        match self {
            ParseError::EmptyCommand | ParseError::InvalidCommand(_) => {
                "Invalid command".to_string()
            }
            ParseError::MissingArgument { verb, argument } => {
                format!("Invalid command: missing {} for {}", argument, verb)
            }
        }
    }
}
