//! Command types for the line protocol.

use std::fmt;

/// A single parsed protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `PUT <key> <value...>`
    ///
    /// Only adds new keys. A committed key must be `DEL`eted before it can be
    /// `PUT` again, inside a transaction as well as outside one.
    Put { key: String, value: String },
    /// `GET <key>`
    Get { key: String },
    /// `DEL <key>`
    Del { key: String },
    /// `START`
    Start,
    /// `COMMIT`
    Commit,
    /// `ROLLBACK`
    Rollback,
}

impl Command {
    /// The protocol verb for this command.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Put { .. } => "PUT",
            Command::Get { .. } => "GET",
            Command::Del { .. } => "DEL",
            Command::Start => "START",
            Command::Commit => "COMMIT",
            Command::Rollback => "ROLLBACK",
        }
    }

    /// Key the command operates on, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Put { key, .. } | Command::Get { key } | Command::Del { key } => {
                Some(key.as_str())
            }
            _ => None,
        }
    }

    /// Check if this command controls the transaction line.
    pub fn is_transaction_control(&self) -> bool {
        matches!(self, Command::Start | Command::Commit | Command::Rollback)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Put { key, value } => write!(f, "PUT {} {}", key, value),
            Command::Get { key } => write!(f, "GET {}", key),
            Command::Del { key } => write!(f, "DEL {}", key),
            other => f.write_str(other.verb()),
        }
    }
}
