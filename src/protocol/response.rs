//! Structured command results.
//!
//! Every command produces one JSON object on the wire:
//!
//! ```text
//! {"status":"Ok","result":"Transaction started"}
//! {"status":"Error","mesg":"Key not found"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::error::ParseError;
use crate::transaction::TransactionError;

/// Outcome of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Error,
}

/// Result of one command, serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesg: Option<Value>,
}

impl Response {
    /// Create a success response.
    pub fn ok(result: impl Into<Value>) -> Self {
        Self {
            status: Status::Ok,
            result: Some(result.into()),
            mesg: None,
        }
    }

    /// Create a success response with an accompanying message.
    pub fn ok_with_message(result: impl Into<Value>, mesg: impl Into<Value>) -> Self {
        Self {
            status: Status::Ok,
            result: Some(result.into()),
            mesg: Some(mesg.into()),
        }
    }

    /// Create an error response.
    pub fn error(mesg: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            result: None,
            mesg: Some(Value::String(mesg.into())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Parse a newline-separated batch response.
    pub fn parse_batch(raw: &str) -> Result<Vec<Response>, serde_json::Error> {
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<Response>)
            .collect()
    }
}

impl From<TransactionError> for Response {
    fn from(e: TransactionError) -> Self {
        Response::error(e.client_message())
    }
}

impl From<ParseError> for Response {
    fn from(e: ParseError) -> Self {
        Response::error(e.client_message())
    }
}

/// Compact JSON, as written on the wire.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            Response::ok("Transaction started").to_string(),
            r#"{"status":"Ok","result":"Transaction started"}"#
        );
        assert_eq!(
            Response::error("Key not found").to_string(),
            r#"{"status":"Error","mesg":"Key not found"}"#
        );
        assert_eq!(
            Response::ok_with_message(true, "Key deleted").to_string(),
            r#"{"status":"Ok","result":true,"mesg":"Key deleted"}"#
        );
    }

    #[test]
    fn test_parse_batch() {
        let raw = "{\"status\":\"Ok\",\"result\":\"Transaction started\"}\n\
                   {\"status\":\"Ok\",\"result\":{\"key\":\"a\",\"value\":{\"x\":1}}}";
        let responses = Response::parse_batch(raw).unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[1].result, Some(json!({"key": "a", "value": {"x": 1}})));
        assert!(responses[1].mesg.is_none());
    }

    #[test]
    fn test_from_errors() {
        let r = Response::from(TransactionError::NoTransaction);
        assert!(r.is_error());
        assert_eq!(r.mesg, Some(json!("No transaction started")));

        let r = Response::from(ParseError::InvalidCommand("FROB".to_string()));
        assert_eq!(r.mesg, Some(json!("Invalid command")));
    }
}
