//! Command line parser.
//!
//! A command is a verb followed by whitespace-separated arguments. For `PUT`
//! everything after the key is the value, re-joined with single spaces.

use super::command::Command;
use super::error::{ParseError, ParseResult};

/// Parser for protocol command lines.
pub struct CommandParser;

impl CommandParser {
    /// Parse one command line.
    pub fn parse(line: &str) -> ParseResult<Command> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or(ParseError::EmptyCommand)?;

        match verb {
            "PUT" => {
                let key = Self::key(&mut parts, "PUT")?;
                let value = parts.collect::<Vec<_>>().join(" ");
                Ok(Command::Put { key, value })
            }
            "GET" => Ok(Command::Get {
                key: Self::key(&mut parts, "GET")?,
            }),
            "DEL" => Ok(Command::Del {
                key: Self::key(&mut parts, "DEL")?,
            }),
            "START" => Ok(Command::Start),
            "COMMIT" => Ok(Command::Commit),
            "ROLLBACK" => Ok(Command::Rollback),
            other => Err(ParseError::InvalidCommand(other.to_string())),
        }
    }

    fn key<'a>(
        parts: &mut impl Iterator<Item = &'a str>,
        verb: &'static str,
    ) -> ParseResult<String> {
        parts
            .next()
            .map(str::to_string)
            .ok_or(ParseError::MissingArgument { verb, argument: "key" })
    }
}
