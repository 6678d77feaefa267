//! Line protocol: command parsing, dispatch and structured results.

mod command;
mod error;
mod parser;
mod processor;
mod response;

pub use command::Command;
pub use error::{ParseError, ParseResult};
pub use parser::CommandParser;
pub use processor::{BatchContext, CommandProcessor};
pub use response::{Response, Status};
