//! Command processor: parse, dispatch to the engine, build the response.

use serde_json::json;
use tracing::debug;

use crate::protocol::command::Command;
use crate::protocol::parser::CommandParser;
use crate::protocol::response::Response;
use crate::transaction::{EngineState, TransactionError, TransactionManager};

/// Per-batch flags, reset at the start of every batch.
///
/// The batch is marked failed when a command errors or a `ROLLBACK`
/// succeeds. A `COMMIT` later in the same batch is then rejected with
/// "Transaction failed".
#[derive(Debug, Default, Clone)]
pub struct BatchContext {
    failed: bool,
}

impl BatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that this batch failed or rolled back.
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

/// Executes single command lines against the shared engine.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    manager: TransactionManager,
}

impl CommandProcessor {
    pub fn new(manager: TransactionManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &TransactionManager {
        &self.manager
    }

    /// Parse and execute one command line.
    pub fn process(&self, line: &str, ctx: &mut BatchContext) -> Response {
        match CommandParser::parse(line) {
            Ok(command) => self.execute(command, ctx),
            Err(e) => {
                debug!(line, error = %e, "rejected command");
                Response::from(e)
            }
        }
    }

    /// Execute a parsed command.
    ///
    /// The engine lock is held for the whole command.
    pub fn execute(&self, command: Command, ctx: &mut BatchContext) -> Response {
        debug!(verb = command.verb(), key = command.key(), "executing");

        self.manager.with_engine(|engine| match command {
            Command::Put { key, value } => match engine.add(&key, value.as_str()) {
                Ok(()) => Response::ok_with_message(true, json!({ "key": key, "value": value })),
                Err(e) => Response::from(e),
            },
            Command::Get { key } => match engine.get(&key) {
                Some(value) => Response::ok(json!({ "key": key, "value": value })),
                None => Response::from(TransactionError::NotFound { key }),
            },
            Command::Del { key } => match engine.delete(&key) {
                Ok(()) => Response::ok_with_message(true, "Key deleted"),
                Err(e) => Response::from(e),
            },
            Command::Start => {
                engine.start();
                Response::ok("Transaction started")
            }
            Command::Commit => {
                if engine.state() == EngineState::Active && ctx.is_failed() {
                    return Response::from(TransactionError::TransactionFailed);
                }
                match engine.commit() {
                    Ok(()) => Response::ok("Transaction committed"),
                    Err(e) => Response::from(e),
                }
            }
            Command::Rollback => match engine.rollback() {
                Ok(()) => {
                    ctx.mark_failed();
                    Response::ok("Transaction rolled back")
                }
                Err(e) => Response::from(e),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CommandProcessor) {
        let dir = TempDir::new().unwrap();
        let manager = TransactionManager::open(dir.path().join("data.json"));
        (dir, CommandProcessor::new(manager))
    }

    fn run(processor: &CommandProcessor, line: &str) -> Response {
        processor.process(line, &mut BatchContext::new())
    }

    #[test]
    fn test_put_response() {
        let (_dir, processor) = setup();
        let r = run(&processor, "PUT a hello world");
        assert_eq!(r.status, Status::Ok);
        assert_eq!(r.result, Some(json!(true)));
        assert_eq!(r.mesg, Some(json!({"key": "a", "value": "hello world"})));
    }

    #[test]
    fn test_put_existing_key() {
        let (_dir, processor) = setup();
        run(&processor, "PUT a 1");

        let r = run(&processor, "PUT a 2");
        assert!(r.is_error());
        assert_eq!(r.mesg, Some(json!("Key already exists")));
    }

    #[test]
    fn test_get_response() {
        let (_dir, processor) = setup();
        run(&processor, "START");
        run(&processor, r#"PUT georgew {"first_name":"George", "role":"President"}"#);
        run(&processor, "COMMIT");

        let r = run(&processor, "GET georgew");
        assert_eq!(
            r.result,
            Some(json!({"key": "georgew", "value": {"first_name": "George", "role": "President"}}))
        );
    }

    #[test]
    fn test_get_missing_and_hidden() {
        let (_dir, processor) = setup();
        assert_eq!(run(&processor, "GET nope").mesg, Some(json!("Key not found")));

        run(&processor, "START");
        run(&processor, "PUT k v");
        assert_eq!(run(&processor, "GET k").mesg, Some(json!("Key not found")));
    }

    #[test]
    fn test_del_response() {
        let (_dir, processor) = setup();
        run(&processor, "PUT a 1");

        let r = run(&processor, "DEL a");
        assert_eq!(r.result, Some(json!(true)));
        assert_eq!(r.mesg, Some(json!("Key deleted")));

        assert_eq!(run(&processor, "DEL a").mesg, Some(json!("Key not found")));
    }

    #[test]
    fn test_commit_messages() {
        let (_dir, processor) = setup();
        assert_eq!(
            run(&processor, "COMMIT").mesg,
            Some(json!("No transaction started"))
        );

        run(&processor, "START");
        assert_eq!(
            run(&processor, "ROLLBACK").result,
            Some(json!("Transaction rolled back"))
        );
        assert_eq!(
            run(&processor, "COMMIT").mesg,
            Some(json!("Transaction rolled back"))
        );
        assert_eq!(
            run(&processor, "ROLLBACK").mesg,
            Some(json!("No transaction started"))
        );
    }

    #[test]
    fn test_commit_after_rollback_in_same_batch() {
        let (_dir, processor) = setup();
        let mut ctx = BatchContext::new();

        processor.process("START", &mut ctx);
        let r = processor.process("ROLLBACK", &mut ctx);
        assert_eq!(r.result, Some(json!("Transaction rolled back")));
        assert!(ctx.is_failed());

        processor.process("START", &mut ctx);
        processor.process("PUT x 1", &mut ctx);
        let r = processor.process("COMMIT", &mut ctx);
        assert_eq!(r.mesg, Some(json!("Transaction failed")));
        assert_eq!(processor.manager().state(), EngineState::Active);

        // A fresh batch may commit the same transaction.
        let r = processor.process("COMMIT", &mut BatchContext::new());
        assert_eq!(r.result, Some(json!("Transaction committed")));
        assert_eq!(processor.manager().get("x"), Some(json!("1")));
    }

    #[test]
    fn test_put_committed_key_in_transaction() {
        let (_dir, processor) = setup();
        run(&processor, "PUT a 1");
        run(&processor, "START");
        run(&processor, "ROLLBACK");
        run(&processor, "START");

        let r = run(&processor, "PUT a 2");
        assert_eq!(r.mesg, Some(json!("Key already exists")));

        // Deleting first allows the key to be written again.
        assert!(!run(&processor, "DEL a").is_error());
        assert!(!run(&processor, "PUT a 2").is_error());
        assert_eq!(
            run(&processor, "COMMIT").result,
            Some(json!("Transaction committed"))
        );
        assert_eq!(processor.manager().get("a"), Some(json!("2")));
    }

    #[test]
    fn test_invalid_commands() {
        let (_dir, processor) = setup();
        assert_eq!(run(&processor, "FLUSH").mesg, Some(json!("Invalid command")));
        assert_eq!(
            run(&processor, "PUT").mesg,
            Some(json!("Invalid command: missing key for PUT"))
        );
    }
}
