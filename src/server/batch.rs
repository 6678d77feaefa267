//! Atomic-batch reporting.
//!
//! A batch is one client payload of newline-separated commands. Commands run
//! in order against the shared engine. The first error stops the batch and
//! becomes the only response; earlier successes are dropped from the reply
//! but their effects on the engine are kept. Undoing them takes an explicit
//! `ROLLBACK`.

use tracing::debug;

use crate::protocol::{BatchContext, CommandProcessor, Response};
use crate::transaction::TransactionManager;

/// Responses of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    responses: Vec<Response>,
    failed: bool,
}

impl BatchOutcome {
    /// Check if the batch was cut short by an error.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Responses to report: all successes, or the single error.
    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    /// Newline-separated wire form.
    pub fn to_wire(&self) -> String {
        self.responses
            .iter()
            .map(Response::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs batches against one shared engine.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    processor: CommandProcessor,
}

impl BatchExecutor {
    pub fn new(manager: TransactionManager) -> Self {
        Self {
            processor: CommandProcessor::new(manager),
        }
    }

    pub fn manager(&self) -> &TransactionManager {
        self.processor.manager()
    }

    /// Execute every command of `payload`, stopping at the first error.
    ///
    /// The engine lock is taken per command, so batches from different
    /// connections interleave command by command.
    pub fn execute(&self, payload: &str) -> BatchOutcome {
        let mut ctx = BatchContext::new();
        let mut responses = Vec::new();
        let mut failed = false;

        for line in payload.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let response = self.processor.process(line, &mut ctx);
            if response.is_error() {
                ctx.mark_failed();
                failed = true;
                responses.clear();
                responses.push(response);
                break;
            }
            responses.push(response);
        }

        debug!(responses = responses.len(), failed, "batch finished");
        BatchOutcome { responses, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::EngineState;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BatchExecutor) {
        let dir = TempDir::new().unwrap();
        let manager = TransactionManager::open(dir.path().join("data.json"));
        (dir, BatchExecutor::new(manager))
    }

    #[test]
    fn test_successful_batch_reports_everything() {
        let (_dir, executor) = setup();
        let outcome = executor.execute(
            "START\n\
             PUT winstonc {\"first_name\":\"Winston\", \"role\":\"Prime Minister\"}\n\
             PUT georgew {\"first_name\":\"George\", \"role\":\"President\"}\n\
             COMMIT",
        );

        assert!(!outcome.is_failed());
        assert_eq!(outcome.responses().len(), 4);
        assert_eq!(outcome.to_wire().lines().count(), 4);

        let manager = executor.manager();
        assert_eq!(
            manager.get("winstonc"),
            Some(json!({"first_name": "Winston", "role": "Prime Minister"}))
        );
    }

    #[test]
    fn test_duplicate_put_reports_only_error() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("PUT a 1\nPUT a 2");

        assert!(outcome.is_failed());
        assert_eq!(outcome.responses().len(), 1);
        assert_eq!(
            outcome.to_wire(),
            r#"{"status":"Error","mesg":"Key already exists"}"#
        );
    }

    #[test]
    fn test_failure_stops_remaining_commands() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("START\nGET missing\nPUT b 2\nCOMMIT");

        assert!(outcome.is_failed());
        assert_eq!(outcome.responses()[0].mesg, Some(json!("Key not found")));

        // START ran, the rest did not.
        let manager = executor.manager();
        assert_eq!(manager.state(), EngineState::Active);
        manager.with_engine(|engine| assert_eq!(engine.pending_len(), 0));
    }

    #[test]
    fn test_failed_batch_keeps_earlier_effects() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("PUT a 1\nFROB");
        assert!(outcome.is_failed());

        // The PUT happened even though it was not reported.
        let manager = executor.manager();
        manager.with_engine(|engine| assert!(engine.committed().contains_key("a")));

        // An explicit ROLLBACK is what releases the lock on "a".
        executor.execute("ROLLBACK");
        assert_eq!(manager.get("a"), Some(json!("1")));
    }

    #[test]
    fn test_staged_writes_survive_failed_batch_until_rollback() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("START\nPUT k v\nDEL nope");
        assert!(outcome.is_failed());

        let outcome = executor.execute("ROLLBACK\nCOMMIT");
        assert_eq!(
            outcome.to_wire(),
            r#"{"status":"Error","mesg":"Transaction rolled back"}"#
        );
        assert_eq!(executor.manager().get("k"), None);
    }

    #[test]
    fn test_commit_after_rollback_in_same_batch_fails() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("START\nROLLBACK\nSTART\nPUT x 1\nCOMMIT");

        assert!(outcome.is_failed());
        assert_eq!(
            outcome.to_wire(),
            r#"{"status":"Error","mesg":"Transaction failed"}"#
        );

        let manager = executor.manager();
        assert_eq!(manager.state(), EngineState::Active);
        manager.with_engine(|engine| assert!(!engine.committed().contains_key("x")));
    }

    #[test]
    fn test_rollback_alone_does_not_fail_batch() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("START\nPUT a 1\nROLLBACK");

        assert!(!outcome.is_failed());
        assert_eq!(outcome.responses().len(), 3);
    }

    #[test]
    fn test_transaction_spans_batches() {
        let (_dir, executor) = setup();
        executor.execute("START\nPUT k v");
        let outcome = executor.execute("COMMIT\nGET k");

        assert!(!outcome.is_failed());
        assert_eq!(
            outcome.responses()[1].result,
            Some(json!({"key": "k", "value": "v"}))
        );
    }

    #[test]
    fn test_blank_lines_and_empty_payload() {
        let (_dir, executor) = setup();
        let outcome = executor.execute("\r\n  START  \r\n\n");
        assert_eq!(outcome.responses().len(), 1);

        let outcome = executor.execute("");
        assert!(outcome.responses().is_empty());
        assert_eq!(outcome.to_wire(), "");
    }

    #[test]
    fn test_rollback_batch_from_reference_client() {
        let (_dir, executor) = setup();
        let outcome = executor.execute(
            "START\n\
             PUT margrett {\"first_name\":\"Margret\"}\n\
             ROLLBACK\n\
             COMMIT",
        );

        assert!(outcome.is_failed());
        assert_eq!(outcome.responses()[0].mesg, Some(json!("Transaction rolled back")));
        assert_eq!(executor.manager().get("margrett"), None);
    }
}
