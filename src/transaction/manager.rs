//! Transaction manager - the one shared handle to the engine.
//!
//! Every operation, from any connection, goes through a single exclusive
//! lock around the [`TransactionEngine`]. At most one command runs at a time
//! and snapshot writes happen while the lock is held. The transaction itself
//! is store-wide: clients issuing `START`..`COMMIT` concurrently interleave
//! command by command inside the same transaction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::storage::SnapshotStore;
use crate::transaction::engine::TransactionEngine;
use crate::transaction::error::TransactionResult;
use crate::transaction::state::EngineState;

/// Shared, serialized access to the transaction engine.
///
/// Thread-safe: can be shared across threads via Clone (uses Arc internally).
#[derive(Clone)]
pub struct TransactionManager {
    inner: Arc<TransactionManagerInner>,
}

struct TransactionManagerInner {
    snapshot_path: PathBuf,
    /// Global lock; no operation suspends while holding it.
    engine: Mutex<TransactionEngine>,
}

impl TransactionManager {
    /// Open the engine over the snapshot file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(TransactionEngine::open(SnapshotStore::new(path)))
    }

    /// Wrap an existing engine.
    pub fn new(engine: TransactionEngine) -> Self {
        Self {
            inner: Arc::new(TransactionManagerInner {
                snapshot_path: engine.snapshots().path().to_path_buf(),
                engine: Mutex::new(engine),
            }),
        }
    }

    /// Path of the durable snapshot.
    pub fn snapshot_path(&self) -> &Path {
        &self.inner.snapshot_path
    }

    /// Run `f` with exclusive access to the engine.
    ///
    /// Use this when several engine calls must observe the same state.
    pub fn with_engine<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut TransactionEngine) -> T,
    {
        let mut engine = self.inner.engine.lock();
        f(&mut engine)
    }

    pub fn add(&self, key: &str, value: impl Into<String>) -> TransactionResult<()> {
        self.with_engine(|engine| engine.add(key, value))
    }

    pub fn update(&self, key: &str, value: impl Into<String>) -> TransactionResult<()> {
        self.with_engine(|engine| engine.update(key, value))
    }

    pub fn delete(&self, key: &str) -> TransactionResult<()> {
        self.with_engine(|engine| engine.delete(key))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_engine(|engine| engine.get(key))
    }

    /// Begin a transaction and return its id.
    pub fn start(&self) -> String {
        self.with_engine(|engine| engine.start().to_string())
    }

    pub fn commit(&self) -> TransactionResult<()> {
        self.with_engine(|engine| engine.commit())
    }

    pub fn rollback(&self) -> TransactionResult<()> {
        self.with_engine(|engine| engine.rollback())
    }

    pub fn state(&self) -> EngineState {
        self.with_engine(|engine| engine.state())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("snapshot_path", &self.inner.snapshot_path)
            .field("state", &self.inner.engine.try_lock().map(|engine| engine.state()))
            .finish()
    }
}
