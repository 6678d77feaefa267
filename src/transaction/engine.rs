//! The transaction engine: one store-wide state machine.
//!
//! The engine holds the committed store, the writes staged by the current
//! transaction, the copy of the store taken at `START`, and the set of keys
//! checked out for unfinished writes. It is not synchronized itself; callers
//! share it through [`TransactionManager`](super::TransactionManager).
//!
//! ```text
//!          start            commit
//!   Idle ────────► Active ────────► Idle
//!    ▲               │
//!    │ start         │ rollback
//!    └──── Failed ◄──┘
//! ```

use serde_json::Value;
use tracing::{debug, error, info};
use ulid::Ulid;

use crate::storage::{SnapshotStore, Store};
use crate::transaction::error::{TransactionError, TransactionResult};
use crate::transaction::state::{ActiveKeySet, EngineState, PendingWrite, PendingWrites};

/// Store-wide transaction state machine over a [`SnapshotStore`].
#[derive(Debug)]
pub struct TransactionEngine {
    snapshots: SnapshotStore,
    /// Committed data; matches the last successful save.
    store: Store,
    pending: PendingWrites,
    /// Copy of `store` taken at `START`, kept until commit or rollback.
    pre_transaction: Option<Store>,
    active_keys: ActiveKeySet,
    state: EngineState,
    tx_id: Option<String>,
}

impl TransactionEngine {
    /// Create an engine, restoring the committed store from `snapshots`.
    pub fn open(snapshots: SnapshotStore) -> Self {
        let store = snapshots.load();
        Self {
            snapshots,
            store,
            pending: PendingWrites::new(),
            pre_transaction: None,
            active_keys: ActiveKeySet::new(),
            state: EngineState::Idle,
            tx_id: None,
        }
    }

    // ==================== Inspection ====================

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Id of the running transaction, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    /// Committed data.
    pub fn committed(&self) -> &Store {
        &self.store
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of staged writes, tombstones included.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Check if a key is checked out by an unfinished write.
    pub fn is_locked(&self, key: &str) -> bool {
        self.active_keys.contains(key)
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    // ==================== Key Operations ====================

    /// Add a new key.
    ///
    /// The key is checked out before the existence check, so it stays locked
    /// even when the add is rejected as a duplicate. A failed save releases
    /// it again.
    pub fn add(&mut self, key: &str, value: impl Into<String>) -> TransactionResult<()> {
        self.check_out(key)?;

        let value = value.into();
        if self.state.is_active() {
            let staged_delete = self.pending.get(key).is_some_and(PendingWrite::is_tombstone);
            if self.store.contains_key(key) && !staged_delete {
                return Err(TransactionError::DuplicateKey { key: key.to_string() });
            }
            self.pending.insert(key.to_string(), PendingWrite::Put(value));
            return Ok(());
        }

        if self.store.contains_key(key) {
            return Err(TransactionError::DuplicateKey { key: key.to_string() });
        }
        self.store.insert(key.to_string(), value);
        self.persist_direct(key, None)
    }

    /// Overwrite a key.
    ///
    /// Inside a transaction the write is staged without checking that the key
    /// exists, so a key added earlier in the same transaction can be updated.
    pub fn update(&mut self, key: &str, value: impl Into<String>) -> TransactionResult<()> {
        self.check_out(key)?;

        let value = value.into();
        if self.state.is_active() {
            self.pending.insert(key.to_string(), PendingWrite::Put(value));
            return Ok(());
        }

        if !self.store.contains_key(key) {
            return Err(TransactionError::NotFound { key: key.to_string() });
        }
        let previous = self.store.insert(key.to_string(), value);
        self.persist_direct(key, previous)
    }

    /// Delete a key.
    ///
    /// Fails only when the key is neither checked out, staged nor committed.
    pub fn delete(&mut self, key: &str) -> TransactionResult<()> {
        if self.active_keys.remove(key) {
            if self.state.is_active() {
                self.pending.insert(key.to_string(), PendingWrite::Tombstone);
            } else if let Some(previous) = self.store.remove(key) {
                self.persist_direct(key, Some(previous))?;
            }
            return Ok(());
        }

        if self.pending.remove(key).is_some() {
            return Ok(());
        }

        if let Some(previous) = self.store.remove(key) {
            return self.persist_direct(key, Some(previous));
        }

        Err(TransactionError::NotFound { key: key.to_string() })
    }

    /// Read a key.
    ///
    /// Checked-out keys and staged deletes read as absent. Values that look
    /// like a JSON object are decoded; anything else comes back as a string.
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.active_keys.contains(key) {
            return None;
        }

        if self.state.is_active() {
            if let Some(write) = self.pending.get(key) {
                return write.value().map(decode_value);
            }
        }

        self.store.get(key).map(|v| decode_value(v))
    }

    // ==================== Transaction Control ====================

    /// Begin a transaction from any state.
    ///
    /// Staged writes are dropped and the store is reloaded from the durable
    /// snapshot. Checked-out keys stay locked.
    pub fn start(&mut self) -> &str {
        let tx_id = Ulid::new().to_string().to_lowercase();

        self.state = EngineState::Active;
        self.pending.clear();
        self.pre_transaction = Some(self.store.clone());
        self.store = self.snapshots.load();

        info!(tx_id = %tx_id, keys = self.store.len(), locked = self.active_keys.len(), "transaction started");
        self.tx_id.insert(tx_id).as_str()
    }

    /// Apply every staged write and persist the result.
    ///
    /// If the save fails nothing changes: the transaction stays active with
    /// its staged writes.
    pub fn commit(&mut self) -> TransactionResult<()> {
        match self.state {
            EngineState::Active => {}
            EngineState::Idle => return Err(TransactionError::NoTransaction),
            EngineState::Failed => return Err(TransactionError::TransactionRolledBack),
        }

        let mut merged = self.store.clone();
        for (key, write) in &self.pending {
            match write {
                PendingWrite::Put(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                PendingWrite::Tombstone => {
                    merged.remove(key);
                }
            }
        }

        if let Err(e) = self.snapshots.save(&merged) {
            error!(tx_id = ?self.tx_id, error = %e, "commit could not be persisted");
            return Err(e.into());
        }

        let applied = self.pending.len();
        self.store = merged;
        self.pending.clear();
        self.active_keys.clear();
        self.pre_transaction = None;
        self.state = EngineState::Idle;

        let tx_id = self.tx_id.take();
        info!(tx_id = ?tx_id, applied, "transaction committed");
        Ok(())
    }

    /// Restore the store to its state at `START` and drop all staged writes.
    ///
    /// Allowed from any state except `Failed`. Nothing is written to disk.
    pub fn rollback(&mut self) -> TransactionResult<()> {
        if self.state == EngineState::Failed {
            return Err(TransactionError::NoTransaction);
        }

        if let Some(snapshot) = self.pre_transaction.take() {
            self.store = snapshot;
        }
        let discarded = self.pending.len();
        self.pending.clear();
        self.active_keys.clear();
        self.state = EngineState::Failed;

        let tx_id = self.tx_id.take();
        info!(tx_id = ?tx_id, discarded, "transaction rolled back");
        Ok(())
    }

    // ==================== Internals ====================

    fn check_out(&mut self, key: &str) -> TransactionResult<()> {
        if !self.active_keys.insert(key) {
            debug!(key, "write rejected, key is checked out");
            return Err(TransactionError::AlreadyActive { key: key.to_string() });
        }
        Ok(())
    }

    /// Save after a direct write.
    ///
    /// On failure the in-memory change is undone and the key is released, so
    /// the write can be retried.
    fn persist_direct(&mut self, key: &str, previous: Option<String>) -> TransactionResult<()> {
        if let Err(e) = self.snapshots.save(&self.store) {
            error!(key, error = %e, "direct write could not be persisted");
            self.active_keys.remove(key);
            match previous {
                Some(value) => {
                    self.store.insert(key.to_string(), value);
                }
                None => {
                    self.store.remove(key);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Decode a stored value for readers.
fn decode_value(raw: &str) -> Value {
    if raw.trim_start().starts_with('{') {
        if let Ok(decoded) = serde_json::from_str(raw) {
            return decoded;
        }
    }
    Value::String(raw.to_string())
}
