//! Engine state, staged writes and the per-key write lock set.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Lifecycle of the store-wide transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No transaction; writes go straight to the store.
    #[default]
    Idle,
    /// A transaction is in progress; writes are staged.
    Active,
    /// Rolled back. Only a new `START` makes the transaction line usable again.
    Failed,
}

impl EngineState {
    /// Check if writes are currently staged instead of applied.
    pub fn is_active(&self) -> bool {
        matches!(self, EngineState::Active)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Active => write!(f, "active"),
            EngineState::Failed => write!(f, "failed"),
        }
    }
}

/// A write staged while a transaction is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    /// New value for the key, applied on commit.
    Put(String),
    /// Delete marker, applied on commit.
    Tombstone,
}

impl PendingWrite {
    /// Get the staged value, if this is not a tombstone.
    pub fn value(&self) -> Option<&str> {
        match self {
            PendingWrite::Put(v) => Some(v),
            PendingWrite::Tombstone => None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, PendingWrite::Tombstone)
    }
}

/// Staged writes keyed by key.
pub type PendingWrites = BTreeMap<String, PendingWrite>;

/// Keys checked out for a write that has not reached a transaction boundary.
///
/// A key in this set is invisible to readers and cannot be written again.
/// The set is only ever cleared as a whole, on commit or rollback.
#[derive(Debug, Default, Clone)]
pub struct ActiveKeySet {
    keys: HashSet<String>,
}

impl ActiveKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out a key. Returns false if it was already checked out.
    pub fn insert(&mut self, key: &str) -> bool {
        self.keys.insert(key.to_string())
    }

    /// Release a single key. Returns true if it was checked out.
    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Release every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
