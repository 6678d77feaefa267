//! storage layer for txkv
//!
//! This module owns the durable side of the store: a single JSON snapshot
//! holding every committed key/value pair. The transaction engine is its
//! only caller and never touches the filesystem directly.
//!
//! # Usage
//!
//! ```ignore
//! use txkv::storage::{SnapshotStore, Store};
//!
//! let snapshots = SnapshotStore::new("data.json");
//! let mut store = snapshots.load();
//! store.insert("name".into(), "Alice".into());
//! snapshots.save(&store)?;
//! ```

mod error;
mod snapshot;

// Re-export public API
pub use error::{StorageError, StorageResult};
pub use snapshot::{SnapshotStore, Store};
