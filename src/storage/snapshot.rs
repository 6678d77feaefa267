//! Durable snapshot of the committed key/value mapping.
//!
//! The whole committed store is written as one JSON document:
//!
//! ```text
//! {
//!     "data": {
//!         "key": "value"
//!     }
//! }
//! ```
//!
//! Saves go through a temporary file in the same directory which is then
//! renamed over the target, so readers never observe a partial document.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::storage::error::{StorageError, StorageResult};

/// Committed key/value mapping.
pub type Store = BTreeMap<String, String>;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    data: Store,
}

/// Borrowed view used when writing, so saving never clones the store.
#[derive(Serialize)]
struct SnapshotDocumentRef<'a> {
    data: &'a Store,
}

/// Loads and saves the committed mapping at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store backed by the file at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the durable snapshot.
    ///
    /// A missing, unreadable or malformed file yields an empty mapping.
    pub fn load(&self) -> Store {
        match self.try_load() {
            Ok(store) => {
                debug!(path = %self.path.display(), keys = store.len(), "snapshot loaded");
                store
            }
            Err(StorageError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot on disk, starting empty");
                Store::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unusable snapshot");
                Store::new()
            }
        }
    }

    fn try_load(&self) -> StorageResult<Store> {
        let bytes = fs::read(&self.path)?;
        let doc: SnapshotDocument = serde_json::from_slice(&bytes)?;
        Ok(doc.data)
    }

    /// Overwrite the durable snapshot with `store`.
    pub fn save(&self, store: &Store) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(StorageError::InvalidPath(self.path.clone())),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut tmp, formatter);
            SnapshotDocumentRef { data: store }.serialize(&mut ser)?;
        }
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| StorageError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        debug!(path = %self.path.display(), keys = store.len(), "snapshot saved");
        Ok(())
    }
}
