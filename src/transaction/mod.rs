//! Transaction management for txkv.
//!
//! This module implements the store-wide transaction engine. There is one
//! transaction line for the whole store: `START` switches every client into
//! staged mode, `COMMIT` applies and persists the staged writes, and
//! `ROLLBACK` restores the store as it was at `START`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TransactionManager                        │
//! │        (Cloneable handle, one global exclusive lock)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   TransactionEngine                         │
//! │   (state machine, staged writes, per-key write locks)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌─────────────┐
//!                       │  Snapshot   │
//!                       │   Store     │
//!                       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use txkv::transaction::TransactionManager;
//!
//! let manager = TransactionManager::open("data.json");
//!
//! manager.start();
//! manager.add("alexh", r#"{"first_name":"Alexander"}"#)?;
//! manager.commit()?;  // or manager.rollback()?
//! ```

mod engine;
mod error;
mod manager;
mod state;

pub use engine::TransactionEngine;
pub use error::{TransactionError, TransactionResult};
pub use manager::TransactionManager;
pub use state::{ActiveKeySet, EngineState, PendingWrite, PendingWrites};
