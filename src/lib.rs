//! txkv - an in-memory key/value store with store-wide transactions
//!
//! This crate provides a key/value store reachable over a line-oriented TCP
//! protocol. Clients send batches of newline-separated commands; writes can
//! be grouped between `START` and `COMMIT` / `ROLLBACK`, and every committed
//! change is saved to a JSON snapshot on disk.
//!
//! # Example
//!
//! ```no_run
//! use txkv::transaction::TransactionManager;
//!
//! let manager = TransactionManager::open("data.json");
//! manager.start();
//! manager.add("greeting", "hello").unwrap();
//! manager.commit().unwrap();
//! ```

pub mod protocol;
pub mod server;
pub mod storage;
pub mod transaction;
