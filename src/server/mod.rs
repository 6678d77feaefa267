//! TCP batch server and client.
//!
//! ```text
//!  client ──bytes──► KvServer ──lines──► BatchExecutor ──► CommandProcessor
//!                                                              │
//!                                                              ▼
//!                                                     TransactionManager
//! ```

pub mod client;

mod batch;
mod config;
mod error;
mod listener;

pub use batch::{BatchExecutor, BatchOutcome};
pub use config::{ServerConfig, DEFAULT_MAX_REQUEST_BYTES};
pub use error::{ServerError, ServerResult};
pub use listener::KvServer;
