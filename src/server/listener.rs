//! TCP front end.
//!
//! Each connection carries exactly one batch: the server performs a single
//! read of at most `max_request_bytes`, runs the batch, writes the combined
//! response and closes the connection. There is no length prefix, so a batch
//! larger than the read size is truncated.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use super::batch::BatchExecutor;
use super::config::ServerConfig;
use super::error::ServerResult;
use crate::transaction::TransactionManager;

/// The key/value server.
pub struct KvServer {
    config: ServerConfig,
    executor: Arc<BatchExecutor>,
}

impl KvServer {
    /// Creates a server, loading the store from the configured snapshot.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let manager = TransactionManager::open(&config.data_path);
        Self::with_manager(config, manager)
    }

    /// Creates a server over an existing engine handle.
    pub fn with_manager(config: ServerConfig, manager: TransactionManager) -> ServerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            executor: Arc::new(BatchExecutor::new(manager)),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn manager(&self) -> &TransactionManager {
        self.executor.manager()
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            data = %self.manager().snapshot_path().display(),
            "listening"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let executor = Arc::clone(&self.executor);
                        let max_bytes = self.config.max_request_bytes;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, executor, max_bytes).await {
                                warn!(peer = %peer, error = %e, "connection failed");
                            }
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
                _ = &mut shutdown => {
                    info!("shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    executor: Arc<BatchExecutor>,
    max_bytes: usize,
) -> ServerResult<()> {
    let mut buffer = vec![0u8; max_bytes];
    let n = stream.read(&mut buffer).await?;
    if n == max_bytes {
        warn!(peer = %peer, max_bytes, "request filled the read buffer and may be truncated");
    }
    debug!(peer = %peer, bytes = n, "batch received");

    let payload = String::from_utf8_lossy(&buffer[..n]).into_owned();
    // Snapshot writes are synchronous; keep them off the async workers.
    let reply = tokio::task::spawn_blocking(move || executor.execute(&payload).to_wire()).await?;

    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
