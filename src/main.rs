//! txkv - transactional key/value store
//!
//! This is the main entry point for the txkv command-line interface.

use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use txkv::server::{client, KvServer, ServerConfig, DEFAULT_MAX_REQUEST_BYTES};

/// Transactional key/value store over a line-oriented TCP protocol.
#[derive(Parser)]
#[command(name = "txkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Path of the snapshot file
        #[arg(short, long, default_value = "data.json")]
        data: PathBuf,

        /// Size of the single read that receives a batch
        #[arg(long, default_value_t = DEFAULT_MAX_REQUEST_BYTES)]
        max_request_bytes: usize,
    },

    /// Send one batch of commands and print the response
    Send {
        /// Server address
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        /// Commands, one per argument (read from stdin when omitted)
        commands: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Serve {
            bind,
            data,
            max_request_bytes,
        } => serve(bind, data, max_request_bytes).await,
        Commands::Send { addr, commands } => send(addr, commands).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn serve(
    bind: SocketAddr,
    data: PathBuf,
    max_request_bytes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(bind)
        .with_data_path(data)
        .with_max_request_bytes(max_request_bytes);

    let server = KvServer::new(config)?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;
    Ok(())
}

async fn send(addr: SocketAddr, commands: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let commands = if commands.is_empty() {
        io::stdin().lock().lines().collect::<io::Result<Vec<_>>>()?
    } else {
        commands
    };

    let reply = client::send_batch(addr, &commands).await?;
    println!("{}", reply);
    Ok(())
}
