//! Minimal client: send one batch, read the combined response.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Send `commands` as one newline-separated batch and return the raw reply.
///
/// The write side is closed after sending, and the reply is read until the
/// server closes the connection.
pub async fn send_batch<A, S>(addr: A, commands: &[S]) -> io::Result<String>
where
    A: ToSocketAddrs,
    S: AsRef<str>,
{
    let payload = commands
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join("\n");

    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(payload.as_bytes()).await?;
    stream.shutdown().await?;

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await?;
    Ok(String::from_utf8_lossy(&reply).into_owned())
}
