//! Minimal TCP client speaking the linelog line protocol

use crate::{LineLogError, Result};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

/// How long [`LineClient::connect`] waits for the server
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client writing newline-terminated lines to a linelog server
#[derive(Debug)]
pub struct LineClient {
    stream: TcpStream,
    local_addr: SocketAddr,
}

impl LineClient {
    /// Connect to a server
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| LineLogError::Connection("Connection timeout".to_string()))?
            .map_err(|e| LineLogError::Connection(format!("Failed to connect: {}", e)))?;
        let local_addr = stream.local_addr()?;

        Ok(Self { stream, local_addr })
    }

    /// Address of this end of the connection; the server uses it as the
    /// origin of every message sent here
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send one line, adding the trailing `\n` when it is missing
    pub async fn send_line<S: AsRef<str>>(&mut self, line: S) -> Result<()> {
        let line = line.as_ref();
        self.stream.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.stream.write_all(b"\n").await?;
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Send raw bytes exactly as given
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Announce this connection with `/join`
    pub async fn join(&mut self) -> Result<()> {
        self.send_line("/join").await
    }

    /// Close the write side and drop the connection
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
