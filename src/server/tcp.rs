//! TCP accept loop and per-connection line readers for linelog

use crate::server::command;
use crate::server::context::ServerContext;
use crate::types::Message;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Source of incoming connections.
///
/// Implemented for [`TcpListener`]; the accept loop only depends on this
/// trait so it can be driven by other stream sources.
pub trait Listener: Send + 'static {
    /// Byte stream produced for each accepted connection
    type Stream: AsyncRead + Unpin + Send + 'static;

    /// Wait for the next connection and return it with its remote identifier
    fn accept(&mut self) -> impl Future<Output = io::Result<(Self::Stream, String)>> + Send;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    fn accept(&mut self) -> impl Future<Output = io::Result<(TcpStream, String)>> + Send {
        async move {
            let (stream, addr) = TcpListener::accept(self).await?;
            Ok((stream, addr.to_string()))
        }
    }
}

/// Why a connection reader stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The client closed its end of the stream
    ClientClosed,
    /// Reading from the stream failed
    ReadError,
    /// Nothing arrived within the configured idle timeout
    IdleTimeout,
    /// The server is shutting down
    Shutdown,
    /// The mailbox stopped accepting messages
    MailboxClosed,
    /// The client sent a line longer than the configured maximum
    LineTooLong,
}

/// Accept loop owning the listening socket and tracking its readers
pub struct ConnectionSupervisor<L> {
    listener: L,
    context: ServerContext,
    readers: TaskTracker,
}

impl<L: Listener> ConnectionSupervisor<L> {
    /// Create a supervisor for an already bound listener
    pub fn new(listener: L, context: ServerContext) -> Self {
        Self {
            listener,
            context,
            readers: TaskTracker::new(),
        }
    }

    /// Accept connections until the shutdown signal fires, then wait for
    /// every connection reader to finish.
    ///
    /// Accept errors are logged and the loop carries on. The listener is
    /// dropped, and so closed, as soon as accepting stops. Readers finish
    /// delivering the lines they already hold, so the mailbox loses its last
    /// sender only when this returns.
    pub async fn run(self) {
        let ConnectionSupervisor {
            mut listener,
            context,
            readers,
        } = self;
        let shutdown = context.shutdown().clone();

        loop {
            let permit = match context.admission() {
                Some(gate) => {
                    let gate = gate.clone();
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        permit = gate.acquire_owned() => match permit {
                            Ok(permit) => Some(permit),
                            Err(_) => break,
                        },
                    }
                }
                None => None,
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, origin)) => {
                        info!("new connection to the server: {}", origin);
                        let context = context.clone();
                        readers.spawn(async move {
                            handle_connection(stream, origin, context).await;
                            drop(permit);
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "accept error");
                    }
                },
            }
        }

        drop(listener);
        drop(context);
        readers.close();
        debug!(active = readers.len(), "Accept loop stopped, waiting for connection readers");
        readers.wait().await;
        debug!("Connection readers finished");
    }
}

/// Read lines from one connection until it ends.
///
/// Lines whose trimmed text starts with `/` are handed to the command
/// interpreter; every other line becomes a [`Message`] in the mailbox. The
/// stream is dropped on return, whatever the reason.
pub async fn handle_connection<S>(stream: S, origin: String, context: ServerContext) -> Disconnect
where
    S: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();

    let reason = loop {
        line.clear();
        match next_line(&mut reader, &mut line, &context).await {
            LineRead::Complete => {}
            LineRead::Eof => {
                if !line.is_empty() {
                    debug!(origin = %origin, bytes = line.len(), "Discarding unterminated line");
                }
                break Disconnect::ClientClosed;
            }
            LineRead::Idle => break Disconnect::IdleTimeout,
            LineRead::Shutdown => break Disconnect::Shutdown,
            LineRead::TooLong => {
                warn!(origin = %origin, bytes = line.len(), "line exceeds maximum length");
                break Disconnect::LineTooLong;
            }
            LineRead::Failed(e) => {
                warn!(origin = %origin, "read error: {}", e);
                break Disconnect::ReadError;
            }
        }

        let handled_as_command = {
            let text = String::from_utf8_lossy(&line);
            if command::is_command(&text) {
                command::interpret(&origin, text.trim());
                true
            } else {
                false
            }
        };
        if handled_as_command {
            continue;
        }

        let message = Message::new(origin.clone(), std::mem::take(&mut line));
        if context.mailbox().deliver(message).await.is_err() {
            break Disconnect::MailboxClosed;
        }
    };

    match reason {
        Disconnect::ClientClosed => info!("connection closed by client: {}", origin),
        Disconnect::ReadError => info!("connection closed after read error: {}", origin),
        Disconnect::IdleTimeout => info!("connection closed after idle timeout: {}", origin),
        Disconnect::LineTooLong => info!("connection closed after oversized line: {}", origin),
        Disconnect::Shutdown | Disconnect::MailboxClosed => {
            debug!(origin = %origin, reason = ?reason, "connection closed by server")
        }
    }

    reason
}

/// Outcome of reading one line
#[derive(Debug)]
enum LineRead {
    /// A full line, terminator included
    Complete,
    /// End of stream; the line buffer holds any unterminated tail
    Eof,
    Idle,
    Shutdown,
    TooLong,
    Failed(io::Error),
}

/// Read up to and including the next `\n`.
///
/// Bytes already buffered are used before the socket is touched, so lines
/// that arrived before shutdown are still returned. The shutdown signal and
/// the idle timeout only apply while waiting for more bytes, and the timer
/// starts over for every chunk.
async fn next_line<S>(reader: &mut BufReader<S>, line: &mut Vec<u8>, context: &ServerContext) -> LineRead
where
    S: AsyncRead + Unpin,
{
    loop {
        if reader.buffer().is_empty() {
            let filled = tokio::select! {
                biased;
                _ = context.shutdown().cancelled() => return LineRead::Shutdown,
                filled = fill(reader, context.idle_timeout()) => filled,
            };
            match filled {
                None => return LineRead::Idle,
                Some(Ok(0)) => return LineRead::Eof,
                Some(Ok(_)) => {}
                Some(Err(e)) => return LineRead::Failed(e),
            }
        }

        let buffered = reader.buffer();
        let (used, complete) = match buffered.iter().position(|&b| b == b'\n') {
            Some(end) => (end + 1, true),
            None => (buffered.len(), false),
        };
        line.extend_from_slice(&buffered[..used]);
        reader.consume(used);

        if context.max_line_length().is_some_and(|max| line.len() > max) {
            return LineRead::TooLong;
        }
        if complete {
            return LineRead::Complete;
        }
    }
}

/// Wait for the next chunk. `None` means the idle timeout elapsed first.
async fn fill<S>(reader: &mut BufReader<S>, idle_timeout: Option<Duration>) -> Option<io::Result<usize>>
where
    S: AsyncRead + Unpin,
{
    match idle_timeout {
        Some(limit) => timeout(limit, reader.fill_buf())
            .await
            .ok()
            .map(|filled| filled.map(|chunk| chunk.len())),
        None => Some(reader.fill_buf().await.map(|chunk| chunk.len())),
    }
}
