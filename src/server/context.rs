//! Per-server state shared by the accept loop and connection readers

use crate::server::mailbox::MailboxSender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Everything a connection needs from its server.
///
/// Cloning is cheap; each reader task holds its own clone, which keeps the
/// mailbox sender alive for as long as the reader runs.
#[derive(Debug, Clone)]
pub struct ServerContext {
    mailbox: MailboxSender,
    shutdown: CancellationToken,
    admission: Option<Arc<Semaphore>>,
    idle_timeout: Option<Duration>,
    max_line_length: Option<usize>,
}

impl ServerContext {
    /// Context with no connection cap, no idle timeout and no line cap
    pub fn new(mailbox: MailboxSender, shutdown: CancellationToken) -> Self {
        Self {
            mailbox,
            shutdown,
            admission: None,
            idle_timeout: None,
            max_line_length: None,
        }
    }

    /// Allow at most `max` connections to be served at once
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.admission = Some(Arc::new(Semaphore::new(max)));
        self
    }

    /// Close connections that send nothing for `timeout`
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Close connections that send a line longer than `max` bytes
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = Some(max);
        self
    }

    /// Destination for plain-content lines
    pub fn mailbox(&self) -> &MailboxSender {
        &self.mailbox
    }

    /// Server-wide shutdown signal
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Admission gate, when a connection cap is configured
    pub fn admission(&self) -> Option<&Arc<Semaphore>> {
        self.admission.as_ref()
    }

    /// Idle timeout applied to each read
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Longest accepted line in bytes, terminator included
    pub fn max_line_length(&self) -> Option<usize> {
        self.max_line_length
    }
}
