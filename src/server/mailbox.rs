//! Bounded mailbox connecting connection readers to the sink

use crate::types::Message;
use crate::{LineLogError, Result};
use tokio::sync::mpsc;

/// Create a mailbox holding at most `capacity` undelivered messages.
///
/// # Panics
///
/// Panics if `capacity` is zero. [`ServerConfig::validate`] rejects that
/// value before a server is built.
///
/// [`ServerConfig::validate`]: crate::config::ServerConfig::validate
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (MailboxSender { tx }, MailboxReceiver { rx, capacity })
}

/// Producer half of the mailbox, cloned into every connection reader
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<Message>,
}

impl MailboxSender {
    /// Enqueue a message, waiting for room while the mailbox is full.
    ///
    /// Fails only if the receiver is gone.
    pub async fn deliver(&self, message: Message) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| LineLogError::MailboxClosed)
    }

    /// Whether the receiver has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of the mailbox, owned by the sink.
///
/// There is no way to close the mailbox from this side. It closes once
/// every [`MailboxSender`] has been dropped, so nothing a producer already
/// holds can be rejected.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Message>,
    capacity: usize,
}

impl MailboxReceiver {
    /// Next message in arrival order.
    ///
    /// Returns `None` once every sender has been dropped and the buffer is
    /// drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Number of messages currently buffered
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no messages are buffered
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
