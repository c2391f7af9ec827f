//! Single consumer draining the mailbox into the console and the log file

use crate::server::mailbox::MailboxReceiver;
use crate::server::storage::LogFile;
use crate::types::Message;
use tokio::fs::File;
use tokio::io::{AsyncWrite, BufWriter};
use tracing::{debug, info, warn};

/// Counters returned when the sink stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Messages taken from the mailbox
    pub processed: u64,
    /// Messages whose log entry could not be written
    pub append_failures: u64,
}

/// The only consumer of the mailbox
#[derive(Debug)]
pub struct Sink<W = BufWriter<File>> {
    mailbox: MailboxReceiver,
    log: LogFile<W>,
}

impl<W: AsyncWrite + Unpin> Sink<W> {
    /// Create a sink that owns both the mailbox receiver and the log
    pub fn new(mailbox: MailboxReceiver, log: LogFile<W>) -> Self {
        Self { mailbox, log }
    }

    /// Consume messages until the mailbox is closed and empty, then close
    /// the log.
    ///
    /// The mailbox closes when the last sender is dropped. During shutdown
    /// that happens only after the accept loop and every connection reader
    /// have finished, so the sink keeps draining while readers still hold
    /// lines they have already read.
    pub async fn run(mut self) -> SinkReport {
        let mut report = SinkReport::default();

        while let Some(message) = self.mailbox.recv().await {
            self.process(message, &mut report).await;
        }
        debug!("Mailbox closed, closing log file");

        if let Err(e) = self.log.close().await {
            warn!(error = %e, "Failed to close log file");
        }

        debug!(
            processed = report.processed,
            append_failures = report.append_failures,
            "Sink stopped"
        );
        report
    }

    async fn process(&mut self, message: Message, report: &mut SinkReport) {
        info!(
            "received message from connection: {} {}",
            message.origin(),
            message.content()
        );
        report.processed += 1;

        if let Err(e) = self.log.append(&message).await {
            warn!(origin = %message.origin(), error = %e, "Error writing to log file");
            report.append_failures += 1;
        }
    }
}
