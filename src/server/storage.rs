//! Append-only log file receiving one entry per message

use crate::types::Message;
use crate::{LineLogError, Result};
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use std::fmt::Display;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Render the log entry recorded for `message` received at `received_at`.
///
/// The time keeps the zone it was taken in; a zero offset is written as `Z`.
pub fn format_entry<Tz>(message: &Message, received_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Your message is: {}. Received time: {}\n",
        message.content(),
        received_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Log writer owned by the sink.
///
/// Each append is flushed before it returns, so an entry is on its way to
/// disk by the time the next message is processed. Callers never share a
/// `LogFile` across tasks.
#[derive(Debug)]
pub struct LogFile<W = BufWriter<File>> {
    writer: W,
}

impl LogFile {
    /// Open `path` in create-or-append mode
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| LineLogError::LogWriter {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: AsyncWrite + Unpin> LogFile<W> {
    /// Wrap an arbitrary writer
    pub fn from_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Append an entry for `message` stamped with the local time
    pub async fn append(&mut self, message: &Message) -> Result<()> {
        self.append_at(message, &Local::now()).await
    }

    /// Append an entry using an explicit receive time
    pub async fn append_at<Tz>(&mut self, message: &Message, received_at: &DateTime<Tz>) -> Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let entry = format_entry(message, received_at);
        self.writer.write_all(entry.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Flush and release the underlying writer
    pub async fn close(mut self) -> Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Consume the log and hand back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}
