//! Message type carried through the mailbox

use bytes::Bytes;
use std::fmt;

/// A plain-content line received from a client, tagged with its origin.
///
/// Messages are immutable once created. The payload keeps the raw bytes of
/// the line exactly as they were read, including the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    origin: String,
    payload: Bytes,
}

impl Message {
    /// Create a message from its origin and raw line bytes
    pub fn new(origin: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            origin: origin.into(),
            payload: payload.into(),
        }
    }

    /// Identifier of the connection that produced this message
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Raw bytes of the line, terminator included
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload as text with a single trailing `\n` or `\r\n` removed.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the wire format makes
    /// no character-set promises.
    pub fn content(&self) -> String {
        let line = strip_terminator(&self.payload);
        String::from_utf8_lossy(line).into_owned()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.content())
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
