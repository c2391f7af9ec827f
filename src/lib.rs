//! # linelog - Concurrent Line Server with a Single Log Sink
//!
//! linelog accepts any number of TCP clients, reads newline-terminated text
//! from each of them and funnels every ordinary line into one bounded mailbox.
//! A single sink drains the mailbox, prints each message and appends a
//! timestamped entry to an append-only log file.
//!
//! ## Features
//!
//! - **Fan-in**: one reader task per connection, one sink task, one bounded mailbox
//! - **Inline Commands**: lines starting with `/` are interpreted, never logged
//! - **Backpressure**: readers suspend on a full mailbox, nothing is dropped
//! - **Graceful Shutdown**: every line already read is logged before the log closes
//! - **Admission Control**: optional connection cap and idle timeout
//!
//! ## Quick Start
//!
//! ### Server
//! ```no_run
//! use linelog::config::ServerConfig;
//! use linelog::server::LineServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_file("config/server.toml")?;
//!     let server = LineServer::new(config).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### Client
//! ```no_run
//! use linelog::client::LineClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = LineClient::connect("127.0.0.1:3000").await?;
//!     client.join().await?;
//!     client.send_line("hello").await?;
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod server;
pub mod types;

/// Common error types used throughout linelog
pub mod error {
    use std::fmt;
    use std::path::PathBuf;

    /// linelog error types
    #[derive(Debug)]
    pub enum LineLogError {
        /// I/O operation failed
        Io(std::io::Error),
        /// Configuration error
        Config(String),
        /// The listening socket could not be bound
        Bind {
            /// Address that was requested
            addr: String,
            /// Underlying OS error
            source: std::io::Error,
        },
        /// The log file could not be opened
        LogWriter {
            /// Path of the log file
            path: PathBuf,
            /// Underlying OS error
            source: std::io::Error,
        },
        /// Client connection error
        Connection(String),
        /// The mailbox no longer accepts messages
        MailboxClosed,
        /// A background server task failed
        Task(String),
    }

    impl fmt::Display for LineLogError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                LineLogError::Io(e) => write!(f, "I/O error: {}", e),
                LineLogError::Config(e) => write!(f, "Configuration error: {}", e),
                LineLogError::Bind { addr, source } => {
                    write!(f, "Failed to bind {}: {}", addr, source)
                }
                LineLogError::LogWriter { path, source } => {
                    write!(f, "Failed to open log file {}: {}", path.display(), source)
                }
                LineLogError::Connection(e) => write!(f, "Connection error: {}", e),
                LineLogError::MailboxClosed => write!(f, "Mailbox is closed"),
                LineLogError::Task(e) => write!(f, "Server task failed: {}", e),
            }
        }
    }

    impl std::error::Error for LineLogError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                LineLogError::Io(e) => Some(e),
                LineLogError::Bind { source, .. } => Some(source),
                LineLogError::LogWriter { source, .. } => Some(source),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for LineLogError {
        fn from(err: std::io::Error) -> Self {
            LineLogError::Io(err)
        }
    }

    /// Result type alias for linelog operations
    pub type Result<T> = std::result::Result<T, LineLogError>;
}

pub use error::{LineLogError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::LineClient;
    pub use crate::config::ServerConfig;
    pub use crate::server::{LineServer, ServerHandle, ServerState};
    pub use crate::types::Message;
    pub use crate::{LineLogError, Result};
}
