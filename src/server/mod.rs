//! linelog server implementation

pub mod command;
pub mod context;
pub mod mailbox;
pub mod sink;
pub mod storage;
pub mod tcp;

use crate::config::ServerConfig;
use crate::{LineLogError, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub use context::ServerContext;
pub use mailbox::{mailbox, MailboxReceiver, MailboxSender};
pub use sink::{Sink, SinkReport};
pub use storage::LogFile;
pub use tcp::{handle_connection, ConnectionSupervisor, Disconnect, Listener};

/// Lifecycle of a server. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    /// Log file open, mailbox allocated, not yet bound
    Created,
    /// Accepting connections and draining the mailbox
    Listening,
    /// Shutdown requested; readers finishing and the mailbox draining
    ShuttingDown,
    /// Every server task has finished
    Stopped,
}

/// Cloneable handle used to observe a server and ask it to stop
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shutdown: CancellationToken,
    state: watch::Receiver<ServerState>,
}

impl ServerHandle {
    /// Request a graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Wait until the server reaches `target` or a later state.
    ///
    /// Returns the state actually observed; if the server is dropped before
    /// reaching `target` that is the last state it published.
    pub async fn wait_for(&self, target: ServerState) -> ServerState {
        let mut state = self.state.clone();
        let reached = state.wait_for(|current| *current >= target).await.map(|s| *s);
        match reached {
            Ok(current) => current,
            Err(_) => *state.borrow(),
        }
    }
}

/// Main linelog server; owns the log file and the mailbox until it runs
pub struct LineServer {
    config: ServerConfig,
    log: LogFile,
    context: ServerContext,
    mailbox: MailboxReceiver,
    state: watch::Sender<ServerState>,
}

impl LineServer {
    /// Create a new server with the given configuration.
    ///
    /// Fails if the configuration is invalid or the log file cannot be
    /// opened.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let log = LogFile::open(&config.storage.log_file).await?;
        let (sender, receiver) = mailbox(config.server.mailbox_capacity);

        let mut context = ServerContext::new(sender, CancellationToken::new());
        if let Some(max) = config.server.max_connections {
            context = context.with_max_connections(max);
        }
        if let Some(idle) = config.server.idle_timeout() {
            context = context.with_idle_timeout(idle);
        }
        if let Some(max) = config.server.max_line_bytes {
            context = context.with_max_line_length(max);
        }

        let (state, _) = watch::channel(ServerState::Created);

        Ok(Self {
            config,
            log,
            context,
            mailbox: receiver,
            state,
        })
    }

    /// Handle for requesting shutdown and watching state changes
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: self.context.shutdown().clone(),
            state: self.state.subscribe(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Bind the listening socket
    pub async fn bind(self) -> Result<ListeningServer> {
        let addr = &self.config.server.listen_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LineLogError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        self.state.send_replace(ServerState::Listening);
        info!(address = %local_addr, log_file = %self.config.storage.log_file.display(), "Server listening");

        Ok(ListeningServer {
            listener,
            local_addr,
            log: self.log,
            context: self.context,
            mailbox: self.mailbox,
            state: self.state,
        })
    }

    /// Bind and serve until shutdown is requested
    pub async fn start(self) -> Result<()> {
        self.bind().await?.run().await?;
        Ok(())
    }
}

/// A server whose socket is bound but whose tasks are not running yet
pub struct ListeningServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    log: LogFile,
    context: ServerContext,
    mailbox: MailboxReceiver,
    state: watch::Sender<ServerState>,
}

impl ListeningServer {
    /// Address the socket is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for requesting shutdown and watching state changes
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: self.context.shutdown().clone(),
            state: self.state.subscribe(),
        }
    }

    /// Run the accept loop and the sink until shutdown is requested.
    ///
    /// Shutdown stops accepting, waits for every connection reader to
    /// deliver what it already read, lets the sink drain the now closed
    /// mailbox and finally closes the log.
    pub async fn run(self) -> Result<SinkReport> {
        let ListeningServer {
            listener,
            log,
            context,
            mailbox,
            state,
            ..
        } = self;
        let shutdown = context.shutdown().clone();

        let sink = tokio::spawn(Sink::new(mailbox, log).run());
        let supervisor = tokio::spawn(ConnectionSupervisor::new(listener, context).run());

        shutdown.cancelled().await;
        state.send_replace(ServerState::ShuttingDown);
        info!("Shutdown signal received");

        if let Err(e) = supervisor.await {
            warn!(error = %e, "Accept loop ended abnormally");
        }
        let report = sink.await.map_err(|e| LineLogError::Task(e.to_string()));

        state.send_replace(ServerState::Stopped);
        if let Ok(report) = &report {
            info!(
                processed = report.processed,
                append_failures = report.append_failures,
                "Server stopped"
            );
        }
        report
    }
}
