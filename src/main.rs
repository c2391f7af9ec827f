//! linelog Server Binary
//!
//! Accepts TCP clients and records every line they send in one log file.

use clap::Parser;
use linelog::config::ServerConfig;
use linelog::server::LineServer;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "linelog-server")]
#[command(about = "Concurrent TCP line server with a single timestamped log")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/server.toml")]
    config: PathBuf,

    /// Address to listen on (e.g. 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log file receiving one entry per message
    #[arg(short = 'o', long)]
    log_file: Option<PathBuf>,

    /// Maximum concurrent connections
    #[arg(long)]
    max_connections: Option<usize>,

    /// Close connections silent for this many seconds
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Close connections that send a line longer than this many bytes
    #[arg(long)]
    max_line_bytes: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if args.verbose {
            "linelog=debug,info"
        } else {
            "linelog=info,warn"
        })
        .with_target(false)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting linelog server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = if args.config.exists() {
        ServerConfig::from_file(&args.config)?
    } else {
        info!("Config file not found, using defaults");
        ServerConfig::default()
    };

    // Override config with CLI arguments
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }
    if let Some(log_file) = args.log_file {
        config.storage.log_file = log_file;
    }
    if args.max_connections.is_some() {
        config.server.max_connections = args.max_connections;
    }
    if args.idle_timeout.is_some() {
        config.server.idle_timeout_secs = args.idle_timeout;
    }
    if args.max_line_bytes.is_some() {
        config.server.max_line_bytes = args.max_line_bytes;
    }

    config.validate()?;

    info!("Listen address: {}", config.server.listen_addr);
    info!("Log file: {}", config.storage.log_file.display());
    info!("Mailbox capacity: {}", config.server.mailbox_capacity);

    let server = match LineServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create server: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl+C requests a graceful shutdown; the server drains before returning
    let handle = server.handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                handle.shutdown();
            }
            Err(e) => error!("Failed to install CTRL+C signal handler: {}", e),
        }
    });

    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("linelog server stopped");
    Ok(())
}
