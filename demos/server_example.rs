//! linelog Server Example

use linelog::config::ServerConfig;
use linelog::server::LineServer;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting linelog Server Example");

    // Create temporary directory for this example
    let temp_dir = tempdir()?;

    // Create custom configuration
    let mut config = ServerConfig::default();
    config.server.listen_addr = "127.0.0.1:3000".to_string();
    config.server.idle_timeout_secs = Some(600);
    config.storage.log_file = temp_dir.path().join("data.txt");

    println!("Configuration created:");
    println!("  Listen address: {}", config.server.listen_addr);
    println!("  Log file: {}", config.storage.log_file.display());

    let server = LineServer::new(config).await?;
    let handle = server.handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown();
        }
    });

    println!("linelog server starting...");
    println!("Try: printf 'hello\\n/join\\n' | nc 127.0.0.1 3000");
    println!("Press Ctrl+C to stop the server");

    if let Err(e) = server.start().await {
        eprintln!("Server error: {}", e);
    }

    println!("Server stopped");
    Ok(())
}
