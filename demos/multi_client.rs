//! Multi-Client linelog Example
//!
//! Starts a server in-process, connects several clients at different
//! rates, then shuts the server down and prints the resulting log.

use linelog::client::LineClient;
use linelog::config::ServerConfig;
use linelog::server::LineServer;
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting Multi-Client linelog Example");

    let temp_dir = tempdir()?;
    let mut config = ServerConfig::default();
    config.server.listen_addr = "127.0.0.1:0".to_string();
    config.server.mailbox_capacity = 4;
    config.storage.log_file = temp_dir.path().join("data.txt");
    let log_file = config.storage.log_file.clone();

    let listening = LineServer::new(config).await?.bind().await?;
    let addr = listening.local_addr();
    let handle = listening.handle();
    let server_task = tokio::spawn(listening.run());
    println!("Server listening on {}", addr);

    let client_configs = vec![("web", 50), ("auth", 80), ("database", 120)];

    let mut clients = Vec::new();
    for (name, interval_ms) in client_configs {
        clients.push(tokio::spawn(async move {
            if let Err(e) = run_client(addr, name, interval_ms).await {
                eprintln!("Client {} error: {}", name, e);
            }
        }));
    }
    for client in clients {
        client.await?;
    }

    // Let the sink catch up before asking it to stop
    sleep(Duration::from_millis(200)).await;
    handle.shutdown();
    let report = server_task.await??;
    println!(
        "Server stopped: {} messages, {} append failures",
        report.processed, report.append_failures
    );

    println!("--- {} ---", log_file.display());
    print!("{}", tokio::fs::read_to_string(&log_file).await?);
    Ok(())
}

async fn run_client(
    addr: SocketAddr,
    name: &str,
    interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut client = LineClient::connect(addr).await?;
    client.join().await?;

    for i in 0..5 {
        client.send_line(format!("{} status update {}", name, i)).await?;
        sleep(Duration::from_millis(interval_ms)).await;
    }

    client.close().await?;
    Ok(())
}
