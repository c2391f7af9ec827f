//! linelog Client Example

use linelog::client::LineClient;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting linelog Client Example");

    let addr = "127.0.0.1:3000";

    match LineClient::connect(addr).await {
        Ok(mut client) => {
            println!("Connected to linelog server as {}", client.local_addr());

            // Announce ourselves; commands are never written to the log
            client.join().await?;

            client.send_line("Application started").await?;

            // Simulate some activity
            for i in 1..=5 {
                client.send_line(format!("Processing iteration {}", i)).await?;
                sleep(Duration::from_millis(500)).await;
            }

            client.close().await?;
            println!("Client connection closed");
        }
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            eprintln!("Make sure the server is running");
        }
    }

    Ok(())
}
