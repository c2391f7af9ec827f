//! Performance benchmarks for linelog

use chrono::Local;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use linelog::client::LineClient;
use linelog::config::ServerConfig;
use linelog::server::storage::format_entry;
use linelog::server::{mailbox, LineServer, LogFile, Sink};
use linelog::types::Message;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use tokio::runtime::Runtime;

fn bench_config(dir: &Path, mailbox_capacity: usize) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.server.listen_addr = "127.0.0.1:0".to_string();
    config.server.mailbox_capacity = mailbox_capacity;
    config.storage.log_file = dir.join("data.txt");
    config
}

/// Wait until the log file holds `count` entries
async fn wait_for_entries(path: &Path, count: usize) {
    loop {
        let content = tokio::fs::read_to_string(path).await.unwrap_or_default();
        if content.lines().count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Benchmark one client pushing lines through the whole server
fn bench_single_client_throughput(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("single_client_throughput");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for message_count in [100, 1000, 5000].iter() {
        group.throughput(Throughput::Elements(*message_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(message_count),
            message_count,
            |b, &count| {
                b.to_async(&rt).iter(|| async move {
                    let temp_dir = tempdir().unwrap();
                    let config = bench_config(temp_dir.path(), 10);
                    let log_file = config.storage.log_file.clone();

                    let listening = LineServer::new(config).await.unwrap().bind().await.unwrap();
                    let addr = listening.local_addr();
                    let handle = listening.handle();
                    let server_task = tokio::spawn(listening.run());

                    let mut client = LineClient::connect(addr).await.unwrap();
                    for i in 0..count {
                        client.send_line(format!("Benchmark message {}", i)).await.unwrap();
                    }
                    client.close().await.unwrap();

                    wait_for_entries(&log_file, count).await;
                    handle.shutdown();
                    let _ = server_task.await;
                });
            },
        );
    }

    group.finish();
}

/// Benchmark many clients contending for mailboxes of different sizes
fn bench_concurrent_clients(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("concurrent_clients");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let clients = 10;
    let per_client = 100;
    group.throughput(Throughput::Elements((clients * per_client) as u64));

    for capacity in [1, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("mailbox_capacity", capacity),
            capacity,
            |b, &capacity| {
                b.to_async(&rt).iter(|| async move {
                    let temp_dir = tempdir().unwrap();
                    let config = bench_config(temp_dir.path(), capacity);
                    let log_file = config.storage.log_file.clone();

                    let listening = LineServer::new(config).await.unwrap().bind().await.unwrap();
                    let addr = listening.local_addr();
                    let handle = listening.handle();
                    let server_task = tokio::spawn(listening.run());

                    let mut senders = Vec::new();
                    for id in 0..clients {
                        senders.push(tokio::spawn(async move {
                            let mut client = LineClient::connect(addr).await.unwrap();
                            for i in 0..per_client {
                                client.send_line(format!("client {} line {}", id, i)).await.unwrap();
                            }
                            client.close().await.unwrap();
                        }));
                    }
                    for sender in senders {
                        sender.await.unwrap();
                    }

                    wait_for_entries(&log_file, clients * per_client).await;
                    handle.shutdown();
                    let _ = server_task.await;
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the mailbox and sink without sockets
fn bench_sink_pipeline(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("sink_pipeline");
    let count = 1000;
    group.throughput(Throughput::Elements(count as u64));

    group.bench_function("in_memory_log", |b| {
        b.to_async(&rt).iter(|| async move {
            let (sender, receiver) = mailbox(10);
            let sink = tokio::spawn(Sink::new(receiver, LogFile::from_writer(Vec::new())).run());
            for i in 0..count {
                sender
                    .deliver(Message::new("bench", format!("line {}\n", i).into_bytes()))
                    .await
                    .unwrap();
            }
            drop(sender);
            sink.await.unwrap();
        });
    });

    group.finish();
}

/// Benchmark log entry formatting
fn bench_entry_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_formatting");
    let now = Local::now();

    for size in [16, 1024, 64 * 1024].iter() {
        let message = Message::new("127.0.0.1:40000", format!("{}\n", "x".repeat(*size)).into_bytes());
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("payload_bytes", size), &message, |b, message| {
            b.iter(|| format_entry(message, &now));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_client_throughput,
    bench_concurrent_clients,
    bench_sink_pipeline,
    bench_entry_formatting
);
criterion_main!(benches);
