//! LRU Cacher console
//!
//! Hosts one cache over an in-memory store and drives it from stdin, one
//! command per line:
//!
//! ```text
//! put <key> <value>
//! get <key>
//! del <key>
//! clear
//! len
//! stats
//! quit
//! ```

use std::future::Future;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_cacher::{spawn_gc_task, CacheConfig, LruCacher, MemoryStore};

type ConsoleCacher = LruCacher<String, MemoryStore<String>>;

/// Main entry point for the console.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache over an in-memory store
/// 4. Start the background GC task
/// 5. Serve stdin commands until `quit`, EOF, SIGINT or SIGTERM
/// 6. Stop the GC task
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_cacher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CacheConfig::from_env();
    config.validate().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: expired={:?}, max_element_size={}, gc_interval={:?}, gc_max_removed={}",
        config.expired, config.max_element_size, config.gc_interval, config.gc_max_removed
    );

    let cacher: Arc<ConsoleCacher> =
        Arc::new(LruCacher::with_config(MemoryStore::new(), config));
    let gc = spawn_gc_task(cacher.clone());

    serve_lines(&cacher, spawn_stdin_reader(), shutdown_signal()).await?;

    gc.shutdown().await;
    info!(
        "Final stats: {}",
        serde_json::to_string(&cacher.stats()).context("serializing stats")?
    );
    Ok(())
}

/// Forwards stdin lines over a channel from a dedicated thread.
///
/// The blocking read stays off the runtime, so returning from `main` never
/// waits for a line that may not come. The channel closes on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Runs commands from `lines` until `quit`, a closed channel or `shutdown`.
async fn serve_lines(
    cacher: &ConsoleCacher,
    mut lines: mpsc::Receiver<String>,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" {
                    break;
                }
                println!("{}", run_command(cacher, line)?);
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}

/// Executes one command line and returns the text to print.
fn run_command(cacher: &ConsoleCacher, line: &str) -> anyhow::Result<String> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let key = parts.next();
    let value = parts.next().map(str::trim);

    let reply = match (command, key, value) {
        ("put", Some(key), Some(value)) => {
            cacher.put(key, value.to_string())?;
            "OK".to_string()
        }
        ("get", Some(key), None) => cacher.get(key).unwrap_or_else(|| "(nil)".to_string()),
        ("del", Some(key), None) => {
            cacher.delete(key);
            "OK".to_string()
        }
        ("clear", None, None) => {
            cacher.clear();
            "OK".to_string()
        }
        ("len", None, None) => cacher.len().to_string(),
        ("stats", None, None) => serde_json::to_string_pretty(&cacher.stats())?,
        _ => {
            warn!(input = %line, "Unrecognized command");
            "ERR usage: put <key> <value> | get <key> | del <key> | clear | len | stats | quit"
                .to_string()
        }
    };
    Ok(reply)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
