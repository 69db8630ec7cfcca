//! Storefront guard server.
//!
//! ```text
//!   browser / guard-cli                      storefront-guard
//!   ───────────────────                      ──────────────────────────────────────
//!   canonical body + path                    request ID → trace → limits → timeout
//!   HMAC(ts + METHOD + path + body)  ──────▶ signature guard (403 on any mismatch)
//!   x-signature / x-timestamp                handlers ──▶ vendor API (apiKey/secretKey)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use storefront_guard::config::load_config;
use storefront_guard::http::HttpServer;
use storefront_guard::lifecycle::{wait_for_signal, Shutdown};
use storefront_guard::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "storefront-guard")]
#[command(about = "Signed-request gateway for the storefront API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "storefront-guard.toml", env = "GUARD_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = logging::with_bootstrap_logging(|| load_config(&args.config))?;

    logging::init_logging(&config.observability);
    tracing::info!("storefront-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        vendor = %config.vendor.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Stopping");
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
