//! In-memory mock storage server for `objstore-http` demos and benchmarks.

use std::sync::Arc;

use clap::Parser;
use objstore_http::server::{self, Store};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "objstore-server")]
#[command(about = "Mock bucket/object storage server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", env = "OBJSTORE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "OBJSTORE_PORT")]
    port: u16,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "OBJSTORE_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("objstore_http={0},objstore_server={0}", args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    let store = Arc::new(Store::new());

    server::serve(listener, store, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
    })
    .await?;

    Ok(())
}
