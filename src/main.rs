//! mockcdn -- in-memory content-distribution API server.
//!
//! Seeds a deterministic fixture (users, games, uploads, builds, CDN
//! blobs) into the store, then serves the API until SIGTERM/SIGINT.

use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use tracing::info;

use mockcdn::store::Store;

/// Command-line arguments for the mockcdn server.
#[derive(Parser, Debug)]
#[command(
    name = "mockcdn",
    version,
    about = "In-memory content-distribution API server for download-flow testing"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "mockcdn.example.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = mockcdn::config::load_config(&cli.config)?;

    // Initialize tracing / logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Loaded configuration from {}", cli.config);

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    let store = Store::new();
    seed_fixture(&store, &config.auth.api_key);
    info!("Fixture seeded (API key: {})", config.auth.api_key);

    let state = Arc::new(mockcdn::AppState { store });
    let app = mockcdn::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("mockcdn listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mockcdn shut down");

    Ok(())
}

/// Seed the deterministic fixture the binary serves.
///
/// One developer account owning a free published game (with a hosted
/// upload and a build-backed upload), plus a second account with an
/// unpublished game so authorization denials are exercisable.
fn seed_fixture(store: &Store, api_key: &str) {
    let dev = store.make_user("Fixture Dev");
    store.make_api_key(dev.id, api_key);

    let game = store.make_game(dev.id, "Sample Game");
    let payload: Bytes = (0..4096u32).map(|i| (i % 251) as u8).collect();
    store.make_hosted_upload(game.id, "sample-game.zip", payload.clone());

    let build_upload = store.make_build_upload(game.id, "sample-build.zip");
    let build = store.make_build(build_upload.id);
    store.make_build_file(build.id, "archive", "default", "sample-build.zip", payload);

    let other = store.make_user("Other Dev");
    store.make_hidden_game(other.id, "Unreleased Game");
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
