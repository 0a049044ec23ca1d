use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use lpscope::{server, AppState, MetadataCache, Settings, SnapshotFetcher};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config. Please ensure config.{yaml,toml,json} is valid")?;

    let cache = Arc::new(MetadataCache::new(&settings.cache));
    let fetcher = Arc::new(
        SnapshotFetcher::new(&settings, cache).context("Failed to initialize chain clients")?,
    );

    let app = server::router(AppState::new(fetcher, &settings.server.dashboard_path));

    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;

    let cancellation_token = CancellationToken::new();

    let server_token = cancellation_token.child_token();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, app, server_token).await {
            error!("API server failed: {:#}", e);
        }
    });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Server running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    cancellation_token.cancel();

    info!("Waiting for in-flight requests to finish...");
    let _ = server_handle.await;

    info!("Server stopped");
    Ok(())
}
