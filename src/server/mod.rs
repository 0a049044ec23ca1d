//! HTTP API over the snapshot fetcher

mod handlers;
mod responses;

pub use handlers::AnalyzeQuery;
pub use responses::ApiResponse;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::fetcher::SnapshotFetcher;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<SnapshotFetcher>,
    pub dashboard_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(fetcher: Arc<SnapshotFetcher>, dashboard_path: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            dashboard_path: Arc::new(dashboard_path.into()),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/analyze",
            get(handlers::analyze)
                .options(handlers::preflight)
                .fallback(handlers::not_found),
        )
        .route("/", get(handlers::dashboard))
        .route("/index.html", get(handlers::dashboard))
        .route("/favicon.ico", get(handlers::favicon))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
}

/// Serve `app` on `listener` until `cancel_token` is cancelled.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("API server listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel_token.cancelled().await })
        .await
}
