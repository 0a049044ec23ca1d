//! API request handlers

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use serde::Deserialize;
use std::io::ErrorKind;

use super::{responses::ApiResponse, AppState};
use crate::fetcher::{AnalyzeError, AnalyzeRequest};
use crate::valuation::PositionReport;

/// Raw `/analyze` query string. Every field is optional so that missing
/// parameters produce the API's own error body.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub chain: Option<String>,
    pub protocol: Option<String>,
    #[serde(rename = "tokenId")]
    pub token_id: Option<String>,
    #[serde(rename = "costUsd")]
    pub cost_usd: Option<String>,
}

/// Value one position
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> (StatusCode, Json<ApiResponse>) {
    match run_analysis(&state, &query).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))),
        Err(e) if e.is_client_error() => {
            warn!("Rejected analyze request: {}", e);
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        },
        Err(e) => {
            error!("Analyze request failed: {:#}", e);
            (StatusCode::BAD_GATEWAY, Json(ApiResponse::error(e.to_string())))
        },
    }
}

async fn run_analysis(
    state: &AppState,
    query: &AnalyzeQuery,
) -> Result<PositionReport, AnalyzeError> {
    let request = AnalyzeRequest::from_params(
        query.chain.as_deref(),
        query.protocol.as_deref(),
        query.token_id.as_deref(),
        query.cost_usd.as_deref(),
    )?;

    let result = state.fetcher.analyze(&request).await?;
    Ok(PositionReport::from(&result))
}

/// Serve the dashboard page
pub async fn dashboard(State(state): State<AppState>) -> Response {
    match tokio::fs::read(state.dashboard_path.as_path()).await {
        Ok(content) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            content,
        )
            .into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            "404 Not Found: index.html missing",
        )
            .into_response(),
        Err(e) => {
            error!(
                "Failed to read dashboard {}: {}",
                state.dashboard_path.display(),
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server Error: {:?}", e.kind()),
            )
                .into_response()
        },
    }
}

pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `OPTIONS /analyze` without CORS request headers. Real preflights are
/// answered by the CORS layer before reaching the router.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn not_found() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Endpoint not found. Use / or /analyze")),
    )
}
