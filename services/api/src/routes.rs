use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use lead_ranker::error::AppError;
use lead_ranker::workflows::ingest::LeadImporter;
use lead_ranker::workflows::scoring::{
    BatchReport, LeadFilter, LeadScoringEngine, ScoringConfig, ScoringError,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

/// Leads arrive either as raw CSV text or as JSON objects keyed by column name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ScoreLeadsRequest {
    pub(crate) csv: Option<String>,
    pub(crate) rows: Option<Vec<Map<String, Value>>>,
    /// Replaces the server configuration for this request; omitted keys use defaults.
    pub(crate) config: Option<ScoringConfig>,
    pub(crate) filter: LeadFilter,
}

pub(crate) fn lead_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/leads/score",
            axum::routing::post(score_leads_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_leads_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreLeadsRequest>,
) -> Result<Json<BatchReport>, AppError> {
    let ScoreLeadsRequest {
        csv,
        rows,
        config,
        filter,
    } = payload;

    let engine = match config {
        Some(config) => Arc::new(LeadScoringEngine::new(config).map_err(ScoringError::from)?),
        None => state.engine.clone(),
    };

    let batch = match (csv, rows) {
        (Some(csv), None) => LeadImporter::from_reader(Cursor::new(csv.into_bytes()))?,
        (None, Some(rows)) => LeadImporter::from_json_rows(&rows),
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "provide either `csv` or `rows`, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "request must include `csv` or `rows`".to_string(),
            ))
        }
    };

    // Scoring is CPU-bound and may fan out across threads for large batches.
    let report = tokio::task::spawn_blocking(move || {
        engine
            .score_batch(batch)
            .map(|scored| scored.report(&filter))
    })
    .await
    .map_err(|err| AppError::Io(std::io::Error::other(err)))??;

    info!(
        scored = report.summary.scored,
        matched = report.matched,
        "served lead scoring request"
    );
    Ok(Json(report))
}
