use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_ranker::config::AppConfig;
use lead_ranker::error::AppError;
use lead_ranker::telemetry;
use lead_ranker::workflows::scoring::{LeadScoringEngine, ScoringError};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = LeadScoringEngine::new(config.scoring.clone()).map_err(ScoringError::from)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine),
    };

    let app = lead_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
