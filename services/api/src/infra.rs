use lead_ranker::workflows::scoring::LeadScoringEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Engine built from the startup configuration; requests carrying their own config
    /// build a one-off engine instead.
    pub(crate) engine: Arc<LeadScoringEngine>,
}

pub(crate) fn parse_score(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a score ({err})"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("score {value} must be between 0 and 100"))
    }
}
