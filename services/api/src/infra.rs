use credit_risk::config::ModelConfig;
use credit_risk::scoring::{LoadedModel, ModelArtifact, ModelLoadError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the configured artifact, letting a command-line path take precedence.
pub(crate) fn load_model(
    config: &ModelConfig,
    path_override: Option<PathBuf>,
) -> Result<LoadedModel, ModelLoadError> {
    let path = path_override.unwrap_or_else(|| config.path.clone());
    Ok(ModelArtifact::load(path)?.with_decision_threshold(config.decision_threshold))
}
