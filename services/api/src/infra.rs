use chrono::NaiveDate;
use emr_core::clinical::risk::{JsonFileModelStore, TrainingPolicy};
use emr_core::clinical::{ClinicalDecisionService, SafetyCheckEngine};
use emr_core::config::ModelConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type DiskBackedService = ClinicalDecisionService<JsonFileModelStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Clinical service persisting its risk model at the configured path.
pub(crate) fn disk_backed_service(config: &ModelConfig) -> Arc<DiskBackedService> {
    let store = Arc::new(JsonFileModelStore::new(&config.path));
    Arc::new(ClinicalDecisionService::new(
        store,
        TrainingPolicy::from(config.allow_training),
        SafetyCheckEngine::default(),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
