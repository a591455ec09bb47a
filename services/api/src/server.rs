use crate::cli::ServeArgs;
use crate::infra::{disk_backed_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use emr_core::clinical::RiskModelError;
use emr_core::config::AppConfig;
use emr_core::error::AppError;
use emr_core::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let clinical_service = disk_backed_service(&config.model);
    match clinical_service.scorer().load() {
        Ok(model) => info!(version = %model.version, "serving persisted risk model"),
        Err(RiskModelError::NotFound) => info!(
            path = %config.model.path.display(),
            allow_training = config.model.allow_training,
            "no persisted risk model yet"
        ),
        Err(err) => warn!(error = %err, "persisted risk model could not be loaded"),
    }

    let app = with_service_routes(clinical_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "clinical decision support service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
