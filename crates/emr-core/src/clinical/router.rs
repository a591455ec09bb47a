use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::risk::{ModelStore, PatientFeatures, RiskModelError};
use super::service::{ClinicalDecisionService, SafetyCheckRequest};

/// Router builder exposing risk scoring and prescription safety checks.
pub fn clinical_router<S>(service: Arc<ClinicalDecisionService<S>>) -> Router
where
    S: ModelStore + 'static,
{
    Router::new()
        .route("/api/v1/risk/predictions", post(predict_handler::<S>))
        .route("/api/v1/risk/model", post(retrain_handler::<S>))
        .route(
            "/api/v1/risk/feature-importance",
            get(feature_importance_handler::<S>),
        )
        .route(
            "/api/v1/prescriptions/safety-check",
            post(safety_check_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn predict_handler<S>(
    State(service): State<Arc<ClinicalDecisionService<S>>>,
    axum::Json(features): axum::Json<PatientFeatures>,
) -> Response
where
    S: ModelStore + 'static,
{
    // The first prediction may load or fit the model, which blocks on disk and CPU.
    let outcome = tokio::task::spawn_blocking(move || service.assess_risk(&features)).await;
    match outcome {
        Ok(Ok(assessment)) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Ok(Err(error)) => risk_error_response(error),
        Err(join_error) => task_failure_response("scoring", join_error),
    }
}

pub(crate) async fn retrain_handler<S>(
    State(service): State<Arc<ClinicalDecisionService<S>>>,
) -> Response
where
    S: ModelStore + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || service.retrain()).await;
    match outcome {
        Ok(Ok(summary)) => (StatusCode::CREATED, axum::Json(summary)).into_response(),
        Ok(Err(error)) => risk_error_response(error),
        Err(join_error) => task_failure_response("training", join_error),
    }
}

pub(crate) async fn feature_importance_handler<S>(
    State(service): State<Arc<ClinicalDecisionService<S>>>,
) -> Response
where
    S: ModelStore + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || service.feature_importance()).await;
    match outcome {
        Ok(Ok(importance)) => {
            let payload = json!({ "feature_importance": importance });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(Err(error)) => risk_error_response(error),
        Err(join_error) => task_failure_response("model lookup", join_error),
    }
}

pub(crate) async fn safety_check_handler<S>(
    State(service): State<Arc<ClinicalDecisionService<S>>>,
    axum::Json(request): axum::Json<SafetyCheckRequest>,
) -> Response
where
    S: ModelStore + 'static,
{
    let alerts = service.review_prescription(&request);
    (StatusCode::OK, axum::Json(alerts)).into_response()
}

fn risk_error_response(error: RiskModelError) -> Response {
    let status = match error {
        RiskModelError::NotFound | RiskModelError::ModelNotAvailable => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        RiskModelError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn task_failure_response(task: &str, join_error: tokio::task::JoinError) -> Response {
    let payload = json!({
        "error": format!("{task} task failed: {join_error}"),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
