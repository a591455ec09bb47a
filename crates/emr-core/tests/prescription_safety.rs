//! Integration scenarios for prescription safety checks.
//!
//! Exercises the allergy and interaction checks through the public engine and
//! the HTTP router, including custom interaction tables loaded from JSON.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use emr_core::clinical::risk::{InMemoryModelStore, TrainingPolicy};
use emr_core::clinical::safety::{ConflictRule, ConflictTable};
use emr_core::clinical::{
    clinical_router, ActivePrescription, ClinicalDecisionService, PrescriptionCandidate,
    SafetyCheckEngine, SafetyCheckRequest,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[test]
fn custom_table_loaded_from_json_is_case_insensitive() {
    let table: ConflictTable = serde_json::from_value(json!([
        { "drug": "Clopidogrel", "conflicts_with": ["OMEPRAZOLE"] }
    ]))
    .expect("table parses");
    let engine = SafetyCheckEngine::new(table);

    let alert = engine.check_conflicts(
        "clopidogrel 75mg",
        &[ActivePrescription::active("Omeprazole 20mg")],
    );

    assert!(alert.has_alert());
    assert_eq!(
        alert.message(),
        "WARNING: Potential conflict with: Omeprazole 20mg"
    );
    assert!(!engine
        .check_conflicts("warfarin", &[ActivePrescription::active("aspirin")])
        .has_alert());
}

#[test]
fn standard_table_serializes_as_rule_list() {
    let value = serde_json::to_value(ConflictTable::standard()).expect("serializes");
    let rules: Vec<ConflictRule> = serde_json::from_value(value).expect("rule list");

    assert_eq!(rules.len(), 4);
    assert_eq!(rules[0].drug, "warfarin");
    assert_eq!(rules[0].conflicts_with, ["aspirin", "ibuprofen", "naproxen"]);
}

#[test]
fn service_review_combines_both_checks() {
    let service = ClinicalDecisionService::new(
        Arc::new(InMemoryModelStore::default()),
        TrainingPolicy::Forbidden,
        SafetyCheckEngine::default(),
    );
    let request = SafetyCheckRequest {
        candidate: PrescriptionCandidate::new("Insulin Lispro"),
        allergies: Some("latex, insulin lispro".to_string()),
        prescriptions: vec![
            ActivePrescription::active("Alcohol prep pads"),
            ActivePrescription::inactive("Alcohol rub"),
        ],
    };

    let alerts = service.review_prescription(&request);

    assert_eq!(
        alerts.messages(),
        [
            "WARNING: Patient is allergic to insulin lispro!",
            "WARNING: Potential conflict with: Alcohol prep pads",
        ]
    );
}

#[tokio::test]
async fn safety_check_endpoint_reports_alert_payloads() {
    let service = Arc::new(ClinicalDecisionService::new(
        Arc::new(InMemoryModelStore::default()),
        TrainingPolicy::Forbidden,
        SafetyCheckEngine::default(),
    ));
    let router = clinical_router(service);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/prescriptions/safety-check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "candidate": { "medication_name": "Aspirin 325mg" },
                "allergies": "Penicillin, Aspirin",
                "prescriptions": [
                    { "medication_name": "Heparin 5000 units" },
                    { "medication_name": "Warfarin 5mg" }
                ]
            })
            .to_string(),
        ))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["allergy"]["has_alert"], true);
    assert_eq!(body["allergy"]["matches"], json!(["aspirin"]));
    assert_eq!(
        body["conflict"]["message"],
        "WARNING: Potential conflict with: Heparin 5000 units, Warfarin 5mg"
    );
}
