use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use axum::response::Response;
use serde_json::Value;

use crate::clinical::risk::{
    InMemoryModelStore, ModelStore, ModelStoreError, PatientFeatures, TrainedModel, TrainingPolicy,
};
use crate::clinical::{ClinicalDecisionService, SafetyCheckEngine};

pub(super) fn features(
    age: u32,
    bmi: f64,
    systolic_bp: i32,
    diastolic_bp: i32,
    has_family_history: bool,
) -> PatientFeatures {
    PatientFeatures {
        age,
        bmi,
        systolic_bp,
        diastolic_bp,
        has_family_history,
    }
}

pub(super) fn extreme_patient() -> PatientFeatures {
    features(90, 45.0, 180, 120, true)
}

pub(super) fn healthy_patient() -> PatientFeatures {
    features(28, 21.0, 110, 70, false)
}

/// Store whose writes always fail, for exercising persistence errors.
pub(super) struct ReadOnlyDisk;

impl ModelStore for ReadOnlyDisk {
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError> {
        Ok(None)
    }

    fn save(&self, _model: &TrainedModel) -> Result<(), ModelStoreError> {
        Err(ModelStoreError::Unavailable("read-only filesystem".to_string()))
    }
}

/// Store that refuses to read, as if the backing volume were offline.
pub(super) struct OfflineStore;

impl ModelStore for OfflineStore {
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError> {
        Err(ModelStoreError::Unavailable("volume offline".to_string()))
    }

    fn save(&self, _model: &TrainedModel) -> Result<(), ModelStoreError> {
        Err(ModelStoreError::Unavailable("volume offline".to_string()))
    }
}

/// In-memory store that records which threads touched it.
#[derive(Default)]
pub(super) struct ThreadTrackingStore {
    inner: InMemoryModelStore,
    pub(super) threads: Mutex<Vec<ThreadId>>,
}

impl ThreadTrackingStore {
    fn record(&self) {
        self.threads
            .lock()
            .expect("thread log poisoned")
            .push(std::thread::current().id());
    }
}

impl ModelStore for ThreadTrackingStore {
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError> {
        self.record();
        self.inner.load()
    }

    fn save(&self, model: &TrainedModel) -> Result<(), ModelStoreError> {
        self.record();
        self.inner.save(model)
    }
}

pub(super) fn memory_service(
    policy: TrainingPolicy,
) -> (
    Arc<ClinicalDecisionService<InMemoryModelStore>>,
    Arc<InMemoryModelStore>,
) {
    let store = Arc::new(InMemoryModelStore::default());
    let service = Arc::new(ClinicalDecisionService::new(
        store.clone(),
        policy,
        SafetyCheckEngine::default(),
    ));
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
