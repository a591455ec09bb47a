//! Chronic-condition risk scoring.
//!
//! A [`RiskScorer`] owns the current [`TrainedModel`] as an `Arc` that is swapped
//! whole on retraining, so concurrent scoring calls see either the old or the new
//! model and never a mix of the two.

pub mod dataset;
pub mod domain;
pub mod model;
pub mod recommendation;
pub mod store;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};

pub use dataset::TrainingSet;
pub use domain::{PatientFeatures, RiskAssessment, RiskTier, FEATURE_NAMES};
pub use model::{Normalization, TrainedModel, MODEL_VERSION};
pub use store::{InMemoryModelStore, JsonFileModelStore, ModelStore, ModelStoreError};

/// Whether a scorer may fit a model itself when none has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPolicy {
    Allowed,
    Forbidden,
}

impl From<bool> for TrainingPolicy {
    fn from(allow_training: bool) -> Self {
        if allow_training {
            TrainingPolicy::Allowed
        } else {
            TrainingPolicy::Forbidden
        }
    }
}

/// Error raised by the risk scorer.
#[derive(Debug, thiserror::Error)]
pub enum RiskModelError {
    #[error("no persisted risk model found")]
    NotFound,
    #[error("risk model unavailable: nothing persisted and training is disabled")]
    ModelNotAvailable,
    #[error("risk model persistence failed: {0}")]
    Persistence(#[from] ModelStoreError),
}

pub struct RiskScorer<S> {
    store: Arc<S>,
    policy: TrainingPolicy,
    current: RwLock<Option<Arc<TrainedModel>>>,
    // Serializes lazy initialization and explicit training; scoring skips it
    // once a model is installed.
    lifecycle: Mutex<()>,
}

impl<S> RiskScorer<S>
where
    S: ModelStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, TrainingPolicy::Allowed)
    }

    pub fn with_policy(store: Arc<S>, policy: TrainingPolicy) -> Self {
        Self {
            store,
            policy,
            current: RwLock::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> TrainingPolicy {
        self.policy
    }

    /// The model scoring calls currently use, if one has been trained or loaded.
    pub fn current_model(&self) -> Option<Arc<TrainedModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fits a fresh model on the synthetic cohort, installs it, then persists it.
    ///
    /// A persistence failure is returned as [`RiskModelError::Persistence`]; the
    /// new model is already installed by then and keeps serving predictions.
    pub fn train(&self) -> Result<Arc<TrainedModel>, RiskModelError> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let model = self.fit_and_install();
        self.store.save(&model)?;
        info!(version = %model.version, "risk model persisted");
        Ok(model)
    }

    /// Reconstitutes the persisted model and makes it current.
    pub fn load(&self) -> Result<Arc<TrainedModel>, RiskModelError> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_from_store()
    }

    pub fn predict(&self, features: &PatientFeatures) -> Result<RiskAssessment, RiskModelError> {
        let model = self.ensure_model()?;
        let assessment = model.assess(features);
        debug!(
            tier = assessment.risk_tier.code(),
            score = assessment.risk_score,
            "risk assessment computed"
        );
        Ok(assessment)
    }

    /// Fitted coefficient per feature name. Loads a persisted model if needed but
    /// never trains one.
    pub fn feature_importance(&self) -> Result<BTreeMap<String, f64>, RiskModelError> {
        if let Some(model) = self.current_model() {
            return Ok(model.feature_importance());
        }

        match self.load() {
            Ok(model) => Ok(model.feature_importance()),
            Err(RiskModelError::NotFound) => Err(RiskModelError::ModelNotAvailable),
            Err(err) => Err(err),
        }
    }

    fn ensure_model(&self) -> Result<Arc<TrainedModel>, RiskModelError> {
        if let Some(model) = self.current_model() {
            return Ok(model);
        }

        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(model) = self.current_model() {
            return Ok(model);
        }

        match self.load_from_store() {
            Ok(model) => return Ok(model),
            Err(RiskModelError::NotFound) => {}
            Err(err) => return Err(err),
        }

        if self.policy == TrainingPolicy::Forbidden {
            return Err(RiskModelError::ModelNotAvailable);
        }

        info!("no persisted risk model; training on first use");
        let model = self.fit_and_install();
        if let Err(err) = self.store.save(&model) {
            warn!(error = %err, "risk model trained but not persisted; continuing in memory");
        }
        Ok(model)
    }

    fn load_from_store(&self) -> Result<Arc<TrainedModel>, RiskModelError> {
        let model = self.store.load()?.ok_or(RiskModelError::NotFound)?;
        info!(version = %model.version, "risk model loaded");
        Ok(self.install(model))
    }

    fn fit_and_install(&self) -> Arc<TrainedModel> {
        let set = TrainingSet::synthetic();
        let model = TrainedModel::fit(&set);
        info!(
            samples = model.training_samples,
            iterations = model.iterations,
            accuracy = model.training_accuracy,
            "risk model trained"
        );
        self.install(model)
    }

    fn install(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let model = Arc::new(model);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Arc::clone(&model));
        model
    }
}
