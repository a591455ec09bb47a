use super::common::*;
use std::collections::HashSet;
use std::sync::Arc;

use crate::clinical::risk::{
    InMemoryModelStore, JsonFileModelStore, ModelStore, RiskAssessment, RiskModelError,
    RiskScorer, RiskTier, TrainedModel, TrainingPolicy, TrainingSet,
};

#[test]
fn extreme_measurements_score_high() {
    let scorer = RiskScorer::new(Arc::new(InMemoryModelStore::default()));

    let assessment = scorer.predict(&extreme_patient()).expect("prediction");

    assert_eq!(assessment.risk_tier, RiskTier::High);
    assert!(assessment.risk_score >= 0.7);
    assert!(assessment.risk_score <= 1.0);
    assert_eq!(assessment.model_version, "1.0");
}

#[test]
fn healthy_measurements_score_low() {
    let scorer = RiskScorer::new(Arc::new(InMemoryModelStore::default()));

    let assessment = scorer.predict(&healthy_patient()).expect("prediction");

    assert_eq!(assessment.risk_tier, RiskTier::Low);
    assert!(assessment.recommendation_text.starts_with("LOW RISK"));
}

#[test]
fn first_prediction_trains_once_and_persists() {
    let store = Arc::new(InMemoryModelStore::default());
    let scorer = RiskScorer::new(store.clone());
    assert!(scorer.current_model().is_none());

    scorer.predict(&healthy_patient()).expect("prediction");
    let first = scorer.current_model().expect("model installed");
    scorer.predict(&extreme_patient()).expect("prediction");
    let second = scorer.current_model().expect("model installed");

    assert!(Arc::ptr_eq(&first, &second), "second call retrained");
    assert_eq!(store.load().expect("load"), Some((*first).clone()));
}

#[test]
fn persisted_model_is_preferred_over_training() {
    let mut persisted = TrainedModel::fit(&TrainingSet::synthetic());
    persisted.version = "persisted".to_string();
    let scorer = RiskScorer::with_policy(
        Arc::new(InMemoryModelStore::with_model(persisted)),
        TrainingPolicy::Forbidden,
    );

    let assessment = scorer.predict(&healthy_patient()).expect("prediction");

    assert_eq!(assessment.model_version, "persisted");
}

#[test]
fn read_only_scorer_without_model_is_unavailable() {
    let scorer = RiskScorer::with_policy(
        Arc::new(InMemoryModelStore::default()),
        TrainingPolicy::Forbidden,
    );

    match scorer.predict(&healthy_patient()) {
        Err(RiskModelError::ModelNotAvailable) => {}
        other => panic!("expected model unavailable, got {other:?}"),
    }
}

#[test]
fn explicit_load_reports_missing_model() {
    let scorer = RiskScorer::new(Arc::new(InMemoryModelStore::default()));
    assert!(matches!(scorer.load(), Err(RiskModelError::NotFound)));
}

#[test]
fn feature_importance_never_trains() {
    let store = Arc::new(InMemoryModelStore::default());
    let scorer = RiskScorer::new(store.clone());

    assert!(matches!(
        scorer.feature_importance(),
        Err(RiskModelError::ModelNotAvailable)
    ));
    assert!(store.load().expect("load").is_none());

    scorer.train().expect("training");
    let importance = scorer.feature_importance().expect("importance");
    let names: Vec<&str> = importance.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        ["Age", "BMI", "BP Diastolic", "BP Systolic", "Family History"]
    );
}

#[test]
fn training_is_deterministic_across_scorers() {
    let first = RiskScorer::new(Arc::new(InMemoryModelStore::default()))
        .train()
        .expect("training");
    let second = RiskScorer::new(Arc::new(InMemoryModelStore::default()))
        .train()
        .expect("training");

    assert_eq!(first.coefficients, second.coefficients);
    assert_eq!(first.intercept.to_bits(), second.intercept.to_bits());
    assert_eq!(first.normalization, second.normalization);
}

#[test]
fn reloaded_model_reproduces_predictions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("risk_model.json");
    let trainer = RiskScorer::new(Arc::new(JsonFileModelStore::new(&path)));
    trainer.train().expect("training");

    let reader = RiskScorer::with_policy(
        Arc::new(JsonFileModelStore::new(&path)),
        TrainingPolicy::Forbidden,
    );

    for patient in [
        healthy_patient(),
        extreme_patient(),
        features(52, 27.4, 131, 84, true),
        features(47, 25.0, 125, 82, false),
    ] {
        assert_eq!(
            trainer.predict(&patient).expect("trainer prediction"),
            reader.predict(&patient).expect("reader prediction"),
        );
    }
}

#[test]
fn failed_persistence_is_surfaced_but_model_stays_active() {
    let scorer = RiskScorer::new(Arc::new(ReadOnlyDisk));

    match scorer.train() {
        Err(RiskModelError::Persistence(_)) => {}
        other => panic!("expected persistence failure, got {other:?}"),
    }

    assert!(scorer.current_model().is_some());
    assert!(scorer.predict(&extreme_patient()).is_ok());
}

#[test]
fn lazy_training_continues_in_memory_when_save_fails() {
    let scorer = RiskScorer::new(Arc::new(ReadOnlyDisk));

    let assessment = scorer.predict(&extreme_patient()).expect("prediction");

    assert_eq!(assessment.risk_tier, RiskTier::High);
}

#[test]
fn unreadable_store_is_not_papered_over() {
    let scorer = RiskScorer::new(Arc::new(OfflineStore));

    assert!(matches!(
        scorer.predict(&healthy_patient()),
        Err(RiskModelError::Persistence(_))
    ));
    assert!(scorer.current_model().is_none());
}

#[test]
fn retraining_replaces_model_without_touching_old_handle() {
    let scorer = RiskScorer::new(Arc::new(InMemoryModelStore::default()));
    let old = scorer.train().expect("first training");
    let snapshot = (*old).clone();

    let new = scorer.train().expect("second training");

    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(*old, snapshot);
    assert!(Arc::ptr_eq(&new, &scorer.current_model().expect("installed")));
}

#[test]
fn concurrent_scoring_during_retrain_sees_whole_models() {
    let scorer = RiskScorer::new(Arc::new(InMemoryModelStore::default()));
    let expected = scorer.predict(&extreme_patient()).expect("baseline");

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .map(|_| scorer.predict(&extreme_patient()).expect("prediction"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        scope.spawn(|| {
            for _ in 0..3 {
                scorer.train().expect("retraining");
            }
        });

        for reader in readers {
            for assessment in reader.join().expect("reader thread") {
                assert_eq!(assessment, expected);
            }
        }
    });
}

#[test]
fn recommendation_text_differs_across_tier_boundaries() {
    let texts: HashSet<String> = [0.39, 0.4, 0.69, 0.7]
        .into_iter()
        .map(|probability| RiskAssessment::from_probability(probability, "1.0"))
        .map(|assessment| {
            assert!(!assessment.recommendation_text.is_empty());
            assert_eq!(
                assessment.recommendation_text,
                assessment.risk_tier.recommendation()
            );
            assessment.recommendation_text
        })
        .collect();

    assert_eq!(texts.len(), 3);
}
