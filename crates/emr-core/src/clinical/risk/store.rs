use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::model::TrainedModel;

/// Durable home for the fitted model so scoring survives restarts.
pub trait ModelStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError>;
    fn save(&self, model: &TrainedModel) -> Result<(), ModelStoreError>;
}

/// Error enumeration for model persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum ModelStoreError {
    #[error("model storage i/o failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("persisted model at {path} is unreadable: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model storage unavailable: {0}")]
    Unavailable(String),
}

/// Stores the model as a single JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileModelStore {
    path: PathBuf,
}

impl JsonFileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ModelStoreError {
        ModelStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ModelStore for JsonFileModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| ModelStoreError::Encoding {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, model: &TrainedModel) -> Result<(), ModelStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let encoded =
            serde_json::to_vec_pretty(model).map_err(|source| ModelStoreError::Encoding {
                path: self.path.clone(),
                source,
            })?;

        // Write beside the target then rename so readers never see a partial file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))
    }
}

/// Process-local store for tests and read-only deployments.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    model: Mutex<Option<TrainedModel>>,
}

impl InMemoryModelStore {
    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            model: Mutex::new(Some(model)),
        }
    }
}

impl ModelStore for InMemoryModelStore {
    fn load(&self) -> Result<Option<TrainedModel>, ModelStoreError> {
        let guard = self
            .model
            .lock()
            .map_err(|_| ModelStoreError::Unavailable("model store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, model: &TrainedModel) -> Result<(), ModelStoreError> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| ModelStoreError::Unavailable("model store mutex poisoned".to_string()))?;
        *guard = Some(model.clone());
        Ok(())
    }
}
