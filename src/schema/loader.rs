//! Model registry
//!
//! Holds the model metadata the compiler resolves attribute paths against.
//! Models are registered once and never replaced.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::errors::{ConfigError, ConfigResult};
use super::types::Model;

/// In-memory registry of models indexed by name
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from a list of models.
    pub fn from_models(models: impl IntoIterator<Item = Model>) -> ConfigResult<Self> {
        let mut registry = Self::new();
        for model in models {
            registry.register(model)?;
        }
        Ok(registry)
    }

    /// Loads a JSON array of models from disk.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Malformed {
            path: path.display().to_string(),
            reason: format!("Failed to read file: {}", e),
        })?;

        let models: Vec<Model> = serde_json::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: path.display().to_string(),
            reason: format!("Invalid JSON: {}", e),
        })?;

        Self::from_models(models)
    }

    /// Registers a model. A name can only be registered once.
    pub fn register(&mut self, model: Model) -> ConfigResult<()> {
        if self.models.contains_key(&model.name) {
            return Err(ConfigError::ModelImmutable(model.name));
        }
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Gets a model by name.
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Gets a model by name or fails with a configuration error.
    pub fn require(&self, name: &str) -> ConfigResult<&Model> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
