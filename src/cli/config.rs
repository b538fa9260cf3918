//! Filter configuration file
//!
//! ```json
//! {
//!   "model": "book",
//!   "models": [{"name": "book", "fields": [{"name": "id", "type": "integer"}]}],
//!   "filters": ["id"],
//!   "select": true,
//!   "max_limit": 100
//! }
//! ```
//!
//! Models are given inline (`models`) or in a separate file
//! (`models_file`, relative to the configuration file).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::filter::FilterClass;
use crate::observability::{Event, Logger};
use crate::schema::{FilterDecl, Model, ModelRegistry, SchemaCompiler};

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Root model the filters apply to
    pub model: String,

    #[serde(default)]
    pub models: Vec<Model>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models_file: Option<PathBuf>,

    pub filters: Vec<FilterDecl>,

    /// Attribute paths searched in addition to `search` filters
    #[serde(default)]
    pub extended_search: Vec<String>,

    /// Deduplicate every query
    #[serde(default)]
    pub distinct: bool,

    /// Enable `select(...)`
    #[serde(default)]
    pub select: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_limit: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u64>,
}

impl FilterConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: FilterConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        if let Some(models_file) = &config.models_file {
            let resolved = match path.parent() {
                Some(dir) if models_file.is_relative() => dir.join(models_file),
                _ => models_file.clone(),
            };
            config.models_file = Some(resolved);
        }

        config.validate()?;

        let path_str = path.display().to_string();
        Logger::log(
            Event::ConfigLoaded,
            &[("path", path_str.as_str()), ("model", config.model.as_str())],
        );
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.model.trim().is_empty() {
            return Err(CliError::config_error("model must not be empty"));
        }
        if self.models.is_empty() && self.models_file.is_none() {
            return Err(CliError::config_error(
                "either models or models_file must be given",
            ));
        }
        if !self.models.is_empty() && self.models_file.is_some() {
            return Err(CliError::config_error(
                "models and models_file are mutually exclusive",
            ));
        }
        if self.max_limit == Some(0) {
            return Err(CliError::config_error("max_limit must be > 0"));
        }
        if let (Some(default), Some(max)) = (self.default_limit, self.max_limit) {
            if default > max {
                return Err(CliError::config_error(format!(
                    "default_limit {} exceeds max_limit {}",
                    default, max
                )));
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> CliResult<ModelRegistry> {
        let registry = match &self.models_file {
            Some(path) => ModelRegistry::load_file(path)?,
            None => ModelRegistry::from_models(self.models.clone())?,
        };
        Ok(registry)
    }

    /// Compiles the schema and wraps it in a filter class.
    pub fn build_filter_class(&self) -> CliResult<FilterClass> {
        let registry = self.registry()?;
        let schema = SchemaCompiler::new(&registry, self.model.as_str())
            .extended_search(self.extended_search.iter().cloned())
            .distinct(self.distinct)
            .compile(&self.filters)?;

        Ok(FilterClass::new(schema)
            .with_select(self.select)
            .with_limits(self.max_limit, self.default_limit))
    }
}
