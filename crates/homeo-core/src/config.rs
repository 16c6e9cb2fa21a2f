//! Configuration loading: TOML file with environment variable overrides.
//!
//! Every field has a default, so the file is optional. `HOMEO_*` environment
//! variables take precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::MedicineInput;
use crate::validation::{to_form_data, validate_form, FieldErrors};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "homeo.toml";

/// Top-level configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Pass free-text queries through the query interpreter when one is set.
    pub use_interpreter: bool,
    /// Maximum autocomplete suggestions.
    pub suggestion_limit: usize,
}

/// Store configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON array of medicines loaded at startup.
    pub seed_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_interpreter: true,
            suggestion_limit: 8,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file")]
    Seed(#[from] serde_json::Error),

    #[error("seed entry {index} is invalid: {errors:?}")]
    InvalidSeed { index: usize, errors: FieldErrors },

    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    /// Load from `path` (or [`DEFAULT_CONFIG_FILE`]) then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("HOMEO_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("HOMEO_SEARCH_USE_INTERPRETER") {
            if let Ok(enabled) = val.parse() {
                self.search.use_interpreter = enabled;
            }
        }
        if let Some(val) = lookup("HOMEO_SEARCH_SUGGESTION_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.search.suggestion_limit = limit;
            }
        }
        if let Some(val) = lookup("HOMEO_SEED_FILE") {
            self.store.seed_file = Some(PathBuf::from(val));
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.suggestion_limit == 0 {
            return Err(ConfigError::Validation(
                "search.suggestion_limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Read and validate the seed file. No seed file means no records.
    ///
    /// Seed entries go through the same rules as form submissions.
    pub fn load_seed(&self) -> Result<Vec<MedicineInput>, ConfigError> {
        let Some(path) = &self.seed_file else {
            return Ok(Vec::new());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let inputs: Vec<MedicineInput> = serde_json::from_str(&content)?;

        inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                validate_form(&to_form_data(&input))
                    .map(|_| input)
                    .map_err(|errors| ConfigError::InvalidSeed { index, errors })
            })
            .collect()
    }
}
