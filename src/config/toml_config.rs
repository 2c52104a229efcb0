use crate::core::ConfigProvider;
use crate::domain::model::is_known_region;
use crate::utils::error::{FarmError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    /// Write a ZIP bundle in addition to the CSV.
    #[serde(default)]
    pub bundle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Fixed seed for the weather draw; unset means a fresh draw every run.
    pub seed: Option<u64>,
    #[serde(default = "default_region")]
    pub default_region: String,
    /// First planting date; defaults to today.
    pub plan_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub json: bool,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_region() -> String {
    "Midwest".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            bundle: false,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_region: default_region(),
            plan_start: None,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl FarmConfig {
    /// Loads and parses a TOML file; `${VAR}` references are expanded first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FarmError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FarmError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FarmError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("output.path", &self.output.path)?;
        validate_non_empty_string("prediction.default_region", &self.prediction.default_region)?;

        if !is_known_region(&self.prediction.default_region) {
            tracing::warn!(
                "Region '{}' is not a known region; a neutral factor of 1.0 will be used",
                self.prediction.default_region
            );
        }

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(FarmError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for FarmConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn seed(&self) -> Option<u64> {
        self.prediction.seed
    }

    fn default_region(&self) -> &str {
        &self.prediction.default_region
    }
}

impl Validate for FarmConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
