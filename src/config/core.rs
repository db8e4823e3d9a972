//! Evaluator configuration structure, builder, and file/environment loading.

use crate::core::constants::*;
use crate::core::error::{MetricsError, Result};
use crate::core::types::{ClassIndex, LabelTable};
use crate::config_error;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration of an evaluator and its accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Metric name; also the name of the accumulated table
    pub name: String,
    /// Decision threshold, positive iff `prediction >= threshold`
    pub threshold: f64,
    /// Smoothing constant added to rate denominators
    pub epsilon: f64,
    /// Directory of the on-disk table store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    /// Class index to name mapping
    pub labels: LabelTable,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            name: DEFAULT_METRIC_NAME.to_string(),
            threshold: DEFAULT_THRESHOLD,
            epsilon: DEFAULT_EPSILON,
            store_dir: None,
            labels: LabelTable::binary(),
        }
    }
}

impl EvaluatorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(MetricsError::invalid_threshold(self.threshold));
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(MetricsError::invalid_parameter(
                "epsilon",
                self.epsilon.to_string(),
                "must be a positive finite number",
            ));
        }

        if self.name.trim().is_empty() {
            return Err(MetricsError::invalid_parameter(
                "name",
                self.name.clone(),
                "must not be empty",
            ));
        }

        if self.labels.is_empty() {
            return Err(MetricsError::invalid_parameter(
                "labels",
                "{}",
                "at least one class must be declared",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error!("Failed to read config file: {}", e))?;

        let config: Self = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| MetricsError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| MetricsError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(MetricsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| MetricsError::config(format!("Failed to serialize to JSON: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| MetricsError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(MetricsError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| config_error!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Default configuration with environment overrides applied
    pub fn load_from_environment() -> Result<Self> {
        let mut config = Self::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Override fields from `CONFMETRICS_*` environment variables
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        let var = |key: &str| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok();

        if let Some(val) = var("THRESHOLD") {
            self.threshold = val
                .parse()
                .map_err(|_| MetricsError::config("Invalid CONFMETRICS_THRESHOLD"))?;
        }

        if let Some(val) = var("EPSILON") {
            self.epsilon = val
                .parse()
                .map_err(|_| MetricsError::config("Invalid CONFMETRICS_EPSILON"))?;
        }

        if let Some(val) = var("NAME") {
            self.name = val;
        }

        if let Some(val) = var("STORE_DIR") {
            self.store_dir = Some(PathBuf::from(val));
        }

        self.validate()
    }

    /// Build a configuration from string parameters; unknown keys are ignored
    pub fn from_parameters(params: &HashMap<String, String>) -> Result<Self> {
        let mut builder = EvaluatorConfigBuilder::new();

        for (key, value) in params {
            let parse_f64 = |v: &str| {
                v.parse::<f64>().map_err(|_| {
                    MetricsError::invalid_parameter(key.as_str(), v, "not a number")
                })
            };
            builder = match key.as_str() {
                "name" => builder.name(value.as_str()),
                "threshold" => builder.threshold(parse_f64(value)?),
                "epsilon" => builder.epsilon(parse_f64(value)?),
                "store_dir" => builder.store_dir(value.as_str()),
                _ => {
                    log::warn!("Unknown configuration parameter: {}", key);
                    builder
                }
            };
        }

        builder.build()
    }

    /// Get configuration as a parameter map (for logging)
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("name".to_string(), self.name.clone());
        map.insert("threshold".to_string(), self.threshold.to_string());
        map.insert("epsilon".to_string(), self.epsilon.to_string());
        map.insert("labels".to_string(), self.labels.to_string());
        if let Some(ref dir) = self.store_dir {
            map.insert("store_dir".to_string(), dir.display().to_string());
        }
        map
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct EvaluatorConfigBuilder {
    config: EvaluatorConfig,
    custom_labels: bool,
    validation_errors: Vec<String>,
}

impl EvaluatorConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        EvaluatorConfigBuilder {
            config: EvaluatorConfig::default(),
            custom_labels: false,
            validation_errors: Vec::new(),
        }
    }

    /// Set the metric name
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the decision threshold
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the smoothing constant
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        if !(epsilon > 0.0) {
            self.validation_errors
                .push("epsilon must be positive".to_string());
        }
        self.config.epsilon = epsilon;
        self
    }

    /// Replace the whole label table
    pub fn labels(mut self, labels: LabelTable) -> Self {
        self.config.labels = labels;
        self.custom_labels = true;
        self
    }

    /// Declare one class; the first call discards the default binary table
    pub fn label<S: Into<String>>(mut self, class_idx: ClassIndex, name: S) -> Self {
        if !self.custom_labels {
            self.config.labels = LabelTable::new();
            self.custom_labels = true;
        }
        self.config.labels.insert(class_idx, name);
        self
    }

    /// Set the table store directory
    pub fn store_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.store_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EvaluatorConfig> {
        if !self.validation_errors.is_empty() {
            return Err(MetricsError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for EvaluatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.name, "f1");
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.epsilon, 1e-5);
        assert_eq!(config.labels, LabelTable::binary());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EvaluatorConfigBuilder::new()
            .name("seg")
            .threshold(1.0)
            .label(0, "background")
            .label(1, "road")
            .label(2, "car")
            .build()
            .unwrap();
        assert_eq!(config.name, "seg");
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.labels.len(), 3);
        assert_eq!(config.labels.get(2), Some("car"));
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        let err = EvaluatorConfigBuilder::new()
            .threshold(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetricsError::InvalidThreshold { .. }));

        let err = EvaluatorConfigBuilder::new().epsilon(-1.0).build().unwrap_err();
        assert_eq!(err.category(), "config");

        let err = EvaluatorConfigBuilder::new()
            .labels(LabelTable::new())
            .build()
            .unwrap_err();
        assert_eq!(err.category(), "invalid_parameter");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = EvaluatorConfigBuilder::new()
            .threshold(0.25)
            .label(0, "no")
            .label(1, "yes")
            .store_dir("/tmp/store")
            .build()
            .unwrap();

        for file in ["config.json", "config.toml"] {
            let path = dir.path().join(file);
            config.save_to_file(&path).unwrap();
            let loaded = EvaluatorConfig::load_from_file(&path).unwrap();
            assert_eq!(loaded, config);
        }

        let bad = dir.path().join("config.yaml");
        assert!(config.save_to_file(&bad).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EvaluatorConfig = toml::from_str("threshold = 2.0\n").unwrap();
        assert_eq!(config.threshold, 2.0);
        assert_eq!(config.name, DEFAULT_METRIC_NAME);
        assert_eq!(config.labels, LabelTable::binary());
    }

    #[test]
    fn test_from_parameters() {
        let mut params = HashMap::new();
        params.insert("threshold".to_string(), "0.75".to_string());
        params.insert("name".to_string(), "f1_val".to_string());
        params.insert("unknown".to_string(), "ignored".to_string());
        let config = EvaluatorConfig::from_parameters(&params).unwrap();
        assert_eq!(config.threshold, 0.75);
        assert_eq!(config.name, "f1_val");

        params.insert("epsilon".to_string(), "abc".to_string());
        assert!(EvaluatorConfig::from_parameters(&params).is_err());
    }
}
