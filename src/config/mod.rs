//! Configuration management for confmetrics.
//!
//! Configuration is resolved in layers: defaults, then an optional `.toml`
//! or `.json` file, then `CONFMETRICS_*` environment variables.

pub mod core;

pub use self::core::{EvaluatorConfig, EvaluatorConfigBuilder};

use crate::core::error::Result;
use std::path::Path;

/// Configuration file looked up when none is given explicitly
pub const DEFAULT_CONFIG_FILE: &str = "confmetrics.toml";

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default configuration values
    Default,
    /// Configuration from file
    File(String),
}

/// Resolve the configuration from an optional file plus environment overrides.
///
/// Without an explicit path, [`DEFAULT_CONFIG_FILE`] is used when it exists
/// in the working directory.
pub fn resolve_config(path: Option<&Path>) -> Result<(EvaluatorConfig, ConfigSource)> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let file = match path {
        Some(p) => Some(p),
        None if default_path.exists() => Some(default_path),
        None => None,
    };

    let (mut config, source) = match file {
        Some(p) => (
            EvaluatorConfig::load_from_file(p)?,
            ConfigSource::File(p.display().to_string()),
        ),
        None => (EvaluatorConfig::default(), ConfigSource::Default),
    };

    config.apply_environment_overrides()?;
    log::info!("Configuration resolved from {:?}", source);
    log::debug!("Configuration parameters: {:?}", config.as_parameter_map());
    Ok((config, source))
}
