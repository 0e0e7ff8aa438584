//! Runtime configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) is valid.
//!
//! ```toml
//! [collector]
//! interval_seconds = 1.0
//! response_timeout_seconds = 0.5
//!
//! [demo]
//! publishers = ["cpu", "disk"]
//! rounds = 5
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::kernel::telemetry::CollectorConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collector: CollectorConfig,
    pub demo: DemoConfig,
}

/// Publishers started by the bundled binary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Service names; each gets its own provider.
    pub publishers: Vec<String>,
    /// Rounds to flush before shutting down. `0` runs until interrupted.
    pub rounds: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            publishers: vec!["cpu".to_string(), "memory".to_string()],
            rounds: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Intervals below the collector floor are clamped at runtime, not rejected here.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let interval = config.collector.interval_seconds;
    if !interval.is_finite() || interval <= 0.0 {
        errors.push(format!(
            "collector.interval_seconds must be positive, got {interval}"
        ));
    }
    if let Some(timeout) = config.collector.response_timeout_seconds {
        if !timeout.is_finite() || timeout < 0.0 {
            errors.push(format!(
                "collector.response_timeout_seconds must be non-negative, got {timeout}"
            ));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for name in &config.demo.publishers {
        if name.trim().is_empty() {
            errors.push("demo.publishers entries must not be empty".to_string());
        } else if !seen.insert(name.as_str()) {
            errors.push(format!("demo.publishers lists `{name}` twice"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
