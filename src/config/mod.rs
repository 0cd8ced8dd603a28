//! Configuration module for the bounds estimator

mod template;

use crate::calibration::{CalibrationTable, ConfidenceLevel};
use crate::sources::{CRYPTOPANIC_API_BASE, DEXSCREENER_API_BASE};
use crate::utils::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub use template::{generate_commented_config_template, generate_config_template};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration file version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Directory holding `<symbol>.csv` price histories
    pub data_dir: String,
}

/// Bounds engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Confidence level used when a request does not name one
    pub default_confidence: f64,
    /// History points requested per asset
    pub history_points: usize,
}

/// External data sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Deadline for each collaborator call, in seconds
    pub request_timeout_secs: u64,
    pub dexscreener_base_url: String,
    pub cryptopanic_base_url: String,
    /// CryptoPanic developer API token
    pub cryptopanic_api_key: Option<String>,
}

/// Calibration table overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// TOML file with `[[assets]]` rows and an optional `[default]` row
    pub file: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            engine: EngineConfig::default(),
            sources: SourcesConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), data_dir: "data".to_string() }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { default_confidence: 0.80, history_points: 30 }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 5,
            dexscreener_base_url: DEXSCREENER_API_BASE.to_string(),
            cryptopanic_base_url: CRYPTOPANIC_API_BASE.to_string(),
            cryptopanic_api_key: None,
        }
    }
}

impl Config {
    /// Serialize default config to TOML string
    pub fn default_toml() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    /// Load configuration from a specific file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {:?}: {}", path.as_ref(), e))
        })?;
        let mut cfg: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;
        cfg.merge_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save the configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config file {:?}: {}", path, e)))?;
        Ok(())
    }

    /// Validate the configuration for required fields and reasonable values
    pub fn validate(&self) -> Result<()> {
        if self.app.log_level.trim().is_empty() {
            return Err(Error::ConfigError("app.log_level must be set".to_string()));
        }
        if self.engine.history_points == 0 {
            return Err(Error::ConfigError("engine.history_points must be > 0".to_string()));
        }
        if !(self.engine.default_confidence > 0.0 && self.engine.default_confidence < 1.0) {
            return Err(Error::ConfigError(format!(
                "engine.default_confidence must be within (0, 1), got {}",
                self.engine.default_confidence
            )));
        }
        if self.sources.request_timeout_secs == 0 {
            return Err(Error::ConfigError("sources.request_timeout_secs must be > 0".to_string()));
        }
        for (name, url) in [
            ("dexscreener_base_url", &self.sources.dexscreener_base_url),
            ("cryptopanic_base_url", &self.sources.cryptopanic_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigError(format!("sources.{} must be an http(s) URL, got '{}'", name, url)));
            }
        }
        Ok(())
    }

    /// Load configuration from default locations: `./config.toml`, then
    /// [`user_config_path`](Self::user_config_path), then defaults.
    pub fn load() -> Result<Self> {
        let mut candidates = vec![PathBuf::from("config.toml")];
        candidates.extend(Self::user_config_path());
        Self::load_first(&candidates)
    }

    /// Load the first existing file of `candidates`, or the defaults.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        if let Some(path) = candidates.iter().find(|p| p.exists()) {
            log::debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        let mut config = Self::default();
        config.merge_env()?;
        Ok(config)
    }

    /// `<config dir>/yieldsense/config.toml`, when the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yieldsense").join("config.toml"))
    }

    /// Merge environment variables into the configuration
    pub fn merge_env(&mut self) -> Result<()> {
        if let Ok(key) = env::var("CRYPTOPANIC_API_KEY") {
            if !key.trim().is_empty() {
                self.sources.cryptopanic_api_key = Some(key);
            }
        }

        if let Ok(dir) = env::var("YIELDSENSE_DATA_DIR") {
            self.app.data_dir = dir;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.request_timeout_secs)
    }

    pub fn default_confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_f64(self.engine.default_confidence)
    }

    /// Built-in calibration, with the configured override file applied.
    pub fn calibration_table(&self) -> Result<Arc<CalibrationTable>> {
        match &self.calibration.file {
            | Some(file) => Ok(Arc::new(CalibrationTable::from_file(file)?)),
            | None => Ok(CalibrationTable::shared()),
        }
    }
}
