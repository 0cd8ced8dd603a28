//! Per-asset calibration table.
//!
//! One immutable table holds every asset-specific constant the engine uses:
//! how far sentiment may move the predicted price, how raw weekly volatility
//! maps onto the historically observed range, and the hard cap on that range.
//! Unknown symbols resolve to the default row. The built-in table is built
//! once per process; a TOML file may override or extend it.

mod confidence;

pub use confidence::ConfidenceLevel;

use crate::utils::error::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

static BUILTIN: Lazy<Arc<CalibrationTable>> = Lazy::new(|| Arc::new(CalibrationTable::builtin()));

/// Asset-specific constants consumed by the bounds engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetCalibration {
    /// Maximum fractional price move attributable to sentiment
    pub sentiment_impact_cap: f64,
    /// Factor scaling raw weekly volatility to the observed weekly range
    pub range_multiplier: f64,
    /// Hard cap on the distance of either bound from the current price
    pub max_range_fraction: f64,
}

impl AssetCalibration {
    pub const fn new(sentiment_impact_cap: f64, range_multiplier: f64, max_range_fraction: f64) -> Self {
        Self { sentiment_impact_cap, range_multiplier, max_range_fraction }
    }

    /// Reject values that would break the bound invariants.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sentiment_impact_cap) {
            return Err(Error::ConfigError(format!(
                "sentiment_impact_cap must be within [0, 1], got {}",
                self.sentiment_impact_cap
            )));
        }
        if !self.range_multiplier.is_finite() || self.range_multiplier <= 0.0 {
            return Err(Error::ConfigError(format!(
                "range_multiplier must be positive, got {}",
                self.range_multiplier
            )));
        }
        if !(self.max_range_fraction > 0.0 && self.max_range_fraction <= 1.0) {
            return Err(Error::ConfigError(format!(
                "max_range_fraction must be within (0, 1], got {}",
                self.max_range_fraction
            )));
        }
        Ok(())
    }
}

impl Default for AssetCalibration {
    fn default() -> Self {
        Self::new(0.02, 0.50, 0.15)
    }
}

/// A row of the calibration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetProfile {
    /// Lower-case asset symbol
    #[serde(default)]
    pub symbol: String,
    #[serde(flatten)]
    pub calibration: AssetCalibration,
    /// Pegged assets use a fixed daily volatility
    #[serde(default)]
    pub stablecoin: bool,
    /// Lowest safety score the asset can report
    #[serde(default)]
    pub min_safety_score: f64,
    /// Solana mint address used for price lookups
    #[serde(default)]
    pub mint: Option<String>,
    /// Currency code or slug used for news lookups
    #[serde(default)]
    pub news_currency: Option<String>,
}

impl AssetProfile {
    fn new(symbol: &str, calibration: AssetCalibration) -> Self {
        Self {
            symbol: symbol.to_string(),
            calibration,
            stablecoin: false,
            min_safety_score: 0.0,
            mint: None,
            news_currency: None,
        }
    }

    fn stablecoin(mut self) -> Self {
        self.stablecoin = true;
        self.min_safety_score = 90.0;
        self
    }

    fn mint(mut self, mint: &str) -> Self {
        self.mint = Some(mint.to_string());
        self
    }

    fn news(mut self, currency: &str) -> Self {
        self.news_currency = Some(currency.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.calibration
            .validate()
            .map_err(|e| Error::ConfigError(format!("asset '{}': {}", self.symbol, e)))?;
        if !(0.0..=100.0).contains(&self.min_safety_score) {
            return Err(Error::ConfigError(format!(
                "asset '{}': min_safety_score must be within [0, 100], got {}",
                self.symbol, self.min_safety_score
            )));
        }
        Ok(())
    }

    /// Symbol used when querying news providers
    pub fn news_query(&self) -> String {
        self.news_currency.clone().unwrap_or_else(|| self.symbol.to_uppercase())
    }
}

/// On-disk layout of a calibration override file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationFile {
    #[serde(default)]
    pub default: Option<AssetProfile>,
    #[serde(default)]
    pub assets: Vec<AssetProfile>,
}

/// Immutable symbol → calibration lookup with a default row.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    assets: BTreeMap<String, AssetProfile>,
    default: AssetProfile,
}

impl CalibrationTable {
    /// The calibrated rows for the supported Solana assets.
    pub fn builtin() -> Self {
        let rows = vec![
            AssetProfile::new("sol", AssetCalibration::new(0.02, 0.50, 0.10))
                .mint("So11111111111111111111111111111111111111112")
                .news("SOL"),
            AssetProfile::new("jup", AssetCalibration::new(0.02, 0.50, 0.12))
                .mint("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN")
                .news("JUP"),
            AssetProfile::new("usdc", AssetCalibration::new(0.005, 1.0, 0.005))
                .stablecoin()
                .mint("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
                .news("USDC"),
            AssetProfile::new("usdt", AssetCalibration::new(0.005, 1.0, 0.005))
                .stablecoin()
                .mint("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB")
                .news("USDT"),
            AssetProfile::new("jupsol", AssetCalibration::new(0.02, 0.48, 0.10))
                .mint("jupSoLaHXQiZZTSfEWMTRRgpnyFm8f6sZdosWBjx93v")
                .news("jupiter-staked-sol"),
            AssetProfile::new("pengu", AssetCalibration::new(0.03, 0.35, 0.15))
                .mint("2zMMhcVQEXDtdE6vsFS7S7D5oUodfJHE8vd1gnBouauv")
                .news("pudgy-penguins"),
        ];

        Self {
            assets: rows.into_iter().map(|p| (p.symbol.clone(), p)).collect(),
            default: AssetProfile::new("default", AssetCalibration::default()),
        }
    }

    /// Process-wide built-in table, constructed on first use.
    pub fn shared() -> Arc<CalibrationTable> {
        Arc::clone(&BUILTIN)
    }

    /// Built-in table with the rows of `file` layered on top.
    pub fn with_overrides(file: CalibrationFile) -> Result<Self> {
        let mut table = Self::builtin();
        if let Some(mut default) = file.default {
            default.symbol = "default".to_string();
            default.validate()?;
            table.default = default;
        }
        for mut row in file.assets {
            row.symbol = normalize_symbol(&row.symbol);
            if row.symbol.is_empty() {
                return Err(Error::ConfigError("calibration row without symbol".into()));
            }
            row.validate()?;
            table.assets.insert(row.symbol.clone(), row);
        }
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CalibrationFile = toml::from_str(content)?;
        Self::with_overrides(file)
    }

    /// Load an override file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Row for `symbol`, or the default row for unknown assets.
    pub fn profile(&self, symbol: &str) -> &AssetProfile {
        let key = normalize_symbol(symbol);
        match self.assets.get(&key) {
            | Some(profile) => profile,
            | None => {
                log::debug!("no calibration for '{}', using default row", key);
                &self.default
            }
        }
    }

    pub fn calibration(&self, symbol: &str) -> &AssetCalibration {
        &self.profile(symbol).calibration
    }

    pub fn is_known(&self, symbol: &str) -> bool {
        self.assets.contains_key(&normalize_symbol(symbol))
    }

    pub fn is_stablecoin(&self, symbol: &str) -> bool {
        self.profile(symbol).stablecoin
    }

    /// Calibrated symbols in alphabetical order
    pub fn symbols(&self) -> Vec<&str> {
        self.assets.keys().map(String::as_str).collect()
    }

    pub fn default_profile(&self) -> &AssetProfile {
        &self.default
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Canonical lookup key for a symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}
