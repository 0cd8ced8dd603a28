//! Common types used throughout the bounds estimator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of an asset's price history.
///
/// `tvl_change_7d` and `apy_cv` are optional pool metrics; absent values read
/// as zero wherever they feed a computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Seven-day TVL change of the pool, in percent
    #[serde(default)]
    pub tvl_change_7d: Option<f64>,
    /// Coefficient of variation of the pool APY, in percent
    #[serde(default)]
    pub apy_cv: Option<f64>,
}

impl PricePoint {
    /// Create a price-only point
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price, tvl_change_7d: None, apy_cv: None }
    }

    pub fn with_tvl_change(mut self, tvl_change_7d: f64) -> Self {
        self.tvl_change_7d = Some(tvl_change_7d);
        self
    }

    pub fn with_apy_cv(mut self, apy_cv: f64) -> Self {
        self.apy_cv = Some(apy_cv);
        self
    }

    pub fn tvl_change_or_zero(&self) -> f64 {
        self.tvl_change_7d.unwrap_or(0.0)
    }

    pub fn apy_cv_or_zero(&self) -> f64 {
        self.apy_cv.unwrap_or(0.0)
    }
}

/// Chronologically ascending price history. May be empty.
pub type PriceSeries = Vec<PricePoint>;

/// A news headline as received from a news source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub text: String,
    /// Raw publication timestamp; expected to be RFC 3339
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Headline {
    pub fn new(text: impl Into<String>, published_at: Option<String>) -> Self {
        Self { text: text.into(), published_at }
    }

    /// Headline stamped with an already-parsed timestamp
    pub fn at(text: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self::new(text, Some(published_at.to_rfc3339()))
    }

    /// Parsed publication time, `None` when missing or not RFC 3339.
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
    }
}

/// Live quote returned by a price source. A price of 0 means unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub change_24h_pct: f64,
}

impl PriceQuote {
    pub fn new(price: f64, change_24h_pct: f64) -> Self {
        Self { price, change_24h_pct }
    }

    pub fn unresolved() -> Self {
        Self { price: 0.0, change_24h_pct: 0.0 }
    }

    pub fn is_resolved(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

impl Default for PriceQuote {
    fn default() -> Self {
        Self::unresolved()
    }
}
