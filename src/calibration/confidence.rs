//! Confidence levels and their z-score multipliers.

use serde::{Deserialize, Serialize};

/// Coverage probability of the predicted range.
///
/// Only the four tabulated levels exist; anything else resolves to the
/// default (80%) instead of failing.
/// Serialized as the plain probability (`0.8`). Numbers and numeric strings
/// are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawLevel", into = "f64")]
pub enum ConfidenceLevel {
    P68,
    #[default]
    P80,
    P90,
    P95,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Number(f64),
    Text(String),
}

impl From<RawLevel> for ConfidenceLevel {
    fn from(raw: RawLevel) -> Self {
        match raw {
            | RawLevel::Number(value) => Self::from_f64(value),
            | RawLevel::Text(text) => Self::from_f64(text.trim().parse().unwrap_or(f64::NAN)),
        }
    }
}

impl ConfidenceLevel {
    /// All levels in ascending order
    pub const ALL: [ConfidenceLevel; 4] =
        [ConfidenceLevel::P68, ConfidenceLevel::P80, ConfidenceLevel::P90, ConfidenceLevel::P95];

    const TOLERANCE: f64 = 1e-9;

    /// Resolve a raw probability, falling back to the default level.
    pub fn from_f64(value: f64) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|level| (level.as_f64() - value).abs() < Self::TOLERANCE)
            .unwrap_or_else(|| {
                log::debug!("confidence level {} not tabulated, using {}", value, Self::default().as_f64());
                Self::default()
            })
    }

    pub fn as_f64(self) -> f64 {
        match self {
            | ConfidenceLevel::P68 => 0.68,
            | ConfidenceLevel::P80 => 0.80,
            | ConfidenceLevel::P90 => 0.90,
            | ConfidenceLevel::P95 => 0.95,
        }
    }

    /// Two-sided normal quantile used to scale the uncertainty.
    pub fn z_score(self) -> f64 {
        match self {
            | ConfidenceLevel::P68 => 1.00,
            | ConfidenceLevel::P80 => 1.28,
            | ConfidenceLevel::P90 => 1.645,
            | ConfidenceLevel::P95 => 1.96,
        }
    }
}

impl From<f64> for ConfidenceLevel {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.as_f64()
    }
}
