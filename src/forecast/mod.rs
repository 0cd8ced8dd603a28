//! Forecast signal: adapter around an external price-forecast model.
//!
//! The model is a black box behind the [`Forecaster`] trait. It sees a
//! 30-step window of (return, tvl change, apy variation) features and returns
//! an expected return and a downside probability. Whenever the model is
//! missing, the history is too short, or the call fails, the adapter answers
//! with the neutral signal instead.

mod drift;

pub use drift::{DriftForecaster, NullForecaster};

use crate::utils::stats::sample_std_dev;
use crate::utils::types::PricePoint;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of time steps the model consumes
pub const WINDOW_LEN: usize = 30;
/// Features per time step: price return, tvl change / 100, apy cv / 100
pub const FEATURE_COUNT: usize = 3;

/// Model input, oldest step first.
pub type FeatureWindow = [[f64; FEATURE_COUNT]; WINDOW_LEN];

/// Raw model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub expected_return: f64,
    pub downside_probability: f64,
}

impl ModelOutput {
    pub fn new(expected_return: f64, downside_probability: f64) -> Self {
        Self { expected_return, downside_probability }
    }
}

/// Forecast consumed by the bounds engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSignal {
    /// Expected 7-day return as a signed fraction
    pub expected_return: f64,
    /// Non-negative volatility fraction
    pub volatility: f64,
    pub downside_probability: f64,
    /// Set when the neutral fallback stood in for the model
    pub low_confidence: bool,
}

impl ForecastSignal {
    pub const NEUTRAL_VOLATILITY: f64 = 0.05;

    pub fn neutral() -> Self {
        Self {
            expected_return: 0.0,
            volatility: Self::NEUTRAL_VOLATILITY,
            downside_probability: 0.5,
            low_confidence: true,
        }
    }
}

impl Default for ForecastSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A price-forecast model.
///
/// Implementations must be safe to call from several requests at once.
#[cfg_attr(test, mockall::automock)]
pub trait Forecaster: Send + Sync {
    /// Predict from a feature window. `Ok(None)` means no model exists for
    /// `symbol`, which is an expected state rather than an error.
    fn predict(&self, symbol: &str, window: &FeatureWindow) -> Result<Option<ModelOutput>>;
}

/// Feature window built from the last [`WINDOW_LEN`] points of `series`,
/// together with the price returns inside it.
///
/// The first point of the series has no predecessor and gets a zero return,
/// as does any point following a non-positive price. Returns `None` when the
/// series is shorter than the window.
pub fn feature_window(series: &[PricePoint]) -> Option<(FeatureWindow, Vec<f64>)> {
    if series.len() < WINDOW_LEN {
        return None;
    }

    let start = series.len() - WINDOW_LEN;
    let mut window = [[0.0; FEATURE_COUNT]; WINDOW_LEN];
    let mut returns = Vec::with_capacity(WINDOW_LEN);

    for (row, idx) in (start..series.len()).enumerate() {
        let point = &series[idx];
        let ret = match idx.checked_sub(1).map(|prev| series[prev].price) {
            | Some(prev) if prev > 0.0 && point.price.is_finite() => point.price / prev - 1.0,
            | _ => 0.0,
        };
        window[row] = [ret, point.tvl_change_or_zero() / 100.0, point.apy_cv_or_zero() / 100.0];
        returns.push(ret);
    }

    Some((window, returns))
}

/// Wraps a [`Forecaster`] and converts every failure mode into the neutral
/// signal.
#[derive(Clone)]
pub struct ForecastAdapter {
    forecaster: Arc<dyn Forecaster>,
}

impl ForecastAdapter {
    pub fn new(forecaster: Arc<dyn Forecaster>) -> Self {
        Self { forecaster }
    }

    /// Forecast for `symbol` from its (possibly empty) history.
    pub fn forecast(&self, symbol: &str, series: &[PricePoint]) -> ForecastSignal {
        let Some((window, returns)) = feature_window(series) else {
            log::debug!(
                "{}: {} history points, forecaster needs {}; using neutral signal",
                symbol,
                series.len(),
                WINDOW_LEN
            );
            crate::metrics::record_fallback("forecaster", "short_history");
            return ForecastSignal::neutral();
        };

        match self.forecaster.predict(symbol, &window) {
            | Ok(Some(output))
                if output.expected_return.is_finite() && output.downside_probability.is_finite() =>
            {
                let realised = sample_std_dev(&returns).unwrap_or(0.0);
                ForecastSignal {
                    expected_return: output.expected_return,
                    volatility: output.expected_return.abs() + realised,
                    downside_probability: output.downside_probability.clamp(0.0, 1.0),
                    low_confidence: false,
                }
            }
            | Ok(Some(output)) => {
                log::warn!("{}: forecaster returned non-finite output {:?}", symbol, output);
                crate::metrics::record_fallback("forecaster", "invalid_output");
                ForecastSignal::neutral()
            }
            | Ok(None) => {
                log::debug!("{}: no forecast model, using neutral signal", symbol);
                crate::metrics::record_fallback("forecaster", "no_model");
                ForecastSignal::neutral()
            }
            | Err(e) => {
                log::warn!("{}: forecaster failed: {}", symbol, e);
                crate::metrics::record_fallback("forecaster", "error");
                ForecastSignal::neutral()
            }
        }
    }
}

impl Default for ForecastAdapter {
    fn default() -> Self {
        Self::new(Arc::new(NullForecaster))
    }
}

impl std::fmt::Debug for ForecastAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastAdapter").finish_non_exhaustive()
    }
}
