//! Rule-based forecasters usable without a trained model.

use super::{FeatureWindow, Forecaster, ModelOutput};
use crate::Result;

/// Forecaster that never has a model; every asset gets the neutral signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullForecaster;

impl Forecaster for NullForecaster {
    fn predict(&self, _symbol: &str, _window: &FeatureWindow) -> Result<Option<ModelOutput>> {
        Ok(None)
    }
}

/// Momentum-style forecaster: projects the window's mean daily return over
/// the horizon and reads the downside probability off the share of down days.
#[derive(Debug, Clone, Copy)]
pub struct DriftForecaster {
    /// Days projected forward
    pub horizon_days: f64,
    /// Absolute cap on the projected return
    pub max_abs_return: f64,
}

impl Default for DriftForecaster {
    fn default() -> Self {
        Self { horizon_days: 7.0, max_abs_return: 0.5 }
    }
}

impl Forecaster for DriftForecaster {
    fn predict(&self, _symbol: &str, window: &FeatureWindow) -> Result<Option<ModelOutput>> {
        let returns: Vec<f64> = window.iter().map(|step| step[0]).collect();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let down_days = returns.iter().filter(|r| **r < 0.0).count() as f64;

        let expected = (mean * self.horizon_days).clamp(-self.max_abs_return, self.max_abs_return);
        Ok(Some(ModelOutput::new(expected, down_days / n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{FEATURE_COUNT, WINDOW_LEN};

    fn window_with_returns(f: impl Fn(usize) -> f64) -> FeatureWindow {
        let mut w = [[0.0; FEATURE_COUNT]; WINDOW_LEN];
        for (i, step) in w.iter_mut().enumerate() {
            step[0] = f(i);
        }
        w
    }

    #[test]
    fn test_null_forecaster_has_no_model() {
        let w = window_with_returns(|_| 0.01);
        assert_eq!(NullForecaster.predict("sol", &w).unwrap(), None);
    }

    #[test]
    fn test_drift_projects_mean_return() {
        let w = window_with_returns(|_| 0.01);
        let out = DriftForecaster::default().predict("sol", &w).unwrap().unwrap();
        assert!((out.expected_return - 0.07).abs() < 1e-12);
        assert_eq!(out.downside_probability, 0.0);
    }

    #[test]
    fn test_drift_counts_down_days_and_caps_return() {
        let w = window_with_returns(|i| if i % 3 == 0 { -0.9 } else { 0.0 });
        let out = DriftForecaster::default().predict("pengu", &w).unwrap().unwrap();
        assert_eq!(out.expected_return, -0.5);
        assert!((out.downside_probability - 10.0 / 30.0).abs() < 1e-12);
    }
}
