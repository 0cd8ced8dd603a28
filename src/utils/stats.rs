//! Small statistics helpers on top of `statrs`.
//!
//! `statrs` reports NaN for degenerate samples; these wrappers return `None`
//! instead so callers pick their own fallback.

use statrs::statistics::Statistics;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = values.iter().mean();
    m.is_finite().then_some(m)
}

/// Sample (n - 1) standard deviation, `None` with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sd = values.iter().std_dev();
    sd.is_finite().then_some(sd)
}

/// Population (n) standard deviation, `None` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sd = values.iter().population_std_dev();
    sd.is_finite().then_some(sd)
}

/// Day-over-day fractional returns of consecutive prices.
///
/// A pair whose previous price is not strictly positive has no defined return
/// and is skipped.
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[0].is_finite() && w[1].is_finite())
        .map(|w| w[1] / w[0] - 1.0)
        .collect()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [0.01, -0.02, 0.03, 0.0];
        assert!((mean(&values).unwrap() - 0.005).abs() < 1e-12);
        // sample variance = sum((x - 0.005)^2) / 3
        let expected = ((0.005f64.powi(2) + 0.025f64.powi(2) + 0.025f64.powi(2) + 0.005f64.powi(2)) / 3.0).sqrt();
        assert!((sample_std_dev(&values).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_samples() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std_dev(&[0.3]), None);
        assert_eq!(population_std_dev(&[]), None);
        assert_eq!(population_std_dev(&[0.3]), Some(0.0));
    }

    #[test]
    fn test_population_std_dev() {
        let sd = population_std_dev(&[1.0, -1.0]).unwrap();
        assert!((sd - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pct_returns_skips_non_positive_base() {
        let returns = pct_returns(&[100.0, 110.0, 0.0, 50.0, 55.0]);
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 1.0).abs() < 1e-12);
        assert!((returns[2] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234567891, 6), 1.234568);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(76.48, 1), 76.5);
        assert!(round_to(f64::NAN, 2).is_nan());
    }
}
