//! Historical volatility estimation.
//!
//! Pure function of the price series, the asset's stablecoin flag and an
//! optional 24h change. Short or missing history degrades through fixed
//! fallbacks; the estimate records which branch produced it.

use crate::utils::stats::{pct_returns, sample_std_dev};
use crate::utils::types::PricePoint;
use serde::{Deserialize, Serialize};

/// Daily volatility assumed for pegged assets
pub const STABLECOIN_DAILY_VOLATILITY: f64 = 0.001;
/// Daily volatility when history exists but yields fewer than two returns
pub const SHORT_HISTORY_DAILY_VOLATILITY: f64 = 0.02;
/// Floor applied to the 24h-change heuristic
pub const MIN_CHANGE_DAILY_VOLATILITY: f64 = 0.02;
/// Daily volatility with no usable information at all
pub const UNKNOWN_DAILY_VOLATILITY: f64 = 0.05;
/// Series must be longer than this to use realised volatility
pub const MIN_HISTORY_POINTS: usize = 7;
/// Number of most recent returns in the realised-volatility sample
pub const RETURN_LOOKBACK: usize = 14;

const CHANGE_TO_DAILY_FACTOR: f64 = 0.6;

/// Which input the estimate was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    Stablecoin,
    History,
    Change24h,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityEstimate {
    pub daily: f64,
    pub weekly: f64,
    pub source: VolatilitySource,
}

impl VolatilityEstimate {
    fn from_daily(daily: f64, source: VolatilitySource) -> Self {
        Self { daily, weekly: daily * 7f64.sqrt(), source }
    }
}

/// Estimate daily and weekly (√7-scaled) volatility.
///
/// `change_24h_pct` is the latest 24h price change in percent, passed in by
/// the caller for this call only.
pub fn estimate(series: &[PricePoint], stablecoin: bool, change_24h_pct: Option<f64>) -> VolatilityEstimate {
    if stablecoin {
        return VolatilityEstimate::from_daily(STABLECOIN_DAILY_VOLATILITY, VolatilitySource::Stablecoin);
    }

    if series.len() > MIN_HISTORY_POINTS {
        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        let returns = pct_returns(&prices);
        let recent = &returns[returns.len().saturating_sub(RETURN_LOOKBACK)..];
        let daily = sample_std_dev(recent).unwrap_or(SHORT_HISTORY_DAILY_VOLATILITY);
        return VolatilityEstimate::from_daily(daily, VolatilitySource::History);
    }

    match change_24h_pct {
        | Some(change) if change.is_finite() && change != 0.0 => {
            let daily = MIN_CHANGE_DAILY_VOLATILITY.max((change / 100.0).abs() * CHANGE_TO_DAILY_FACTOR);
            VolatilityEstimate::from_daily(daily, VolatilitySource::Change24h)
        }
        | _ => VolatilityEstimate::from_daily(UNKNOWN_DAILY_VOLATILITY, VolatilitySource::Default),
    }
}
