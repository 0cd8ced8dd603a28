//! # YieldSense
//! Seven-day price bounds and safety scores for Solana yield-farming assets.
//!
//! The [`engine::BoundsEngine`] fuses realised volatility, a forecast signal
//! and news sentiment into a predicted range per asset. It is synchronous and
//! total; all I/O lives in [`service::BoundsService`] and the
//! [`sources`] it wraps.

pub use crate::utils::error::{Error, Result};

pub mod calibration;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod metrics;
pub mod news;
pub mod sentiment;
pub mod service;
pub mod sources;
pub mod utils;
pub mod volatility;

pub use calibration::{AssetCalibration, AssetProfile, CalibrationTable, ConfidenceLevel};
pub use config::Config;
pub use engine::{BoundsEngine, BoundsRequest, BoundsResult, PairAnalysis};
pub use forecast::{DriftForecaster, ForecastAdapter, ForecastSignal, Forecaster, NullForecaster};
pub use news::{NewsRecencySelector, RecencySelection, RecencyTier};
pub use sentiment::{Classifier, LexiconClassifier, SentimentAggregator, SentimentSummary};
pub use service::{BoundsService, NewsReport};
pub use utils::types::{Headline, PricePoint, PriceQuote, PriceSeries};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shared_types_are_thread_safe() {
        assert_send_sync::<BoundsEngine>();
        assert_send_sync::<BoundsService>();
        assert_send_sync::<CalibrationTable>();
    }
}
