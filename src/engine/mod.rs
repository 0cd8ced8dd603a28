//! # Bounds Engine
//!
//! Fuses historical volatility, the forecast signal and news sentiment into a
//! 7-day price range and a 0-100 safety score.
//!
//! Every computation is a function of the request alone. The engine holds
//! only immutable shared data: the calibration table and the two model
//! adapters. It never fails: an unresolved price produces a degenerate
//! all-zero range, an unknown symbol uses the default calibration row, and
//! collaborator failures have already been turned into neutral values by the
//! adapters.

mod pair;

pub use pair::{PairAnalysis, Recommendation, Signal};

use crate::calibration::{AssetCalibration, CalibrationTable, ConfidenceLevel};
use crate::forecast::{ForecastAdapter, ForecastSignal, Forecaster};
use crate::sentiment::{Classifier, SentimentAggregator, SentimentSummary, Trend};
use crate::utils::stats::round_to;
use crate::utils::types::{PricePoint, PriceSeries};
use crate::volatility::{self, VolatilitySource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Days covered by a prediction
pub const PREDICTION_HORIZON_DAYS: u32 = 7;

/// Weight of the forecast volatility inside the base uncertainty
const FORECAST_VOLATILITY_WEIGHT: f64 = 0.2;
/// Share of the weighted forecast volatility added to the base uncertainty
const FORECAST_VOLATILITY_SHARE: f64 = 0.1;
/// Share of the forecast return carried into the predicted price
const FORECAST_RETURN_WEIGHT: f64 = 0.3;
/// Sentiment-driven skew of the range
const ASYMMETRY_FACTOR: f64 = 0.02;

const SAFETY_VOLATILITY_WEIGHT: f64 = 0.4;
const SAFETY_RANGE_WEIGHT: f64 = 0.4;
const SAFETY_CONFIDENCE_WEIGHT: f64 = 0.2;
const VOLATILITY_PENALTY: f64 = 500.0;
const RANGE_PENALTY: f64 = 8.0;

/// Inputs for one bounds computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsRequest {
    pub symbol: String,
    /// Current price; zero or less means unresolved
    pub current_price: f64,
    #[serde(default)]
    pub series: PriceSeries,
    /// Headline texts, already recency-filtered
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    /// Latest 24h price change in percent
    #[serde(default)]
    pub change_24h_pct: Option<f64>,
}

impl BoundsRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: 0.0,
            series: Vec::new(),
            headlines: Vec::new(),
            confidence: ConfidenceLevel::default(),
            change_24h_pct: None,
        }
    }

    pub fn with_price(mut self, current_price: f64) -> Self {
        self.current_price = current_price;
        self
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series = series;
        self
    }

    pub fn with_headlines<S: Into<String>>(mut self, headlines: impl IntoIterator<Item = S>) -> Self {
        self.headlines = headlines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confidence(mut self, confidence: impl Into<ConfidenceLevel>) -> Self {
        self.confidence = confidence.into();
        self
    }

    pub fn with_change_24h(mut self, change_24h_pct: f64) -> Self {
        self.change_24h_pct = Some(change_24h_pct);
        self
    }
}

/// Diagnostic view of how the range was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsBreakdown {
    /// Forecast share of the predicted move, in percent
    pub forecast_contribution_pct: f64,
    /// Sentiment share of the predicted move, in percent
    pub sentiment_contribution_pct: f64,
    /// Weekly volatility, in percent
    pub recent_volatility_pct: f64,
    pub volatility_source: VolatilitySource,
    pub forecast_expected_return_pct: f64,
    pub forecast_volatility_pct: f64,
    pub downside_probability: f64,
    pub forecast_low_confidence: bool,
    pub net_sentiment: f64,
    pub sentiment_confidence: f64,
    pub sentiment_trend: Trend,
}

/// Predicted 7-day range and safety score for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsResult {
    /// Upper-case symbol
    pub token: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub range_width_pct: f64,
    pub safety_score: f64,
    pub breakdown: BoundsBreakdown,
    pub confidence_level: f64,
    pub prediction_horizon_days: u32,
}

/// weekly_volatility × range_multiplier plus a small forecast term.
pub fn base_uncertainty(weekly_volatility: f64, range_multiplier: f64, forecast_volatility: f64) -> f64 {
    weekly_volatility * range_multiplier + FORECAST_VOLATILITY_SHARE * (FORECAST_VOLATILITY_WEIGHT * forecast_volatility)
}

pub fn scaled_uncertainty(base_uncertainty: f64, confidence: ConfidenceLevel) -> f64 {
    base_uncertainty * confidence.z_score()
}

/// Range around `current_price`, skewed slightly toward the sentiment.
pub fn raw_bounds(current_price: f64, scaled_uncertainty: f64, net_sentiment: f64) -> (f64, f64) {
    let asymmetry = net_sentiment * ASYMMETRY_FACTOR;
    let lower = current_price * (1.0 - scaled_uncertainty * (1.0 + asymmetry));
    let upper = current_price * (1.0 + scaled_uncertainty * (1.0 - asymmetry));
    (lower, upper)
}

/// Narrow `(lower, upper)` into `current_price · (1 ± max_range_fraction)`,
/// then make sure `lower ≤ current ≤ upper`.
pub fn clamp_bounds(current_price: f64, lower: f64, upper: f64, max_range_fraction: f64) -> (f64, f64) {
    let floor = current_price * (1.0 - max_range_fraction);
    let ceiling = current_price * (1.0 + max_range_fraction);

    let mut lower = if lower < floor { floor } else { lower };
    let mut upper = if upper > ceiling { ceiling } else { upper };

    if !(lower <= current_price) {
        lower = current_price;
    }
    if !(upper >= current_price) {
        upper = current_price;
    }
    (lower, upper)
}

/// Composite safety score in [0, 100], raised to `floor`.
///
/// `range_width_pct` is `None` when the price is unresolved; the range term
/// then contributes nothing.
pub fn safety_score(weekly_volatility: f64, range_width_pct: Option<f64>, sentiment_confidence: f64, floor: f64) -> f64 {
    let volatility_score = (100.0 - weekly_volatility * VOLATILITY_PENALTY).max(0.0);
    let range_score = range_width_pct.map(|w| (100.0 - w * RANGE_PENALTY).max(0.0)).unwrap_or(0.0);
    let confidence_score = sentiment_confidence * 100.0;

    let score = SAFETY_VOLATILITY_WEIGHT * volatility_score
        + SAFETY_RANGE_WEIGHT * range_score
        + SAFETY_CONFIDENCE_WEIGHT * confidence_score;
    let score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
    score.max(floor)
}

/// The fusion engine.
#[derive(Debug, Clone)]
pub struct BoundsEngine {
    calibration: Arc<CalibrationTable>,
    forecast: ForecastAdapter,
    sentiment: SentimentAggregator,
}

impl BoundsEngine {
    pub fn new(
        calibration: Arc<CalibrationTable>,
        forecaster: Arc<dyn Forecaster>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            calibration,
            forecast: ForecastAdapter::new(forecaster),
            sentiment: SentimentAggregator::new(classifier),
        }
    }

    pub fn calibration_table(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Sentiment summary for up to the first 10 headlines.
    pub fn aggregate_sentiment<S: AsRef<str>>(&self, headlines: &[S]) -> SentimentSummary {
        self.sentiment.aggregate(headlines)
    }

    /// Compute the range, classifying the request's headlines first.
    pub fn compute_bounds(&self, request: &BoundsRequest) -> BoundsResult {
        let sentiment = self.aggregate_sentiment(&request.headlines);
        self.compute_with_sentiment(request, &sentiment)
    }

    /// Compute the range from an already aggregated sentiment summary.
    /// The request's headlines are ignored.
    pub fn compute_with_sentiment(&self, request: &BoundsRequest, sentiment: &SentimentSummary) -> BoundsResult {
        let profile = self.calibration.profile(&request.symbol);
        let symbol = profile_key(&request.symbol);
        let AssetCalibration { sentiment_impact_cap, range_multiplier, max_range_fraction } = profile.calibration;

        let current_price =
            if request.current_price.is_finite() && request.current_price > 0.0 { request.current_price } else { 0.0 };
        let resolved = current_price > 0.0;
        if !resolved {
            log::warn!("{}: price unresolved, returning degenerate bounds", symbol);
        }

        let series = with_current_price(&request.series, current_price);

        let vol = volatility::estimate(&series, profile.stablecoin, request.change_24h_pct);
        let forecast = self.forecast.forecast(&symbol, &series);

        let net_sentiment = if sentiment.net_sentiment.is_finite() { sentiment.net_sentiment.clamp(-1.0, 1.0) } else { 0.0 };
        let sentiment_confidence =
            if sentiment.confidence.is_finite() { sentiment.confidence.clamp(0.0, 1.0) } else { 0.0 };

        let base = base_uncertainty(vol.weekly, range_multiplier, forecast.volatility);
        let scaled = scaled_uncertainty(base, request.confidence);

        let forecast_move = FORECAST_RETURN_WEIGHT * forecast.expected_return;
        let sentiment_move = net_sentiment * sentiment_impact_cap;
        let predicted_price = current_price * (1.0 + forecast_move + sentiment_move);

        let (lower, upper) = raw_bounds(current_price, scaled, net_sentiment);
        let (lower, upper) = clamp_bounds(current_price, lower, upper, max_range_fraction);

        let range_width_pct = if resolved { (upper - lower) / current_price * 100.0 } else { 0.0 };
        let safety = safety_score(
            vol.weekly,
            resolved.then_some(range_width_pct),
            sentiment_confidence,
            profile.min_safety_score,
        );
        let safety = round_to(safety, 1);

        log::debug!(
            "{}: weekly_vol={:.4} ({:?}) scaled={:.4} z={} range=[{:.6}, {:.6}] safety={}",
            symbol,
            vol.weekly,
            vol.source,
            scaled,
            request.confidence.z_score(),
            lower,
            upper,
            safety
        );

        BoundsResult {
            token: symbol.to_uppercase(),
            current_price: round_to(current_price, 6),
            predicted_price: round_to(predicted_price, 6),
            lower_bound: round_to(lower, 6),
            upper_bound: round_to(upper, 6),
            range_width_pct: round_to(range_width_pct, 2),
            safety_score: safety,
            breakdown: breakdown(&forecast, forecast_move, sentiment_move, vol.weekly, vol.source, net_sentiment, sentiment_confidence),
            confidence_level: request.confidence.as_f64(),
            prediction_horizon_days: PREDICTION_HORIZON_DAYS,
        }
    }
}

impl Default for BoundsEngine {
    fn default() -> Self {
        Self {
            calibration: CalibrationTable::shared(),
            forecast: ForecastAdapter::default(),
            sentiment: SentimentAggregator::default(),
        }
    }
}

fn profile_key(symbol: &str) -> String {
    crate::calibration::normalize_symbol(symbol)
}

/// `series` plus a synthetic latest point at `current_price`, when the price
/// is known and there is history to extend.
fn with_current_price(series: &[PricePoint], current_price: f64) -> PriceSeries {
    let mut out = series.to_vec();
    if current_price > 0.0 {
        if let Some(last) = series.last() {
            out.push(PricePoint::new(last.timestamp, current_price));
        }
    }
    out
}

fn breakdown(
    forecast: &ForecastSignal,
    forecast_move: f64,
    sentiment_move: f64,
    weekly_volatility: f64,
    volatility_source: VolatilitySource,
    net_sentiment: f64,
    sentiment_confidence: f64,
) -> BoundsBreakdown {
    BoundsBreakdown {
        forecast_contribution_pct: round_to(forecast_move * 100.0, 2),
        sentiment_contribution_pct: round_to(sentiment_move * 100.0, 2),
        recent_volatility_pct: round_to(weekly_volatility * 100.0, 2),
        volatility_source,
        forecast_expected_return_pct: round_to(forecast.expected_return * 100.0, 2),
        forecast_volatility_pct: round_to(forecast.volatility * 100.0, 2),
        downside_probability: round_to(forecast.downside_probability, 4),
        forecast_low_confidence: forecast.low_confidence,
        net_sentiment: round_to(net_sentiment, 4),
        sentiment_confidence: round_to(sentiment_confidence, 4),
        sentiment_trend: Trend::from_net(net_sentiment),
    }
}
