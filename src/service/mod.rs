//! # Bounds Service
//!
//! Async orchestration around the pure [`BoundsEngine`]: fetches the live
//! quote, history and news for an asset, each under a deadline, and feeds the
//! results into the engine. A collaborator that errors or misses its deadline
//! is replaced by its fallback (unresolved quote, empty series, no news) and
//! the request still completes.

use crate::calibration::{normalize_symbol, ConfidenceLevel};
use crate::config::Config;
use crate::engine::{BoundsEngine, BoundsRequest, BoundsResult, PairAnalysis};
use crate::forecast::Forecaster;
use crate::news::{NewsRecencySelector, RecencyTier};
use crate::sentiment::{LexiconClassifier, SentimentSummary};
use crate::sources::{
    CryptoPanicNewsSource, CsvHistorySource, DexScreenerPriceSource, HistorySource, NewsSource, PriceSource,
};
use crate::utils::stats::round_to;
use crate::utils::types::{Headline, PriceQuote, PriceSeries};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Price assumed for a pegged asset whose quote could not be resolved
pub const STABLECOIN_FALLBACK_PRICE: f64 = 1.0;

/// Sentiment report for an asset's recent news.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsReport {
    pub token: String,
    pub news_available: bool,
    pub tier: RecencyTier,
    pub sentiment: SentimentSummary,
}

/// Runs one collaborator call under `deadline`, mapping errors and timeouts
/// to `fallback`.
async fn guarded<T, F>(collaborator: &'static str, symbol: &str, deadline: Duration, call: F, fallback: T) -> T
where
    F: Future<Output = crate::Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        | Ok(Ok(value)) => value,
        | Ok(Err(e)) => {
            log::warn!("{} source failed for {}: {}", collaborator, symbol, e);
            crate::metrics::record_fallback(collaborator, "error");
            fallback
        }
        | Err(_) => {
            log::warn!("{} source timed out for {} after {:?}", collaborator, symbol, deadline);
            crate::metrics::record_fallback(collaborator, "timeout");
            fallback
        }
    }
}

#[derive(Clone)]
pub struct BoundsService {
    engine: BoundsEngine,
    prices: Arc<dyn PriceSource>,
    history: Arc<dyn HistorySource>,
    news: Arc<dyn NewsSource>,
    selector: NewsRecencySelector,
    deadline: Duration,
    history_points: usize,
}

impl BoundsService {
    pub fn new(
        engine: BoundsEngine,
        prices: Arc<dyn PriceSource>,
        history: Arc<dyn HistorySource>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            engine,
            prices,
            history,
            news,
            selector: NewsRecencySelector::new(),
            deadline: Duration::from_secs(5),
            history_points: 30,
        }
    }

    /// Service wired to the configured DexScreener, CryptoPanic and CSV
    /// sources, with the lexicon classifier and the given forecaster.
    pub fn from_config(config: &Config, forecaster: Arc<dyn Forecaster>) -> crate::Result<Self> {
        let calibration = config.calibration_table()?;
        let timeout = config.request_timeout();

        let engine = BoundsEngine::new(Arc::clone(&calibration), forecaster, Arc::new(LexiconClassifier::new()));
        let prices =
            DexScreenerPriceSource::new(config.sources.dexscreener_base_url.as_str(), timeout, Arc::clone(&calibration))?;
        let news = CryptoPanicNewsSource::new(
            config.sources.cryptopanic_base_url.as_str(),
            config.sources.cryptopanic_api_key.clone(),
            timeout,
            calibration,
        )?;
        let history = CsvHistorySource::new(&config.app.data_dir);

        Ok(Self::new(engine, Arc::new(prices), Arc::new(history), Arc::new(news))
            .with_deadline(timeout)
            .with_history_points(config.engine.history_points))
    }

    /// Deadline applied to every collaborator call
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Number of history points requested per asset
    pub fn with_history_points(mut self, history_points: usize) -> Self {
        self.history_points = history_points;
        self
    }

    pub fn engine(&self) -> &BoundsEngine {
        &self.engine
    }

    async fn quote(&self, symbol: &str) -> PriceQuote {
        guarded("price", symbol, self.deadline, self.prices.fetch_current_price(symbol), PriceQuote::unresolved()).await
    }

    async fn series(&self, symbol: &str) -> PriceSeries {
        guarded(
            "history",
            symbol,
            self.deadline,
            self.history.fetch_history(symbol, self.history_points),
            Vec::new(),
        )
        .await
    }

    async fn headlines(&self, symbol: &str) -> Vec<Headline> {
        guarded("news", symbol, self.deadline, self.news.fetch_headlines(symbol), Vec::new()).await
    }

    /// Bounds for `symbol`. A caller price above zero wins over the live
    /// quote; the quote is still fetched for its 24h change.
    pub async fn bounds(&self, symbol: &str, price: Option<f64>, confidence: ConfidenceLevel) -> BoundsResult {
        self.bounds_at(symbol, price, confidence, Utc::now()).await
    }

    /// [`bounds`](Self::bounds) with an explicit reference time for news
    /// recency.
    pub async fn bounds_at(
        &self,
        symbol: &str,
        price: Option<f64>,
        confidence: ConfidenceLevel,
        now: DateTime<Utc>,
    ) -> BoundsResult {
        let symbol = normalize_symbol(symbol);
        let (quote, series, headlines) =
            tokio::join!(self.quote(&symbol), self.series(&symbol), self.headlines(&symbol));

        let current_price = self.resolve_price(&symbol, price, &quote);
        let selection = self.selector.select(&headlines, now);
        log::info!(
            "{}: price={} history={} news={} ({:?})",
            symbol,
            current_price,
            series.len(),
            selection.headlines.len(),
            selection.tier
        );

        let mut request = BoundsRequest::new(symbol.as_str())
            .with_price(current_price)
            .with_series(series)
            .with_headlines(selection.texts())
            .with_confidence(confidence);
        if quote.is_resolved() && quote.change_24h_pct.is_finite() {
            request = request.with_change_24h(quote.change_24h_pct);
        }

        let result = self.engine.compute_bounds(&request);
        crate::metrics::record_safety_score(&symbol, result.safety_score);
        result
    }

    fn resolve_price(&self, symbol: &str, price: Option<f64>, quote: &PriceQuote) -> f64 {
        match price {
            | Some(p) if p.is_finite() && p > 0.0 => p,
            | _ if quote.is_resolved() => quote.price,
            | _ if self.engine.calibration_table().is_stablecoin(symbol) => {
                log::debug!("{}: no quote, using peg price {}", symbol, STABLECOIN_FALLBACK_PRICE);
                STABLECOIN_FALLBACK_PRICE
            }
            | _ => 0.0,
        }
    }

    /// Recency-filtered news and its sentiment.
    pub async fn news_report(&self, symbol: &str) -> NewsReport {
        self.news_report_at(symbol, Utc::now()).await
    }

    pub async fn news_report_at(&self, symbol: &str, now: DateTime<Utc>) -> NewsReport {
        let symbol = normalize_symbol(symbol);
        let headlines = self.headlines(&symbol).await;
        let selection = self.selector.select(&headlines, now);
        let mut sentiment = self.engine.aggregate_sentiment(&selection.texts());
        sentiment.net_sentiment = round_to(sentiment.net_sentiment, 4);
        sentiment.confidence = round_to(sentiment.confidence, 4);
        NewsReport {
            token: symbol.to_uppercase(),
            news_available: !selection.is_empty(),
            tier: selection.tier,
            sentiment,
        }
    }

    /// Bounds for several assets, computed concurrently, in input order.
    pub async fn multi_bounds(&self, symbols: &[String], confidence: ConfidenceLevel) -> Vec<BoundsResult> {
        join_all(symbols.iter().map(|s| self.bounds(s, None, confidence))).await
    }

    /// Farming verdict for the pair `a`/`b`.
    pub async fn pair_analysis(&self, a: &str, b: &str, price_a: Option<f64>, price_b: Option<f64>) -> PairAnalysis {
        let confidence = ConfidenceLevel::default();
        let (bounds_a, bounds_b) = tokio::join!(self.bounds(a, price_a, confidence), self.bounds(b, price_b, confidence));
        PairAnalysis::from_bounds(bounds_a, bounds_b)
    }
}

impl std::fmt::Debug for BoundsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundsService")
            .field("engine", &self.engine)
            .field("deadline", &self.deadline)
            .field("history_points", &self.history_points)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{MockHistorySource, MockNewsSource, MockPriceSource};
    use crate::Error;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap()
    }

    fn service(prices: MockPriceSource, history: MockHistorySource, news: MockNewsSource) -> BoundsService {
        BoundsService::new(BoundsEngine::default(), Arc::new(prices), Arc::new(history), Arc::new(news))
            .with_deadline(Duration::from_millis(200))
    }

    fn empty_history() -> MockHistorySource {
        let mut history = MockHistorySource::new();
        history.expect_fetch_history().returning(|_, _| Ok(Vec::new()));
        history
    }

    fn no_news() -> MockNewsSource {
        let mut news = MockNewsSource::new();
        news.expect_fetch_headlines().returning(|_| Ok(Vec::new()));
        news
    }

    #[tokio::test]
    async fn test_caller_price_wins_and_quote_supplies_change() {
        let mut prices = MockPriceSource::new();
        prices.expect_fetch_current_price().times(1).returning(|_| Ok(PriceQuote::new(149.0, -12.0)));
        let svc = service(prices, empty_history(), no_news());

        let result = svc.bounds_at("SOL", Some(150.0), ConfidenceLevel::P80, now()).await;
        assert_eq!(result.current_price, 150.0);
        assert_eq!(result.breakdown.volatility_source, crate::volatility::VolatilitySource::Change24h);
    }

    #[tokio::test]
    async fn test_failed_quote_for_stablecoin_uses_peg() {
        let mut prices = MockPriceSource::new();
        prices
            .expect_fetch_current_price()
            .returning(|_| Err(Error::ConnectionError("dns failure".into())));
        let svc = service(prices, empty_history(), no_news());

        let result = svc.bounds_at("usdc", None, ConfidenceLevel::P80, now()).await;
        assert_eq!(result.current_price, 1.0);
        assert!(result.safety_score >= 90.0);
    }

    #[tokio::test]
    async fn test_failed_quote_for_volatile_asset_is_degenerate() {
        let mut prices = MockPriceSource::new();
        prices.expect_fetch_current_price().returning(|_| Ok(PriceQuote::unresolved()));
        let svc = service(prices, empty_history(), no_news());

        let result = svc.bounds_at("pengu", None, ConfidenceLevel::P80, now()).await;
        assert_eq!(result.current_price, 0.0);
        assert_eq!(result.range_width_pct, 0.0);
    }

    #[tokio::test]
    async fn test_news_report_selects_fresh_tier() {
        let mut prices = MockPriceSource::new();
        prices.expect_fetch_current_price().never();
        let mut news = MockNewsSource::new();
        news.expect_fetch_headlines().withf(|s| s == "jup").returning(|_| {
            Ok(vec![
                Headline::at("Jupiter surges on record volume", now() - ChronoDuration::hours(2)),
                Headline::at("Jupiter exploit rumours", now() - ChronoDuration::hours(50)),
            ])
        });
        let svc = service(prices, empty_history(), news);

        let report = svc.news_report_at("JUP", now()).await;
        assert_eq!(report.token, "JUP");
        assert!(report.news_available);
        assert_eq!(report.tier, RecencyTier::Fresh);
        assert_eq!(report.sentiment.headlines.len(), 1);
        assert!(report.sentiment.net_sentiment > 0.0);
    }

    #[tokio::test]
    async fn test_news_failure_reports_unavailable() {
        let prices = MockPriceSource::new();
        let mut news = MockNewsSource::new();
        news.expect_fetch_headlines().returning(|_| Err(Error::ConfigError("no key".into())));
        let svc = service(prices, empty_history(), news);

        let report = svc.news_report_at("sol", now()).await;
        assert!(!report.news_available);
        assert_eq!(report.sentiment, SentimentSummary::neutral());
    }
}
