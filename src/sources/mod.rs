//! External data sources consumed by the bounds service.
//!
//! Each capability is an async trait so the service can bound every call
//! with a deadline. Implementations report failures as errors; turning those
//! into fallback values is the caller's job.

mod cryptopanic;
mod csv_history;
mod dexscreener;

use crate::utils::types::{Headline, PriceQuote, PriceSeries};
use async_trait::async_trait;

pub use cryptopanic::{CryptoPanicNewsSource, CRYPTOPANIC_API_BASE};
pub use csv_history::CsvHistorySource;
pub use dexscreener::{DexScreenerPriceSource, DEXSCREENER_API_BASE};

/// Browser User-Agent sent to public market-data APIs
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Live price lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD price and 24h change in percent. A price of 0 means the
    /// source could not resolve the asset.
    async fn fetch_current_price(&self, symbol: &str) -> crate::Result<PriceQuote>;
}

/// Historical price lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Up to `max_points` most recent points, oldest first.
    async fn fetch_history(&self, symbol: &str, max_points: usize) -> crate::Result<PriceSeries>;
}

/// News headline lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Headlines in provider order, timestamps untouched.
    async fn fetch_headlines(&self, symbol: &str) -> crate::Result<Vec<Headline>>;
}

/// History source with no data; every asset gets an empty series.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

#[async_trait]
impl HistorySource for NoHistory {
    async fn fetch_history(&self, _symbol: &str, _max_points: usize) -> crate::Result<PriceSeries> {
        Ok(Vec::new())
    }
}

/// News source with no feed configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNews;

#[async_trait]
impl NewsSource for NoNews {
    async fn fetch_headlines(&self, _symbol: &str) -> crate::Result<Vec<Headline>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sources() {
        assert!(tokio_test::block_on(NoHistory.fetch_history("sol", 30)).unwrap().is_empty());
        assert!(tokio_test::block_on(NoNews.fetch_headlines("sol")).unwrap().is_empty());
    }
}
