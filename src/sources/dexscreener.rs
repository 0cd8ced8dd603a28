//! DexScreener price source.

use super::{PriceSource, USER_AGENT};
use crate::calibration::{normalize_symbol, CalibrationTable};
use crate::utils::types::PriceQuote;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com";

const SOLANA_CHAIN_ID: &str = "solana";
/// Most liquid pairs inspected per search
const TOP_PAIRS: usize = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    #[serde(default)]
    chain_id: String,
    #[serde(default)]
    base_token: Token,
    #[serde(default)]
    quote_token: Token,
    #[serde(default)]
    price_usd: Option<String>,
    #[serde(default)]
    price_native: Option<String>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
    #[serde(default)]
    price_change: Option<PriceChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Token {
    #[serde(default)]
    address: String,
    #[serde(default)]
    symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Liquidity {
    #[serde(default)]
    usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceChange {
    #[serde(default)]
    h24: Option<f64>,
}

impl Token {
    fn matches(&self, symbol: &str, mint: Option<&str>) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol) || mint.map_or(false, |m| self.address == m)
    }
}

impl Pair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    fn change_24h(&self) -> f64 {
        self.price_change.as_ref().and_then(|c| c.h24).unwrap_or(0.0)
    }
}

fn parse_price(raw: &Option<String>) -> f64 {
    raw.as_deref().and_then(|s| s.parse::<f64>().ok()).filter(|p| p.is_finite()).unwrap_or(0.0)
}

/// Price of `symbol` from the most liquid Solana pairs of a search result.
///
/// When the asset is the pair's base token its USD price is quoted directly;
/// as the quote token its price is derived from the base token's USD and
/// native prices.
fn pick_price(pairs: &[Pair], symbol: &str, mint: Option<&str>) -> Option<PriceQuote> {
    let mut solana: Vec<&Pair> = pairs.iter().filter(|p| p.chain_id == SOLANA_CHAIN_ID).collect();
    solana.sort_by(|a, b| b.liquidity_usd().total_cmp(&a.liquidity_usd()));

    for pair in solana.into_iter().take(TOP_PAIRS) {
        if pair.base_token.matches(symbol, mint) {
            let price = parse_price(&pair.price_usd);
            if price > 0.0 {
                return Some(PriceQuote::new(price, pair.change_24h()));
            }
        } else if pair.quote_token.matches(symbol, mint) {
            let usd = parse_price(&pair.price_usd);
            let native = parse_price(&pair.price_native);
            if usd > 0.0 && native > 0.0 {
                // base-token change does not describe the quote token
                return Some(PriceQuote::new(usd / native, 0.0));
            }
        }
    }
    None
}

/// Resolves live prices through DexScreener pair search.
pub struct DexScreenerPriceSource {
    client: Client,
    base_url: String,
    calibration: Arc<CalibrationTable>,
}

impl DexScreenerPriceSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration, calibration: Arc<CalibrationTable>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), calibration })
    }

    async fn search(&self, query: &str) -> Result<Vec<Pair>> {
        let url = format!("{}/latest/dex/search", self.base_url);
        let response = self.client.get(&url).query(&[("q", query)]).send().await?;
        if !response.status().is_success() {
            return Err(crate::Error::ConnectionError(format!(
                "DexScreener search for '{}' returned {}",
                query,
                response.status()
            )));
        }
        let body = response.json::<SearchResponse>().await?;
        Ok(body.pairs.unwrap_or_default())
    }
}

#[async_trait]
impl PriceSource for DexScreenerPriceSource {
    async fn fetch_current_price(&self, symbol: &str) -> Result<PriceQuote> {
        let symbol = normalize_symbol(symbol);
        let mint = self.calibration.profile(&symbol).mint.clone();

        let mut queries = Vec::with_capacity(2);
        if let Some(mint) = &mint {
            queries.push(mint.clone());
        }
        queries.push(symbol.to_uppercase());

        let mut last_error = None;
        for query in queries {
            match self.search(&query).await {
                | Ok(pairs) => {
                    if let Some(quote) = pick_price(&pairs, &symbol, mint.as_deref()) {
                        log::debug!("{}: DexScreener price {} (query {})", symbol, quote.price, query);
                        return Ok(quote);
                    }
                }
                | Err(e) => {
                    log::debug!("{}: DexScreener query '{}' failed: {}", symbol, query, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            | Some(e) => Err(e),
            | None => Ok(PriceQuote::unresolved()),
        }
    }
}
