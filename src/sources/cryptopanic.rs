//! CryptoPanic news source (developer v2 posts API).

use super::{NewsSource, USER_AGENT};
use crate::calibration::CalibrationTable;
use crate::utils::types::Headline;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const CRYPTOPANIC_API_BASE: &str = "https://cryptopanic.com";

const POSTS_PATH: &str = "/api/developer/v2/posts/";

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

fn headlines_from(body: PostsResponse) -> Vec<Headline> {
    body.results
        .into_iter()
        .filter_map(|post| post.title.map(|title| Headline::new(title, post.published_at)))
        .collect()
}

/// Fetches public news posts for an asset's currency code.
pub struct CryptoPanicNewsSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    calibration: Arc<CalibrationTable>,
}

impl CryptoPanicNewsSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        calibration: Arc<CalibrationTable>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            calibration,
        })
    }
}

#[async_trait]
impl NewsSource for CryptoPanicNewsSource {
    async fn fetch_headlines(&self, symbol: &str) -> Result<Vec<Headline>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("CryptoPanic API key is not configured".into()))?;
        let currency = self.calibration.profile(symbol).news_query();
        let currency = if self.calibration.is_known(symbol) { currency } else { symbol.trim().to_uppercase() };

        let url = format!("{}{}", self.base_url, POSTS_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("auth_token", api_key), ("currencies", currency.as_str()), ("kind", "news"), ("public", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = if text.trim_start().to_lowercase().starts_with("<html") || text.contains("<!DOCTYPE") {
                "service unavailable".to_string()
            } else {
                text.chars().take(100).collect()
            };
            return Err(Error::ConnectionError(format!("CryptoPanic returned {}: {}", status, detail)));
        }

        let body = response.json::<PostsResponse>().await?;
        let headlines = headlines_from(body);
        log::debug!("{}: {} headlines from CryptoPanic ({})", symbol, headlines.len(), currency);
        Ok(headlines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posts() {
        let body: PostsResponse = serde_json::from_str(
            r#"{
                "next": null,
                "results": [
                    {"title": "Solana hits new TVL high", "published_at": "2026-01-06T16:40:00Z", "kind": "news"},
                    {"title": null, "published_at": "2026-01-06T15:00:00Z"},
                    {"title": "Untimed post"}
                ]
            }"#,
        )
        .unwrap();
        let headlines = headlines_from(body);
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].text, "Solana hits new TVL high");
        assert!(headlines[0].published_at_utc().is_some());
        assert_eq!(headlines[1].published_at, None);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let source =
            CryptoPanicNewsSource::new(CRYPTOPANIC_API_BASE, Some("  ".into()), Duration::from_secs(1), CalibrationTable::shared())
                .unwrap();
        let err = source.fetch_headlines("sol").await.unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
