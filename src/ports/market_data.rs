//! Market data port: the paginated ticker feed and global market stats.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Market data error type
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    #[error("HTTP request error: {0}")]
    HttpError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        MarketDataError::HttpError(e.to_string())
    }
}

/// One asset in the provider's ticker feed. Only the handful of fields the
/// aggregator reads are typed; the rest ride along in `extra` so a persisted
/// snapshot keeps everything the provider sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketCapEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Provider-side identifier matched against our lookup slugs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_slug: Option<String>,

    /// Unix timestamp of the provider's last refresh of this asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<u64>,

    #[serde(default, skip_serializing_if = "Quotes::is_empty")]
    pub quotes: Quotes,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MarketCapEntry {
    /// Market cap in whole USD, when the provider carries one.
    pub fn market_cap_usd(&self) -> Option<u64> {
        let cap = self.quotes.usd.as_ref()?.market_cap?;
        Some(cap as u64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quotes {
    #[serde(rename = "USD", default, skip_serializing_if = "Option::is_none")]
    pub usd: Option<UsdQuote>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Quotes {
    fn is_empty(&self) -> bool {
        self.usd.is_none() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdQuote {
    /// Null for assets the provider has no cap figure for.
    #[serde(default)]
    pub market_cap: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One page of the ticker feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerPage {
    /// Entries keyed by the provider's numeric asset id.
    #[serde(default)]
    pub data: BTreeMap<String, MarketCapEntry>,

    #[serde(default)]
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Total number of assets the provider tracks; bounds the pagination walk.
    #[serde(default)]
    pub num_cryptocurrencies: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Provider-wide market statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalMetrics {
    pub total_market_cap_usd: f64,
}

/// Market data port trait
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch one ticker page, `limit` entries starting at offset `start`.
    async fn ticker_page(&self, start: u64, limit: u64) -> Result<TickerPage, MarketDataError>;

    /// Fetch the provider-wide totals.
    async fn global_metrics(&self) -> Result<GlobalMetrics, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_parses_provider_shape() {
        let raw = r#"{
            "id": 1,
            "name": "Bitcoin",
            "symbol": "BTC",
            "website_slug": "bitcoin",
            "rank": 1,
            "last_updated": 1535000000,
            "quotes": {"USD": {"price": 6500.0, "market_cap": 112000000000.0}}
        }"#;
        let entry: MarketCapEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.website_slug.as_deref(), Some("bitcoin"));
        assert_eq!(entry.market_cap_usd(), Some(112_000_000_000));
        assert_eq!(entry.extra["rank"], 1);
    }

    #[test]
    fn test_entry_without_market_cap() {
        let raw = r#"{"website_slug": "tiny", "quotes": {"USD": {"market_cap": null}}}"#;
        let entry: MarketCapEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.market_cap_usd(), None);
    }

    #[test]
    fn test_ticker_page_shape() {
        let raw = r#"{
            "data": {"1": {"website_slug": "bitcoin"}},
            "metadata": {"num_cryptocurrencies": 1900, "error": null}
        }"#;
        let page: TickerPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.metadata.num_cryptocurrencies, 1900);
    }
}
