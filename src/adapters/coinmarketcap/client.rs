use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::market_data::{GlobalMetrics, MarketDataError, MarketDataSource, TickerPage};

const COINMARKETCAP_API: &str = "https://api.coinmarketcap.com/v2";

/// Connection settings for the public ticker API.
#[derive(Debug, Clone)]
pub struct MarketApiConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for MarketApiConfig {
    fn default() -> Self {
        Self {
            api_url: COINMARKETCAP_API.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MarketApiConfig {
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// CoinMarketCap v2 API client.
#[derive(Debug, Clone)]
pub struct CoinMarketCapClient {
    config: MarketApiConfig,
    http: Client,
}

impl CoinMarketCapClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(MarketApiConfig::default())
    }

    pub fn with_config(config: MarketApiConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl MarketDataSource for CoinMarketCapClient {
    async fn ticker_page(&self, start: u64, limit: u64) -> Result<TickerPage, MarketDataError> {
        let url = format!(
            "{}/ticker/?start={}&convert=USD&limit={}",
            self.config.api_url, start, limit
        );

        let page: TickerPage = self.http.get(&url).send().await?.json().await?;
        Ok(page)
    }

    async fn global_metrics(&self) -> Result<GlobalMetrics, MarketDataError> {
        let url = format!("{}/global", self.config.api_url);

        let response: GlobalResponse = self.http.get(&url).send().await?.json().await?;
        Ok(GlobalMetrics {
            total_market_cap_usd: response.data.quotes.usd.total_market_cap,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    quotes: GlobalQuotes,
}

#[derive(Debug, Deserialize)]
struct GlobalQuotes {
    #[serde(rename = "USD")]
    usd: GlobalUsdQuote,
}

#[derive(Debug, Deserialize)]
struct GlobalUsdQuote {
    total_market_cap: f64,
}
