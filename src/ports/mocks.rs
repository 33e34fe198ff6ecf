use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;
use crate::ports::market_data::{
    GlobalMetrics, MarketCapEntry, MarketDataError, MarketDataSource, PageMetadata, Quotes,
    TickerPage, UsdQuote,
};

/// Mock market data source that records calls and serves canned pages
#[derive(Debug, Default)]
pub struct MockMarketData {
    calls: Arc<Mutex<Vec<u64>>>,
    pages: Arc<Mutex<HashMap<u64, TickerPage>>>,
    failing_offsets: Arc<Mutex<HashSet<u64>>>,
    global: Arc<Mutex<Option<GlobalMetrics>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve `page` for requests starting at `start`
    pub fn with_page(self, start: u64, page: TickerPage) -> Self {
        self.pages.lock().unwrap().insert(start, page);
        self
    }

    /// Builder method to fail requests starting at `start`
    pub fn with_failing_offset(self, start: u64) -> Self {
        self.failing_offsets.lock().unwrap().insert(start);
        self
    }

    /// Builder method to set the global metrics response
    pub fn with_global(self, total_market_cap_usd: f64) -> Self {
        *self.global.lock().unwrap() = Some(GlobalMetrics {
            total_market_cap_usd,
        });
        self
    }

    /// Get all recorded page offsets, in request order
    pub fn get_calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn ticker_page(&self, start: u64, _limit: u64) -> Result<TickerPage, MarketDataError> {
        self.calls.lock().unwrap().push(start);
        if self.failing_offsets.lock().unwrap().contains(&start) {
            return Err(MarketDataError::HttpError(format!(
                "synthetic failure at offset {}",
                start
            )));
        }
        self.pages
            .lock()
            .unwrap()
            .get(&start)
            .cloned()
            .ok_or_else(|| MarketDataError::MalformedResponse("No page configured".to_string()))
    }

    async fn global_metrics(&self) -> Result<GlobalMetrics, MarketDataError> {
        self.global
            .lock()
            .unwrap()
            .ok_or_else(|| MarketDataError::HttpError("No global metrics configured".to_string()))
    }
}

/// Clock that always reads the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at_unix(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).expect("timestamp in range"))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A ticker entry with just the fields the aggregator reads
pub fn snapshot_entry(
    name: &str,
    symbol: &str,
    slug: &str,
    market_cap: Option<f64>,
    last_updated: u64,
) -> MarketCapEntry {
    MarketCapEntry {
        name: Some(name.to_string()),
        symbol: Some(symbol.to_string()),
        website_slug: Some(slug.to_string()),
        last_updated: Some(last_updated),
        quotes: Quotes {
            usd: Some(UsdQuote {
                market_cap,
                extra: BTreeMap::new(),
            }),
            extra: BTreeMap::new(),
        },
        extra: BTreeMap::new(),
    }
}

/// A ticker page holding `entries` keyed by provider id, reporting `total`
/// tracked assets
pub fn ticker_page(entries: Vec<(&str, MarketCapEntry)>, total: u64) -> TickerPage {
    TickerPage {
        data: entries
            .into_iter()
            .map(|(id, entry)| (id.to_string(), entry))
            .collect(),
        metadata: PageMetadata {
            num_cryptocurrencies: total,
            extra: BTreeMap::new(),
        },
    }
}
