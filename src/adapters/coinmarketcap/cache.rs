//! Market Snapshot Cache
//!
//! Full dump of the provider's ticker feed, kept on disk and reused while
//! fresh. Refreshing walks the paginated feed; a page that fails is logged
//! and stepped over, so one bad page costs at most its entries.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::details::{render_sorted, CoinDetail};
use crate::ports::clock::{Clock, SystemClock};
use crate::ports::market_data::{MarketCapEntry, MarketDataSource};

const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);
const DEFAULT_PAGE_LIMIT: u64 = 100;
const DEFAULT_PAGE_PAUSE: Duration = Duration::from_secs(1);

#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Failed to read market snapshot: {0}")]
    ReadError(String),

    #[error("Failed to write market snapshot: {0}")]
    WriteError(String),

    #[error("Failed to parse market snapshot: {0}")]
    ParseError(String),

    #[error("Failed to serialize market snapshot: {0}")]
    SerializationError(String),
}

/// On-disk cache of the provider's full ticker feed, keyed by asset id.
pub struct MarketCache {
    path: PathBuf,
    max_age: Duration,
    page_limit: u64,
    page_pause: Duration,
    clock: Arc<dyn Clock>,
    snapshot: BTreeMap<String, MarketCapEntry>,
}

impl MarketCache {
    pub fn new(path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            path,
            max_age: DEFAULT_MAX_AGE,
            page_limit: DEFAULT_PAGE_LIMIT,
            page_pause: DEFAULT_PAGE_PAUSE,
            clock,
            snapshot: BTreeMap::new(),
        }
    }

    /// Cache prefilled with `entries`, for offline use.
    pub fn from_entries(entries: BTreeMap<String, MarketCapEntry>) -> Self {
        let mut cache = Self::new(PathBuf::new(), Arc::new(SystemClock));
        cache.snapshot = entries;
        cache
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_page_limit(mut self, page_limit: u64) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn with_page_pause(mut self, page_pause: Duration) -> Self {
        self.page_pause = page_pause;
        self
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Reuse the on-disk snapshot if it is fresh, otherwise walk the feed
    /// and persist what was fetched. An empty fetch keeps whatever snapshot
    /// was already loaded.
    pub async fn refresh(&mut self, source: &dyn MarketDataSource) -> Result<(), CacheError> {
        if self.load_local()? {
            tracing::info!("Using cached market data, {} entries", self.snapshot.len());
            return Ok(());
        }

        let fetched = self.fetch_all(source).await;
        if fetched.is_empty() {
            tracing::warn!(
                "Market data refresh came back empty, keeping previous snapshot ({} entries)",
                self.snapshot.len()
            );
            return Ok(());
        }

        self.snapshot = fetched;
        self.persist()
    }

    /// Entry whose provider slug matches `name` (lowercased, spaces to
    /// hyphens).
    pub fn lookup(&self, name: &str) -> Option<&MarketCapEntry> {
        let slug = normalize_slug(name);
        self.snapshot
            .values()
            .find(|entry| entry.website_slug.as_deref() == Some(slug.as_str()))
    }

    /// Stamp the record's market cap from the snapshot. A record the
    /// provider does not track, or tracks without a cap figure, is left
    /// untouched.
    pub fn attach_marketcap(&self, detail: &mut CoinDetail, name: &str) {
        match self.lookup(name) {
            Some(entry) => {
                if let Some(cap) = entry.market_cap_usd() {
                    detail.marketcap_usd = Some(cap);
                }
            }
            None => tracing::debug!("No market entry for '{}'", name),
        }
    }

    /// Load the on-disk snapshot; returns whether it is fresh enough to
    /// reuse. A stale snapshot still stays loaded as a fallback.
    fn load_local(&mut self) -> Result<bool, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(CacheError::ReadError(e.to_string())),
        };

        self.snapshot =
            serde_json::from_str(&content).map_err(|e| CacheError::ParseError(e.to_string()))?;
        Ok(self.is_fresh())
    }

    fn is_fresh(&self) -> bool {
        let newest = self
            .snapshot
            .values()
            .filter_map(|entry| entry.last_updated)
            .max();
        match newest {
            Some(timestamp) => timestamp + self.max_age.as_secs() > self.clock.unix_now(),
            None => false,
        }
    }

    async fn fetch_all(&self, source: &dyn MarketDataSource) -> BTreeMap<String, MarketCapEntry> {
        let mut fetched = BTreeMap::new();
        let mut start = 0u64;
        let mut total: Option<u64> = None;

        loop {
            match source.ticker_page(start, self.page_limit).await {
                Ok(page) => {
                    let total_assets = *total.get_or_insert(page.metadata.num_cryptocurrencies);
                    fetched.extend(page.data);
                    tracing::info!("Fetched {} of {} coins", fetched.len(), total_assets);
                    start += self.page_limit;
                }
                Err(e) => {
                    tracing::warn!("Ticker page at offset {} failed: {}", start, e);
                    if total.is_none() {
                        // Feed size unknown, nothing to step over.
                        break;
                    }
                    start += self.page_limit;
                }
            }

            match total {
                Some(total_assets) if start >= total_assets => break,
                _ => {}
            }

            tokio::time::sleep(self.page_pause).await;
        }

        fetched
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CacheError::WriteError(e.to_string()))?;
            }
        }

        let rendered = render_sorted(&self.snapshot)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;
        fs::write(&self.path, rendered).map_err(|e| CacheError::WriteError(e.to_string()))?;

        tracing::info!(
            "{}: cached {} market entries",
            self.path.display(),
            self.snapshot.len()
        );
        Ok(())
    }
}

fn normalize_slug(name: &str) -> String {
    name.replace(' ', "-").to_lowercase()
}
