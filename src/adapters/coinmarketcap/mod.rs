//! CoinMarketCap adapter: the v2 ticker client and the on-disk snapshot
//! cache built on top of it.

pub mod cache;
pub mod client;

pub use cache::{CacheError, MarketCache};
pub use client::{CoinMarketCapClient, MarketApiConfig};
