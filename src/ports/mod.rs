//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The market data provider (ticker pages, global stats)
//! - Time, so cache freshness and timestamps are deterministic in tests

pub mod clock;
pub mod market_data;
pub mod mocks;

pub use clock::{Clock, SystemClock};
pub use market_data::{
    GlobalMetrics, MarketCapEntry, MarketDataError, MarketDataSource, PageMetadata, Quotes,
    TickerPage, UsdQuote,
};
