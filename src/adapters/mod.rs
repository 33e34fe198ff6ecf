//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - CoinMarketCap: ticker API client and the on-disk snapshot cache
//! - Registry: loaders for the definition files, firmware source fetch
//! - CLI: command-line interface handlers

pub mod cli;
pub mod coinmarketcap;
pub mod registry;

pub use cli::CliApp;
pub use coinmarketcap::{CoinMarketCapClient, MarketCache};
pub use registry::FirmwareSourceClient;
