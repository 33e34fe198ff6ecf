//! Coindex - Coin and Token Support Metadata Aggregator Library
//!
//! Builds a single merged JSON document describing every coin, ERC20 token,
//! and mosaic supported by the two hardware generations, annotated with
//! firmware support status and market capitalization.
//!
//! # Modules
//!
//! - `domain`: Document model, support level rules, validator, summary
//! - `ports`: Trait abstractions (MarketDataSource, Clock) and test mocks
//! - `adapters`: External implementations (CoinMarketCap, registries, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: The aggregation pipeline

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
