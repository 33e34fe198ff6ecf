//! Registry adapter: loaders for the definition files the aggregator merges
//! from, plus the firmware source fetch behind the token support check.
//!
//! - `coin_defs`: curated first-class coin definitions
//! - `support_manifest`: per-generation firmware support manifest
//! - `eth_tokens`: ERC20 token definition tree
//! - `mosaics`: NEM mosaic definitions
//! - `firmware_source`: published firmware sources, fetched by release tag

pub mod coin_defs;
pub mod eth_tokens;
pub mod firmware_source;
pub mod mosaics;
pub mod support_manifest;

pub use coin_defs::{load_coin_definitions, CoinDefinition};
pub use eth_tokens::{
    is_enabled_network, load_token_definitions, SocialLinks, TokenDefinition, ETHEREUM_NETWORKS,
};
pub use firmware_source::FirmwareSourceClient;
pub use mosaics::{load_mosaics, MosaicDefinition};
pub use support_manifest::{load_support_manifest, SupportManifest};

use thiserror::Error;

/// Registry error type
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("Failed to read {path}: {reason}")]
    ReadError { path: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: String, reason: String },

    #[error("HTTP request error: {0}")]
    HttpError(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        RegistryError::HttpError(e.to_string())
    }
}
