//! Loader for the curated coin definitions file: one JSON object mapping a
//! coin's shortcut to its metadata.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::adapters::registry::RegistryError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinDefinition {
    /// Display name, also the default market-data lookup name.
    pub coin_label: String,

    pub coin_shortcut: String,

    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub github: Option<String>,

    /// Curated market-data slug for coins whose label does not match the
    /// provider's naming.
    #[serde(default)]
    pub coinmarketcap_alias: Option<String>,
}

/// Load the definitions file; a missing file is an empty set.
pub fn load_coin_definitions(
    path: &Path,
) -> Result<BTreeMap<String, CoinDefinition>, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{}: no coin definitions found", path.display());
            return Ok(BTreeMap::new());
        }
        Err(e) => {
            return Err(RegistryError::ReadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content).map_err(|e| RegistryError::ParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
