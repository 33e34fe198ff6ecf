//! Coin Details Document
//!
//! The merged record shape persisted in `coins_details.json`, plus the
//! default-fill helpers that make repeated runs safe: a field that was set
//! by an earlier run (or by hand) is never overwritten, only absent fields
//! are filled. Unknown keys in records and in the `info` block are carried
//! through the round-trip untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DetailsError {
    #[error("Failed to read details file: {0}")]
    ReadError(String),

    #[error("Failed to write details file: {0}")]
    WriteError(String),

    #[error("Failed to serialize details: {0}")]
    SerializationError(String),

    #[error("Failed to parse details file: {0}")]
    DeserializationError(String),
}

/// Record category stored in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinType {
    Coin,
    Erc20,
    Mosaic,
}

/// One merged coin/token record.
///
/// Every field is optional because records are built up incrementally across
/// runs and hand-curated documents may carry any subset. Fields not modeled
/// here land in `extra` and survive the round-trip verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub coin_type: Option<CoinType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Support status for the first hardware generation. Kept as a free
    /// string (not an enum) so out-of-set values in curated documents reach
    /// the validator instead of failing deserialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1_enabled: Option<String>,

    /// Support status for the second hardware generation, same rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2_enabled: Option<String>,

    /// Chain identifier, ERC20 records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Contract address, ERC20 records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketcap_usd: Option<u64>,

    /// Curated override used to match the record against the market-data
    /// provider's slug when names differ.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinmarketcap_alias: Option<String>,

    /// Visibility flag set by the validator. Persisted as the integer `1`
    /// for compatibility with existing documents; booleans are accepted on
    /// read. Sticky: nothing ever clears it.
    #[serde(
        default,
        skip_serializing_if = "std::ops::Not::not",
        serialize_with = "flag::serialize",
        deserialize_with = "flag::deserialize"
    )]
    pub hidden: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CoinDetail {
    /// The `links` map, created empty on first access.
    pub fn links_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.links.get_or_insert_with(BTreeMap::new)
    }

    /// The `wallet` map, created empty on first access.
    pub fn wallet_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.wallet.get_or_insert_with(BTreeMap::new)
    }

    pub fn homepage(&self) -> Option<&str> {
        self.links.as_ref()?.get("Homepage").map(String::as_str)
    }
}

/// Fill `slot` with `value` only if it is unset; returns the resulting value.
pub fn set_default<T>(slot: &mut Option<T>, value: T) -> &T {
    slot.get_or_insert(value)
}

/// Insert `key` into `map` only if absent; returns the resulting value.
pub fn set_default_entry<'a>(
    map: &'a mut BTreeMap<String, String>,
    key: &str,
    value: &str,
) -> &'a str {
    map.entry(key.to_string())
        .or_insert_with(|| value.to_string())
}

/// The `info` summary block. Extra keys are preserved like on records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at_readable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1_coins: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2_coins: Option<u64>,

    /// Sum of `marketcap_usd` over records enabled on either generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketcap_usd: Option<u64>,

    /// Provider-wide total; left untouched when the stats fetch fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_marketcap_usd: Option<u64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The full persisted document: `coins` keyed by `"<category>:<identifier>"`
/// plus the `info` summary. Loaded in full, mutated in place, written back
/// in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailsDocument {
    #[serde(default)]
    pub coins: BTreeMap<String, CoinDetail>,

    #[serde(default)]
    pub info: InfoSection,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DetailsDocument {
    /// Load the document; a missing file is an empty document, anything else
    /// that goes wrong is an error (a malformed document must never be
    /// silently replaced).
    pub fn load(path: &Path) -> Result<Self, DetailsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("{}: no existing document, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(DetailsError::ReadError(e.to_string())),
        };

        serde_json::from_str(&content).map_err(|e| DetailsError::DeserializationError(e.to_string()))
    }

    /// Write the document, pretty-printed with 4-space indent and all object
    /// keys sorted.
    pub fn save(&self, path: &Path) -> Result<(), DetailsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| DetailsError::WriteError(e.to_string()))?;
            }
        }

        let rendered =
            render_sorted(self).map_err(|e| DetailsError::SerializationError(e.to_string()))?;
        fs::write(path, rendered).map_err(|e| DetailsError::WriteError(e.to_string()))?;

        tracing::info!("{}: wrote {} records", path.display(), self.coins.len());
        Ok(())
    }

    /// Record under `key`, created empty on first access.
    pub fn entry(&mut self, key: &str) -> &mut CoinDetail {
        self.coins.entry(key.to_string()).or_default()
    }
}

/// Pretty-print with sorted keys and 4-space indent (the on-disk format of
/// both the details document and the market snapshot).
pub fn render_sorted<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    // Round-tripping through Value sorts object keys: serde_json's default
    // map representation is ordered.
    let value = serde_json::to_value(value)?;
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

mod flag {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or 0/1 integer")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
                Ok(v != 0)
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}
