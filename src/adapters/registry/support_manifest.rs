//! Loader for the firmware support manifest: per device generation, a map
//! from coin shortcut to either a firmware version string or one of the
//! literal statuses `soon` and `planned`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::adapters::registry::RegistryError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SupportManifest {
    #[serde(default)]
    pub trezor1: BTreeMap<String, String>,

    #[serde(default)]
    pub trezor2: BTreeMap<String, String>,
}

impl SupportManifest {
    pub fn t1(&self, shortcut: &str) -> Option<&str> {
        self.trezor1.get(shortcut).map(String::as_str)
    }

    pub fn t2(&self, shortcut: &str) -> Option<&str> {
        self.trezor2.get(shortcut).map(String::as_str)
    }
}

/// Load the manifest; a missing file means nothing is supported.
pub fn load_support_manifest(path: &Path) -> Result<SupportManifest, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{}: no support manifest found", path.display());
            return Ok(SupportManifest::default());
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
