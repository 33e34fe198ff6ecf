//! Loader for the NEM mosaic definitions file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::adapters::registry::RegistryError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MosaicDefinition {
    pub name: String,

    /// May carry decorative whitespace upstream; trimmed at merge time.
    pub ticker: String,
}

/// Load the mosaic list; a missing file is an empty set.
pub fn load_mosaics(path: &Path) -> Result<Vec<MosaicDefinition>, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{}: no mosaic definitions found", path.display());
            return Ok(Vec::new());
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
