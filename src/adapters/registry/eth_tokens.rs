//! Loader for the ERC20 token definition tree: one directory per chain,
//! one JSON file per token.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::adapters::registry::RegistryError;

/// Chains tokens are accepted from, with their chain ids. Tokens from any
/// other directory are skipped at merge time.
pub const ETHEREUM_NETWORKS: &[(&str, u64)] = &[
    ("ella", 64),
    ("etc", 61),
    ("eth", 1),
    ("kov", 42),
    ("rin", 4),
    ("rop", 3),
    ("ubq", 8),
];

pub fn is_enabled_network(chain: &str) -> bool {
    ETHEREUM_NETWORKS.iter().any(|(name, _)| *name == chain)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenDefinition {
    /// Chain directory the definition came from; not part of the JSON.
    #[serde(skip)]
    pub chain: String,

    pub address: String,
    pub name: String,
    pub symbol: String,

    /// Empty strings in the upstream data are normalized to `None`.
    #[serde(default)]
    pub website: Option<String>,

    #[serde(default)]
    pub social: SocialLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub github: Option<String>,
}

/// Load every token definition under `dir`, sorted by chain and symbol.
/// A missing directory is an empty set; a malformed definition file is an
/// error.
pub fn load_token_definitions(dir: &Path) -> Result<Vec<TokenDefinition>, RegistryError> {
    let chains = match fs::read_dir(dir) {
        Ok(chains) => chains,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{}: no token definitions found", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(RegistryError::ReadError {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mut tokens = Vec::new();
    for chain_dir in chains {
        let chain_dir = chain_dir.map_err(|e| RegistryError::ReadError {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        if !chain_dir.path().is_dir() {
            continue;
        }
        let chain = chain_dir.file_name().to_string_lossy().to_string();

        let files = fs::read_dir(chain_dir.path()).map_err(|e| RegistryError::ReadError {
            path: chain_dir.path().display().to_string(),
            reason: e.to_string(),
        })?;
        for file in files {
            let file = file.map_err(|e| RegistryError::ReadError {
                path: chain_dir.path().display().to_string(),
                reason: e.to_string(),
            })?;
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            tokens.push(load_token(&path, &chain)?);
        }
    }

    tokens.sort_by(|a, b| {
        (a.chain.as_str(), a.symbol.to_uppercase()).cmp(&(b.chain.as_str(), b.symbol.to_uppercase()))
    });
    Ok(tokens)
}

fn load_token(path: &Path, chain: &str) -> Result<TokenDefinition, RegistryError> {
    let content = fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut token: TokenDefinition =
        serde_json::from_str(&content).map_err(|e| RegistryError::ParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    token.chain = chain.to_string();
    if matches!(token.website.as_deref(), Some(w) if w.trim().is_empty()) {
        token.website = None;
    }
    if matches!(token.social.github.as_deref(), Some(g) if g.trim().is_empty()) {
        token.social.github = None;
    }
    Ok(token)
}
