//! Record Completeness Validation
//!
//! Screens merged records for the details a published entry must carry and
//! hides the ones that fall short. Hiding is one-way: the flag stays set
//! until someone clears it by hand, even after the underlying data is fixed.

use std::fmt;

use crate::domain::details::{CoinDetail, DetailsDocument};
use crate::domain::support::SupportLevel;

/// The only accepted URL for the vendor wallet entry.
pub const TREZOR_WALLET_URL: &str = "https://wallet.trezor.io";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingLinks,
    MissingHomepage,
    UnknownT1Status(String),
    UnknownT2Status(String),
    StrangeWalletUrl(String),
    MissingWallet,
}

impl Issue {
    /// Whether this issue hides the record. An empty wallet map is only
    /// worth a warning.
    pub fn hides(&self) -> bool {
        !matches!(self, Issue::MissingWallet)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingLinks => write!(f, "missing links"),
            Issue::MissingHomepage => write!(f, "missing homepage"),
            Issue::UnknownT1Status(value) => write!(f, "unknown t1_enabled value '{}'", value),
            Issue::UnknownT2Status(value) => write!(f, "unknown t2_enabled value '{}'", value),
            Issue::StrangeWalletUrl(url) => write!(f, "strange URL for Trezor wallet: {}", url),
            Issue::MissingWallet => write!(f, "missing wallet"),
        }
    }
}

/// All issues found on a single record, in check order.
pub fn check_detail(detail: &CoinDetail) -> Vec<Issue> {
    let mut issues = Vec::new();

    if detail.links.is_none() {
        issues.push(Issue::MissingLinks);
    }
    if detail.homepage().is_none() {
        issues.push(Issue::MissingHomepage);
    }

    match detail.t1_enabled.as_deref() {
        Some(value) if SupportLevel::is_valid(value) => {}
        Some(value) => issues.push(Issue::UnknownT1Status(value.to_string())),
        None => issues.push(Issue::UnknownT1Status("(unset)".to_string())),
    }
    match detail.t2_enabled.as_deref() {
        Some(value) if SupportLevel::is_valid(value) => {}
        Some(value) => issues.push(Issue::UnknownT2Status(value.to_string())),
        None => issues.push(Issue::UnknownT2Status("(unset)".to_string())),
    }

    match &detail.wallet {
        Some(wallet) if wallet.is_empty() => issues.push(Issue::MissingWallet),
        Some(wallet) => {
            if let Some(url) = wallet.get("Trezor") {
                if url != TREZOR_WALLET_URL {
                    issues.push(Issue::StrangeWalletUrl(url.clone()));
                }
            }
        }
        None => issues.push(Issue::MissingWallet),
    }

    issues
}

/// Screen every record, hide the incomplete ones, and log the full list of
/// hidden keys at the end. Returns the number of records hidden after the
/// pass.
pub fn hide_incomplete(doc: &mut DetailsDocument) -> usize {
    for (key, detail) in doc.coins.iter_mut() {
        let issues = check_detail(detail);
        let mut hide = false;

        for issue in &issues {
            if issue.hides() {
                tracing::warn!("{}: {}", key, issue);
                hide = true;
            } else {
                tracing::warn!("{}: {} (warning only)", key, issue);
            }
        }

        if hide && !detail.hidden {
            tracing::warn!("{}: hiding coin", key);
            detail.hidden = true;
        }
        if !hide && detail.hidden {
            tracing::info!("{}: details are complete, but coin is still hidden", key);
        }
    }

    let mut hidden = 0;
    for (key, detail) in &doc.coins {
        if detail.hidden {
            tracing::info!("{}: coin is hidden", key);
            hidden += 1;
        }
    }
    hidden
}
