//! Document Summary
//!
//! Aggregates computed over the full record set for the `info` block.

use std::collections::BTreeMap;

use crate::domain::details::CoinDetail;
use crate::domain::support::SupportLevel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records enabled on the first generation and not hidden.
    pub t1_coins: u64,
    /// Records enabled on the second generation and not hidden.
    pub t2_coins: u64,
    /// Market cap summed over records enabled on either generation,
    /// hidden or not.
    pub marketcap_usd: u64,
}

pub fn summarize(coins: &BTreeMap<String, CoinDetail>) -> Summary {
    let mut summary = Summary::default();
    let yes = SupportLevel::Yes.as_str();

    for detail in coins.values() {
        let t1 = detail.t1_enabled.as_deref() == Some(yes);
        let t2 = detail.t2_enabled.as_deref() == Some(yes);

        if t1 && !detail.hidden {
            summary.t1_coins += 1;
        }
        if t2 && !detail.hidden {
            summary.t2_coins += 1;
        }
        if t1 || t2 {
            summary.marketcap_usd += detail.marketcap_usd.unwrap_or(0);
        }
    }

    summary
}
