//! Domain Layer - Core logic for the coin details aggregator
//!
//! Pure types and functions with no I/O. All external interactions happen
//! through the ports layer.
//!
//! - `details`: the merged record model and its persisted document
//! - `support`: firmware support level computation
//! - `validator`: completeness checks and the hide pass
//! - `summary`: aggregates for the document's `info` block

pub mod details;
pub mod support;
pub mod summary;
pub mod validator;

pub use details::{
    render_sorted, set_default, set_default_entry, CoinDetail, CoinType, DetailsDocument,
    DetailsError, InfoSection,
};
pub use summary::{summarize, Summary};
pub use support::{
    parse_version, support_level, t1_token_level, t2_token_level, SupportError, SupportLevel,
    SUPPORT_LEVELS,
};
pub use validator::{check_detail, hide_incomplete, Issue, TREZOR_WALLET_URL};
