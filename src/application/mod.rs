pub mod pipeline;

pub use pipeline::{
    apply_coins, apply_erc20, apply_info, apply_legacy_chains, apply_mosaics, Pipeline,
    RunOptions, MYCRYPTO_URL, MYETHERWALLET_URL,
};
