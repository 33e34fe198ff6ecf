//! Aggregation Pipeline
//!
//! Coordinates one full rebuild of the coin details document: load the
//! persisted document, refresh the market snapshot, run the four merge
//! passes, validate, summarize, write. The merge passes are pure functions
//! over the document so they can be exercised without any I/O.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use semver::Version;

use crate::adapters::coinmarketcap::{CoinMarketCapClient, MarketApiConfig, MarketCache};
use crate::adapters::registry::{
    is_enabled_network, load_coin_definitions, load_mosaics, load_support_manifest,
    load_token_definitions, CoinDefinition, FirmwareSourceClient, MosaicDefinition,
    SupportManifest, TokenDefinition,
};
use crate::config::Config;
use crate::domain::details::{
    render_sorted, set_default, set_default_entry, CoinDetail, CoinType, DetailsDocument,
};
use crate::domain::summary::summarize;
use crate::domain::support::{
    parse_version, support_level, t1_token_level, t2_token_level, SupportError, SupportLevel,
};
use crate::domain::validator::{check_detail, hide_incomplete, Issue};
use crate::ports::clock::{Clock, SystemClock};
use crate::ports::market_data::MarketDataSource;

/// Wallet entries attached to every ERC20 record.
pub const MYCRYPTO_URL: &str = "https://mycrypto.com";
pub const MYETHERWALLET_URL: &str = "https://www.myetherwallet.com";

/// Options for a single aggregation run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and print everything but leave the document on disk untouched.
    pub dry_run: bool,
    /// Skip market cap attachment and make no provider requests.
    pub skip_marketcap: bool,
}

struct LegacyChain {
    symbol: &'static str,
    name: &'static str,
    t1: SupportLevel,
    t2: SupportLevel,
    marketcap_slug: &'static str,
}

/// Ethereum-family chains that are not part of the coin definitions but are
/// listed under the `coin2:` prefix with fixed support statuses.
const LEGACY_CHAINS: &[LegacyChain] = &[
    LegacyChain {
        symbol: "ETH",
        name: "Ethereum",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "ethereum",
    },
    LegacyChain {
        symbol: "ETC",
        name: "Ethereum Classic",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "ethereum-classic",
    },
    LegacyChain {
        symbol: "RSK",
        name: "Rootstock",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "rootstock",
    },
    LegacyChain {
        symbol: "EXP",
        name: "Expanse",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "expanse",
    },
    LegacyChain {
        symbol: "UBQ",
        name: "Ubiq",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "ubiq",
    },
    LegacyChain {
        symbol: "ELLA",
        name: "Ellaism",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "ellaism",
    },
    LegacyChain {
        symbol: "EGEM",
        name: "EtherGem",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "egem",
    },
    LegacyChain {
        symbol: "ETSC",
        name: "Ethereum Social",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "etsc",
    },
    LegacyChain {
        symbol: "EOSC",
        name: "EOS Classic",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "eosc",
    },
    LegacyChain {
        symbol: "ESN",
        name: "Ethersocial Network",
        t1: SupportLevel::Yes,
        t2: SupportLevel::Yes,
        marketcap_slug: "esn",
    },
    LegacyChain {
        symbol: "ADA",
        name: "Cardano",
        t1: SupportLevel::No,
        t2: SupportLevel::Soon,
        marketcap_slug: "cardano",
    },
    LegacyChain {
        symbol: "XTZ",
        name: "Tezos",
        t1: SupportLevel::No,
        t2: SupportLevel::Soon,
        marketcap_slug: "tezos",
    },
];

/// Merge the coin definitions and the support manifest into the document.
///
/// Support statuses and the record type are recomputed on every run;
/// descriptive fields are filled only when absent so curated edits survive.
/// Manifest lookups use the definitions map key, output keys use the
/// definition's own shortcut.
pub fn apply_coins(
    doc: &mut DetailsDocument,
    definitions: &BTreeMap<String, CoinDefinition>,
    manifest: &SupportManifest,
    t1_latest: &Version,
    t2_latest: &Version,
    market: Option<&MarketCache>,
) -> Result<(), SupportError> {
    let mut supported = BTreeSet::new();

    for (shortcut, definition) in definitions {
        let t1 = support_level(manifest.t1(shortcut), t1_latest)?;
        let t2 = support_level(manifest.t2(shortcut), t2_latest)?;

        let key = format!("coin:{}", definition.coin_shortcut);
        supported.insert(key.clone());

        let out = doc.entry(&key);
        out.coin_type = Some(CoinType::Coin);
        out.t1_enabled = Some(t1.to_string());
        out.t2_enabled = Some(t2.to_string());
        set_default(&mut out.shortcut, definition.coin_shortcut.clone());
        set_default(&mut out.name, definition.coin_label.clone());

        let links = out.links_mut();
        if let Some(website) = &definition.website {
            set_default_entry(links, "Homepage", website);
        }
        if let Some(github) = &definition.github {
            set_default_entry(links, "Github", github);
        }

        if let Some(market) = market {
            let lookup = definition
                .coinmarketcap_alias
                .clone()
                .unwrap_or_else(|| definition.coin_label.clone());
            market.attach_marketcap(out, &lookup);
        }
    }

    check_unsupported(doc, "coin:", &supported);
    Ok(())
}

/// Merge the ERC20 token definitions into the document.
///
/// Support is a literal substring search for the symbol inside the two
/// firmware source snapshots. Tokens on disabled chains are skipped
/// entirely. The two fixed wallet entries are rewritten on every run;
/// everything else curated is preserved.
pub fn apply_erc20(
    doc: &mut DetailsDocument,
    tokens: &[TokenDefinition],
    t1_source: &str,
    t2_source: &str,
    market: Option<&MarketCache>,
) {
    let mut supported = BTreeSet::new();

    for token in tokens {
        if !is_enabled_network(&token.chain) {
            tracing::info!(
                "Skipping {}, network {} is disabled",
                token.symbol,
                token.chain
            );
            continue;
        }

        let key = format!("erc20:{}:{}", token.chain, token.symbol);
        supported.insert(key.clone());

        let out = doc.entry(&key);
        out.coin_type = Some(CoinType::Erc20);
        out.network = Some(token.chain.clone());
        out.address = Some(token.address.clone());
        out.t1_enabled = Some(t1_token_level(t1_source, &token.symbol).to_string());
        out.t2_enabled = Some(t2_token_level(t2_source, &token.symbol).to_string());
        set_default(&mut out.shortcut, token.symbol.clone());
        set_default(&mut out.name, token.name.clone());

        let wallet = out.wallet_mut();
        wallet.insert("MyCrypto".to_string(), MYCRYPTO_URL.to_string());
        wallet.insert("MyEtherWallet".to_string(), MYETHERWALLET_URL.to_string());

        let links = out.links_mut();
        if let Some(website) = &token.website {
            set_default_entry(links, "Homepage", website);
        }
        if let Some(github) = &token.social.github {
            set_default_entry(links, "Github", github);
        }

        if let Some(market) = market {
            let lookup = out
                .coinmarketcap_alias
                .clone()
                .unwrap_or_else(|| token.symbol.clone());
            market.attach_marketcap(out, &lookup);
        }
    }

    check_unsupported(doc, "erc20:", &supported);
}

/// Merge the fixed table of legacy Ethereum-family chains into the document.
pub fn apply_legacy_chains(doc: &mut DetailsDocument, market: Option<&MarketCache>) {
    let mut supported = BTreeSet::new();

    for chain in LEGACY_CHAINS {
        let key = format!("coin2:{}", chain.symbol);
        supported.insert(key.clone());

        let out = doc.entry(&key);
        out.coin_type = Some(CoinType::Coin);
        set_default(&mut out.shortcut, chain.symbol.to_string());
        set_default(&mut out.name, chain.name.to_string());
        set_default(&mut out.t1_enabled, chain.t1.to_string());
        set_default(&mut out.t2_enabled, chain.t2.to_string());

        if let Some(market) = market {
            market.attach_marketcap(out, chain.marketcap_slug);
        }
    }

    check_unsupported(doc, "coin2:", &supported);
}

/// Merge the mosaic definitions into the document. Tickers are trimmed for
/// both the key and the shortcut; the market lookup prefers a curated alias
/// on the record, then the record's display name.
pub fn apply_mosaics(
    doc: &mut DetailsDocument,
    mosaics: &[MosaicDefinition],
    market: Option<&MarketCache>,
) {
    let mut supported = BTreeSet::new();

    for mosaic in mosaics {
        let ticker = mosaic.ticker.trim();
        let key = format!("mosaic:{}", ticker);
        supported.insert(key.clone());

        let out = doc.entry(&key);
        out.coin_type = Some(CoinType::Mosaic);
        set_default(&mut out.shortcut, ticker.to_string());
        set_default(&mut out.name, mosaic.name.clone());
        set_default(&mut out.t1_enabled, SupportLevel::Yes.to_string());
        set_default(&mut out.t2_enabled, SupportLevel::Yes.to_string());

        if let Some(market) = market {
            let lookup = out
                .coinmarketcap_alias
                .clone()
                .or_else(|| out.name.clone())
                .unwrap_or_else(|| ticker.to_string());
            market.attach_marketcap(out, &lookup);
        }
    }

    check_unsupported(doc, "mosaic:", &supported);
}

/// Recompute the `info` summary section: timestamps from the injected
/// clock, per-generation counts of visible enabled records, and the market
/// cap sum. The global total is written only when the fetch succeeded so a
/// failed fetch leaves the previous value in place.
pub fn apply_info(doc: &mut DetailsDocument, total_marketcap_usd: Option<u64>, clock: &dyn Clock) {
    let now = clock.now();
    doc.info.updated_at = Some(now.timestamp().max(0) as u64);
    doc.info.updated_at_readable = Some(now.format("%a %b %e %H:%M:%S %Y").to_string());

    let summary = summarize(&doc.coins);
    doc.info.t1_coins = Some(summary.t1_coins);
    doc.info.t2_coins = Some(summary.t2_coins);
    doc.info.marketcap_usd = Some(summary.marketcap_usd);

    if let Some(total) = total_marketcap_usd {
        doc.info.total_marketcap_usd = Some(total);
    }
}

/// Log every record under `prefix` that the current upstream pass did not
/// produce. Such records are likely manual entries or stale upstream
/// removals; they are reported, never deleted.
fn check_unsupported(doc: &DetailsDocument, prefix: &str, supported: &BTreeSet<String>) {
    for key in doc.coins.keys() {
        if key.starts_with(prefix) && !supported.contains(key) {
            tracing::warn!("{} not supported by Trezor, possible manual entry", key);
        }
    }
}

/// One full aggregation run over the configured paths, plus the read-only
/// `check` and `show` passes used by the CLI.
pub struct Pipeline {
    config: Config,
    clock: Arc<dyn Clock>,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, for tests.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Run the full pipeline: refresh the market snapshot, merge every
    /// source, validate, summarize, and write the document back.
    pub async fn run(&self, options: &RunOptions) -> Result<()> {
        let details_path = self.config.paths.details_path();
        let mut doc = DetailsDocument::load(&details_path)
            .with_context(|| format!("Failed to load {}", details_path.display()))?;
        tracing::info!(
            "Loaded {} records from {}",
            doc.coins.len(),
            details_path.display()
        );

        let market = if options.skip_marketcap {
            tracing::info!("Skipping market cap updates");
            None
        } else {
            let api = MarketApiConfig::default()
                .with_api_url(&self.config.marketcap.get_api_url())
                .with_timeout(Duration::from_secs(self.config.marketcap.timeout_secs));
            let client =
                CoinMarketCapClient::with_config(api).context("Failed to build market client")?;

            let mut cache = MarketCache::new(
                self.config.paths.marketcap_cache_path(),
                Arc::clone(&self.clock),
            )
            .with_max_age(Duration::from_secs(self.config.marketcap.cache_max_age_secs))
            .with_page_limit(self.config.marketcap.page_limit)
            .with_page_pause(Duration::from_millis(self.config.marketcap.page_pause_ms));
            cache
                .refresh(&client)
                .await
                .context("Market snapshot refresh failed")?;
            Some((cache, client))
        };
        let market_cache = market.as_ref().map(|(cache, _)| cache);

        let definitions = load_coin_definitions(&self.config.paths.coin_definitions_path())?;
        let manifest = load_support_manifest(&self.config.paths.support_manifest_path())?;
        let t1_latest = parse_version(&self.config.firmware.t1_latest)?;
        let t2_latest = parse_version(&self.config.firmware.t2_latest)?;
        apply_coins(
            &mut doc,
            &definitions,
            &manifest,
            &t1_latest,
            &t2_latest,
            market_cache,
        )?;
        tracing::info!("Merged {} coin definitions", definitions.len());

        let tokens = load_token_definitions(&self.config.paths.eth_tokens_path())?;
        let firmware_source = FirmwareSourceClient::new()?;
        let t1_source = firmware_source
            .fetch_t1_tokens(&self.config.firmware.t1_latest)
            .await
            .context("Failed to fetch the T1 firmware token list")?;
        let t2_source = firmware_source
            .fetch_t2_tokens(&self.config.firmware.t2_latest)
            .await
            .context("Failed to fetch the T2 firmware token list")?;
        apply_erc20(&mut doc, &tokens, &t1_source, &t2_source, market_cache);
        tracing::info!("Merged {} token definitions", tokens.len());

        apply_legacy_chains(&mut doc, market_cache);

        let mosaics = load_mosaics(&self.config.paths.mosaics_path())?;
        apply_mosaics(&mut doc, &mosaics, market_cache);
        tracing::info!("Merged {} mosaic definitions", mosaics.len());

        let hidden = hide_incomplete(&mut doc);
        if hidden > 0 {
            tracing::warn!("{} records are hidden", hidden);
        }

        let global = match &market {
            Some((_, client)) => match client.global_metrics().await {
                Ok(metrics) => Some(metrics.total_market_cap_usd as u64),
                Err(e) => {
                    tracing::warn!("Global market stats unavailable: {}", e);
                    None
                }
            },
            None => None,
        };
        apply_info(&mut doc, global, self.clock.as_ref());

        let rendered = render_sorted(&doc.info)?;
        println!("{}", String::from_utf8_lossy(&rendered));

        if options.dry_run {
            tracing::info!("Dry run, not writing {}", details_path.display());
        } else {
            doc.save(&details_path)?;
        }

        Ok(())
    }

    /// Validate the persisted document without modifying it. Returns every
    /// record with at least one issue.
    pub fn check(&self) -> Result<Vec<(String, Vec<Issue>)>> {
        let details_path = self.config.paths.details_path();
        let doc = DetailsDocument::load(&details_path)
            .with_context(|| format!("Failed to load {}", details_path.display()))?;

        let mut findings = Vec::new();
        for (key, detail) in &doc.coins {
            let issues = check_detail(detail);
            if !issues.is_empty() {
                findings.push((key.clone(), issues));
            }
        }
        Ok(findings)
    }

    /// Render every record matching one of the keywords (all records when no
    /// keyword is given) as pretty JSON.
    pub fn show(&self, keywords: &[String]) -> Result<String> {
        let details_path = self.config.paths.details_path();
        let doc = DetailsDocument::load(&details_path)
            .with_context(|| format!("Failed to load {}", details_path.display()))?;

        let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let mut rendered = String::new();
        for (key, detail) in &doc.coins {
            if !needles.is_empty() && !matches_keywords(key, detail, &needles) {
                continue;
            }
            rendered.push_str(&format!(
                "{}:\n{}\n\n",
                key,
                String::from_utf8_lossy(&render_sorted(detail)?)
            ));
        }
        Ok(rendered)
    }
}

fn matches_keywords(key: &str, detail: &CoinDetail, needles: &[String]) -> bool {
    needles.iter().any(|needle| {
        key.to_lowercase().contains(needle)
            || detail
                .name
                .as_deref()
                .map_or(false, |name| name.to_lowercase().contains(needle))
            || detail
                .shortcut
                .as_deref()
                .map_or(false, |shortcut| shortcut.to_lowercase().contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{snapshot_entry, FixedClock};

    const LAST_UPDATED: u64 = 1_535_000_000;

    fn market_fixture() -> MarketCache {
        let mut entries = BTreeMap::new();
        entries.insert(
            "1".to_string(),
            snapshot_entry("Bitcoin", "BTC", "bitcoin", Some(111e9), LAST_UPDATED),
        );
        entries.insert(
            "2".to_string(),
            snapshot_entry("Ethereum", "ETH", "ethereum", Some(55e9), LAST_UPDATED),
        );
        entries.insert(
            "3".to_string(),
            snapshot_entry("NEM", "XEM", "nem", Some(9e8), LAST_UPDATED),
        );
        MarketCache::from_entries(entries)
    }

    fn coin_def(label: &str, shortcut: &str) -> CoinDefinition {
        CoinDefinition {
            coin_label: label.to_string(),
            coin_shortcut: shortcut.to_string(),
            website: Some(format!("https://{}.org", label.to_lowercase())),
            github: Some(format!("https://github.com/{}", label.to_lowercase())),
            coinmarketcap_alias: None,
        }
    }

    fn token_def(chain: &str, symbol: &str, name: &str) -> TokenDefinition {
        TokenDefinition {
            chain: chain.to_string(),
            address: "0x89d24a6b4ccb1b6faa2625fe562bdd9a23260359".to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            website: Some(format!("https://{}.io", name.to_lowercase())),
            social: Default::default(),
        }
    }

    fn latest() -> (Version, Version) {
        (Version::new(1, 6, 2), Version::new(2, 0, 7))
    }

    #[test]
    fn test_apply_coins_computes_support_and_attaches_marketcap() {
        let mut doc = DetailsDocument::default();
        let mut definitions = BTreeMap::new();
        definitions.insert("BTC".to_string(), coin_def("Bitcoin", "BTC"));

        let mut manifest = SupportManifest::default();
        manifest.trezor1.insert("BTC".to_string(), "1.5.2".to_string());
        manifest.trezor2.insert("BTC".to_string(), "2.0.8".to_string());

        let market = market_fixture();
        let (t1, t2) = latest();
        apply_coins(&mut doc, &definitions, &manifest, &t1, &t2, Some(&market)).unwrap();

        let btc = &doc.coins["coin:BTC"];
        assert_eq!(btc.coin_type, Some(CoinType::Coin));
        assert_eq!(btc.t1_enabled.as_deref(), Some("yes"));
        assert_eq!(btc.t2_enabled.as_deref(), Some("soon"));
        assert_eq!(btc.shortcut.as_deref(), Some("BTC"));
        assert_eq!(btc.name.as_deref(), Some("Bitcoin"));
        assert_eq!(btc.homepage(), Some("https://bitcoin.org"));
        assert_eq!(btc.marketcap_usd, Some(111e9 as u64));
    }

    #[test]
    fn test_apply_coins_absent_from_manifest_is_no() {
        let mut doc = DetailsDocument::default();
        let mut definitions = BTreeMap::new();
        definitions.insert("BTC".to_string(), coin_def("Bitcoin", "BTC"));

        let (t1, t2) = latest();
        apply_coins(
            &mut doc,
            &definitions,
            &SupportManifest::default(),
            &t1,
            &t2,
            None,
        )
        .unwrap();

        let btc = &doc.coins["coin:BTC"];
        assert_eq!(btc.t1_enabled.as_deref(), Some("no"));
        assert_eq!(btc.t2_enabled.as_deref(), Some("no"));
        assert_eq!(btc.marketcap_usd, None);
    }

    #[test]
    fn test_apply_coins_preserves_curated_fields() {
        let mut doc = DetailsDocument::default();
        let curated = doc.entry("coin:BTC");
        curated.name = Some("Bitcoin Original".to_string());
        curated
            .links_mut()
            .insert("Homepage".to_string(), "https://custom.example".to_string());
        curated.t1_enabled = Some("planned".to_string());

        let mut definitions = BTreeMap::new();
        definitions.insert("BTC".to_string(), coin_def("Bitcoin", "BTC"));
        let (t1, t2) = latest();
        apply_coins(
            &mut doc,
            &definitions,
            &SupportManifest::default(),
            &t1,
            &t2,
            None,
        )
        .unwrap();

        let btc = &doc.coins["coin:BTC"];
        assert_eq!(btc.name.as_deref(), Some("Bitcoin Original"));
        assert_eq!(btc.homepage(), Some("https://custom.example"));
        // Support status is recomputed, never curated.
        assert_eq!(btc.t1_enabled.as_deref(), Some("no"));
    }

    #[test]
    fn test_apply_coins_rejects_unknown_manifest_literal() {
        let mut doc = DetailsDocument::default();
        let mut definitions = BTreeMap::new();
        definitions.insert("BTC".to_string(), coin_def("Bitcoin", "BTC"));

        let mut manifest = SupportManifest::default();
        manifest.trezor1.insert("BTC".to_string(), "yes".to_string());

        let (t1, t2) = latest();
        let result = apply_coins(&mut doc, &definitions, &manifest, &t1, &t2, None);
        assert!(matches!(result, Err(SupportError::BadVersion(_))));
    }

    #[test]
    fn test_apply_coins_keeps_stale_records() {
        let mut doc = DetailsDocument::default();
        doc.entry("coin:OLD").name = Some("Removed Coin".to_string());

        let (t1, t2) = latest();
        apply_coins(
            &mut doc,
            &BTreeMap::new(),
            &SupportManifest::default(),
            &t1,
            &t2,
            None,
        )
        .unwrap();

        assert_eq!(doc.coins["coin:OLD"].name.as_deref(), Some("Removed Coin"));
    }

    #[test]
    fn test_apply_coins_uses_marketcap_alias() {
        let mut doc = DetailsDocument::default();
        let mut def = coin_def("Bitcoin Cash", "BCH");
        def.coinmarketcap_alias = Some("Bitcoin".to_string());
        let mut definitions = BTreeMap::new();
        definitions.insert("BCH".to_string(), def);

        let market = market_fixture();
        let (t1, t2) = latest();
        apply_coins(
            &mut doc,
            &definitions,
            &SupportManifest::default(),
            &t1,
            &t2,
            Some(&market),
        )
        .unwrap();

        assert_eq!(doc.coins["coin:BCH"].marketcap_usd, Some(111e9 as u64));
    }

    #[test]
    fn test_apply_erc20_skips_disabled_chains() {
        let mut doc = DetailsDocument::default();
        let tokens = vec![
            token_def("eth", "GNT", "Golem"),
            token_def("gor", "TST", "Test Token"),
        ];

        apply_erc20(&mut doc, &tokens, "", "", None);

        assert!(doc.coins.contains_key("erc20:eth:GNT"));
        assert!(!doc.coins.contains_key("erc20:gor:TST"));
    }

    #[test]
    fn test_apply_erc20_support_from_firmware_sources() {
        let mut doc = DetailsDocument::default();
        let tokens = vec![
            token_def("eth", "GNT", "Golem"),
            token_def("eth", "REP", "Augur"),
        ];
        let t1_source = r#"{" GNT", "Golem"},"#;
        let t2_source = "TOKENS = [('GNT', 18)]";

        apply_erc20(&mut doc, &tokens, t1_source, t2_source, None);

        let gnt = &doc.coins["erc20:eth:GNT"];
        assert_eq!(gnt.t1_enabled.as_deref(), Some("yes"));
        assert_eq!(gnt.t2_enabled.as_deref(), Some("yes"));
        assert_eq!(gnt.network.as_deref(), Some("eth"));
        assert_eq!(
            gnt.address.as_deref(),
            Some("0x89d24a6b4ccb1b6faa2625fe562bdd9a23260359")
        );

        let rep = &doc.coins["erc20:eth:REP"];
        assert_eq!(rep.t1_enabled.as_deref(), Some("soon"));
        assert_eq!(rep.t2_enabled.as_deref(), Some("soon"));
    }

    #[test]
    fn test_apply_erc20_rewrites_fixed_wallets_only() {
        let mut doc = DetailsDocument::default();
        let curated = doc.entry("erc20:eth:GNT");
        curated
            .wallet_mut()
            .insert("MyCrypto".to_string(), "https://stale.example".to_string());
        curated
            .wallet_mut()
            .insert("Trezor".to_string(), "https://wallet.trezor.io".to_string());
        curated
            .links_mut()
            .insert("Homepage".to_string(), "https://curated.example".to_string());

        let tokens = vec![token_def("eth", "GNT", "Golem")];
        apply_erc20(&mut doc, &tokens, "", "", None);

        let gnt = &doc.coins["erc20:eth:GNT"];
        let wallet = gnt.wallet.as_ref().unwrap();
        assert_eq!(wallet["MyCrypto"], MYCRYPTO_URL);
        assert_eq!(wallet["MyEtherWallet"], MYETHERWALLET_URL);
        assert_eq!(wallet["Trezor"], "https://wallet.trezor.io");
        assert_eq!(gnt.homepage(), Some("https://curated.example"));
    }

    #[test]
    fn test_apply_legacy_chains_table() {
        let mut doc = DetailsDocument::default();
        apply_legacy_chains(&mut doc, None);

        assert_eq!(doc.coins.len(), 12);

        let eth = &doc.coins["coin2:ETH"];
        assert_eq!(eth.name.as_deref(), Some("Ethereum"));
        assert_eq!(eth.t1_enabled.as_deref(), Some("yes"));
        assert_eq!(eth.t2_enabled.as_deref(), Some("yes"));

        let ada = &doc.coins["coin2:ADA"];
        assert_eq!(ada.t1_enabled.as_deref(), Some("no"));
        assert_eq!(ada.t2_enabled.as_deref(), Some("soon"));
        let xtz = &doc.coins["coin2:XTZ"];
        assert_eq!(xtz.t1_enabled.as_deref(), Some("no"));
        assert_eq!(xtz.t2_enabled.as_deref(), Some("soon"));
    }

    #[test]
    fn test_apply_legacy_chains_attaches_marketcap() {
        let mut doc = DetailsDocument::default();
        let market = market_fixture();
        apply_legacy_chains(&mut doc, Some(&market));

        assert_eq!(doc.coins["coin2:ETH"].marketcap_usd, Some(55e9 as u64));
        assert_eq!(doc.coins["coin2:ADA"].marketcap_usd, None);
    }

    #[test]
    fn test_apply_mosaics_trims_ticker_and_looks_up_by_name() {
        let mut doc = DetailsDocument::default();
        let mosaics = vec![MosaicDefinition {
            name: "NEM".to_string(),
            ticker: " XEM".to_string(),
        }];
        let market = market_fixture();

        apply_mosaics(&mut doc, &mosaics, Some(&market));

        let xem = &doc.coins["mosaic:XEM"];
        assert_eq!(xem.coin_type, Some(CoinType::Mosaic));
        assert_eq!(xem.shortcut.as_deref(), Some("XEM"));
        assert_eq!(xem.t1_enabled.as_deref(), Some("yes"));
        assert_eq!(xem.t2_enabled.as_deref(), Some("yes"));
        assert_eq!(xem.marketcap_usd, Some(9e8 as u64));
    }

    #[test]
    fn test_apply_mosaics_prefers_record_alias() {
        let mut doc = DetailsDocument::default();
        doc.entry("mosaic:XEM").coinmarketcap_alias = Some("Ethereum".to_string());
        let mosaics = vec![MosaicDefinition {
            name: "NEM".to_string(),
            ticker: "XEM".to_string(),
        }];
        let market = market_fixture();

        apply_mosaics(&mut doc, &mosaics, Some(&market));

        assert_eq!(doc.coins["mosaic:XEM"].marketcap_usd, Some(55e9 as u64));
    }

    #[test]
    fn test_apply_info_sets_timestamps_and_counts() {
        let mut doc = DetailsDocument::default();
        let visible = doc.entry("coin:BTC");
        visible.t1_enabled = Some("yes".to_string());
        visible.t2_enabled = Some("no".to_string());
        visible.marketcap_usd = Some(100);
        let hidden = doc.entry("coin:XYZ");
        hidden.t1_enabled = Some("yes".to_string());
        hidden.t2_enabled = Some("yes".to_string());
        hidden.marketcap_usd = Some(50);
        hidden.hidden = true;

        let clock = FixedClock::at_unix(1_535_000_000);
        apply_info(&mut doc, Some(42), &clock);

        assert_eq!(doc.info.updated_at, Some(1_535_000_000));
        assert_eq!(
            doc.info.updated_at_readable.as_deref(),
            Some("Thu Aug 23 04:53:20 2018")
        );
        // Hidden records are excluded from the counts but not from the sum.
        assert_eq!(doc.info.t1_coins, Some(1));
        assert_eq!(doc.info.t2_coins, Some(0));
        assert_eq!(doc.info.marketcap_usd, Some(150));
        assert_eq!(doc.info.total_marketcap_usd, Some(42));
    }

    #[test]
    fn test_apply_info_keeps_previous_global_total_on_failure() {
        let mut doc = DetailsDocument::default();
        doc.info.total_marketcap_usd = Some(7);

        let clock = FixedClock::at_unix(1_535_000_000);
        apply_info(&mut doc, None, &clock);

        assert_eq!(doc.info.total_marketcap_usd, Some(7));
    }

    #[test]
    fn test_matches_keywords() {
        let mut detail = CoinDetail::default();
        detail.name = Some("Bitcoin".to_string());
        detail.shortcut = Some("BTC".to_string());

        assert!(matches_keywords("coin:BTC", &detail, &["bitcoin".to_string()]));
        assert!(matches_keywords("coin:BTC", &detail, &["btc".to_string()]));
        assert!(!matches_keywords("coin:BTC", &detail, &["doge".to_string()]));
    }
}
