//! Coindex - Coin and Token Support Metadata Aggregator
//!
//! Merges coin, token, and mosaic definitions with firmware support status
//! and market capitalization data into one curated JSON document.

use anyhow::Result;

use coindex::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (environment overrides go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
