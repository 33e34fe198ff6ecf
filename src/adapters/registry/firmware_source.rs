//! Fetches published firmware sources by release tag. The token tables in
//! those sources are what decides whether an ERC20 token is already live on
//! a device.

use std::time::Duration;

use reqwest::Client;

use crate::adapters::registry::RegistryError;

const T1_REPO_RAW: &str = "https://raw.githubusercontent.com/trezor/trezor-mcu";
const T2_REPO_RAW: &str = "https://raw.githubusercontent.com/trezor/trezor-core";

#[derive(Debug, Clone)]
pub struct FirmwareSourceClient {
    http: Client,
}

impl FirmwareSourceClient {
    pub fn new() -> Result<Self, RegistryError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http })
    }

    pub fn t1_tokens_url(version: &str) -> String {
        format!("{}/v{}/firmware/ethereum_tokens.c", T1_REPO_RAW, version)
    }

    pub fn t2_tokens_url(version: &str) -> String {
        format!("{}/v{}/src/apps/ethereum/tokens.py", T2_REPO_RAW, version)
    }

    /// Token table of the first-generation firmware released as `version`.
    pub async fn fetch_t1_tokens(&self, version: &str) -> Result<String, RegistryError> {
        self.fetch_text(&Self::t1_tokens_url(version)).await
    }

    /// Token table of the second-generation firmware released as `version`.
    pub async fn fetch_t2_tokens(&self, version: &str) -> Result<String, RegistryError> {
        self.fetch_text(&Self::t2_tokens_url(version)).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, RegistryError> {
        // A 404 here would quietly read as "no token is listed", so bad
        // statuses must fail loudly.
        let text = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}
