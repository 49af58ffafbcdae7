//! CoinGecko category provider
//!
//! Fetches the coins belonging to a named CoinGecko category via the public
//! /coins/markets endpoint, one network call per category. Symbols are
//! normalized to uppercase so they match exchange base currencies.
//!
//! The provider seam is the `CategoryProvider` trait; tests plug in static
//! fakes, the mockito tests below exercise the real HTTP path.
//!
//! Example category listing:
//! ```sh
//! curl -X GET "https://api.coingecko.com/api/v3/coins/categories/list" -H "accept: application/json"
//! ```
//!
//! Author: AI-Generated
//! Created: 2026-07-31

use crate::error::ProviderError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

/// Public CoinGecko API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Markets page size (CoinGecko maximum)
const PER_PAGE: &str = "250";

/// One row of the /coins/markets response. Only the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMarket {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
}

/// One row of the /coins/categories/list response.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryListing {
    pub category_id: String,
    pub name: String,
}

/// Market-data collaborator supplying category membership.
#[async_trait]
pub trait CategoryProvider: Send + Sync {
    /// Markets belonging to `category`, priced in `vs_currency`.
    async fn markets_by_category(
        &self,
        vs_currency: &str,
        category: &str,
    ) -> Result<Vec<CategoryMarket>, ProviderError>;

    /// Symbols belonging to `category`, normalized to uppercase.
    async fn fetch_category(
        &self,
        vs_currency: &str,
        category: &str,
    ) -> Result<HashSet<String>, ProviderError> {
        let markets = self.markets_by_category(vs_currency, category).await?;
        Ok(markets
            .into_iter()
            .map(|market| market.symbol.to_uppercase())
            .collect())
    }
}

/// CoinGecko client over reqwest.
///
/// The free API works without a key; set one via `with_api_key` to use a
/// demo-tier key and its higher rate limits.
pub struct CoinGeckoClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Client against the public API endpoint.
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Client against a custom endpoint (proxy, mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: None,
        }
    }

    /// Attach a demo API key, sent as the x-cg-demo-api-key header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// All category ids known to the provider. Useful for discovering what
    /// to put into the include/exclude lists.
    pub async fn categories_list(&self) -> Result<Vec<CategoryListing>, ProviderError> {
        let url = format!("{}/coins/categories/list", self.api_base);
        self.get_json(&url, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let mut request = self.http.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryProvider for CoinGeckoClient {
    async fn markets_by_category(
        &self,
        vs_currency: &str,
        category: &str,
    ) -> Result<Vec<CategoryMarket>, ProviderError> {
        let url = format!("{}/coins/markets", self.api_base);
        let markets: Vec<CategoryMarket> = self
            .get_json(
                &url,
                &[
                    ("vs_currency", vs_currency),
                    ("category", category),
                    ("per_page", PER_PAGE),
                    ("page", "1"),
                ],
            )
            .await?;
        debug!(
            "CoinGecko returned {} markets for category '{}'",
            markets.len(),
            category
        );
        Ok(markets)
    }
}
