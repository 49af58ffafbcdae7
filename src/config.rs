//! Filter configuration
//!
//! Reads the category filter settings from a TOML file, with serde defaults
//! for every optional key. Validation runs before any network activity; a
//! bad config is fatal at construction and never retried.
//!
//! Author: AI-Generated
//! Created: 2026-07-30

use crate::error::FilterError;
use serde::Deserialize;
use std::path::Path;

/// Recognized options of the category filter.
///
/// `include` and `exclude` are lists of CoinGecko category ids (e.g.
/// "meme-token", "stablecoins"). Duplicates are allowed but redundant.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFilterConfig {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Pass pairs through unfiltered when a category refresh fails
    #[serde(default = "default_true")]
    pub ignore_failures: bool,
    /// Seconds a fetched category snapshot stays valid
    #[serde(default = "default_refresh_period")]
    pub refresh_period: u64,
    /// Quote unit for the provider's market listings, lowercase
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// Stake currency used by the pairlist generation mode
    #[serde(default = "default_stake_currency")]
    pub stake_currency: String,
    /// Administrative kill switch: a disabled filter passes input through
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool { true }
fn default_refresh_period() -> u64 { 86_400 }
fn default_vs_currency() -> String { "usd".to_string() }
fn default_stake_currency() -> String { "USDT".to_string() }

impl Default for CategoryFilterConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            ignore_failures: true,
            refresh_period: default_refresh_period(),
            vs_currency: default_vs_currency(),
            stake_currency: default_stake_currency(),
            enabled: true,
        }
    }
}

impl CategoryFilterConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FilterError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FilterError::Config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, FilterError> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| FilterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check category names and timing values, and normalize `vs_currency`
    /// to lowercase. Called by `load` and again at filter construction for
    /// programmatically built configs.
    pub fn validate(&mut self) -> Result<(), FilterError> {
        for (name, categories) in [("include", &self.include), ("exclude", &self.exclude)] {
            if categories.iter().any(|c| c.trim().is_empty()) {
                return Err(FilterError::Config(format!(
                    "'{}' must be a list of non-empty category names",
                    name
                )));
            }
        }
        if self.refresh_period == 0 {
            return Err(FilterError::Config(
                "'refresh_period' must be greater than zero".to_string(),
            ));
        }
        if self.stake_currency.trim().is_empty() {
            return Err(FilterError::Config(
                "'stake_currency' must not be empty".to_string(),
            ));
        }
        self.vs_currency = self.vs_currency.to_lowercase();
        if self.vs_currency.trim().is_empty() {
            return Err(FilterError::Config(
                "'vs_currency' must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
