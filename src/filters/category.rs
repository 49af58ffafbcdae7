//! Category pairlist filter
//!
//! Decides, per candidate pair, whether the base asset belongs to the
//! configured "include" and "exclude" CoinGecko categories. The include
//! rule requires membership in every listed category, the exclude rule
//! rejects membership in any. Category lists are cached for
//! `refresh_period` seconds; when a refresh fails, `ignore_failures`
//! decides between passing pairs through unchanged and raising the error.
//!
//! Author: AI-Generated
//! Created: 2026-08-01

use crate::cache::SnapshotCache;
use crate::clock::Clock;
use crate::coingecko::CategoryProvider;
use crate::config::CategoryFilterConfig;
use crate::error::FilterError;
use crate::exchange::Exchange;
use crate::types::{CategoryRule, CategorySnapshot, RuleKind, Ticker};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Include/exclude category filter over a shared snapshot cache.
///
/// One instance holds one cache for its lifetime; every invocation of the
/// filtering entry points reuses it.
pub struct CategoryFilter {
    exchange: Arc<dyn Exchange>,
    config: CategoryFilterConfig,
    cache: SnapshotCache,
}

impl std::fmt::Debug for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryFilter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CategoryFilter {
    /// Build a filter from a validated configuration.
    ///
    /// Fails with a configuration error before any network activity when
    /// category names or timing values are malformed.
    pub fn new(
        exchange: Arc<dyn Exchange>,
        provider: Arc<dyn CategoryProvider>,
        clock: Arc<dyn Clock>,
        mut config: CategoryFilterConfig,
    ) -> Result<Self, FilterError> {
        config.validate()?;

        let rules = vec![
            CategoryRule::new(RuleKind::Include, config.include.clone()),
            CategoryRule::new(RuleKind::Exclude, config.exclude.clone()),
        ];
        let cache = SnapshotCache::new(
            provider,
            clock,
            rules,
            config.vs_currency.clone(),
            Duration::from_secs(config.refresh_period),
        );

        Ok(Self {
            exchange,
            config,
            cache,
        })
    }

    /// One-line description for startup messages.
    pub fn short_desc(&self) -> String {
        format!(
            "CategoryFilter - Filtering pairs by CoinGecko categories (include: {:?}, exclude: {:?})",
            self.config.include, self.config.exclude
        )
    }

    /// The filter needs no ticker data for its decisions; the generation
    /// mode receives its venue snapshot explicitly.
    pub fn needs_tickers(&self) -> bool {
        false
    }

    /// Filter a candidate pairlist, preserving the order of survivors.
    ///
    /// On a category refresh failure the behavior follows
    /// `ignore_failures`: pass the input through unchanged (fail open) or
    /// propagate the error (fail closed).
    pub async fn filter_pairlist(&self, pairs: Vec<String>) -> Result<Vec<String>, FilterError> {
        if !self.config.enabled {
            return Ok(pairs);
        }

        let snapshot = match self.cache.get_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) if self.config.ignore_failures => {
                warn!(
                    "Failed to refresh category lists, keeping pairlist unchanged \
                     because ignore_failures=true: {}",
                    err
                );
                return Ok(pairs);
            }
            Err(err) => return Err(err.into()),
        };

        Ok(self.apply_rules(pairs, &snapshot))
    }

    /// Generate a pairlist from a venue ticker snapshot: select symbols
    /// quoted in the configured stake currency, then filter them.
    ///
    /// With `ignore_failures=true` a refresh failure yields an empty list —
    /// no caller-provided candidate list preexists to fall back to.
    pub async fn gen_pairlist(&self, tickers: &[Ticker]) -> Result<Vec<String>, FilterError> {
        let candidates: Vec<String> = tickers
            .iter()
            .filter(|ticker| {
                self.exchange
                    .pair_quote_currency(&ticker.symbol)
                    .map(|quote| quote.eq_ignore_ascii_case(&self.config.stake_currency))
                    .unwrap_or(false)
            })
            .map(|ticker| ticker.symbol.clone())
            .collect();

        if !self.config.enabled {
            return Ok(candidates);
        }

        let snapshot = match self.cache.get_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) if self.config.ignore_failures => {
                warn!(
                    "Failed to refresh category lists, returning empty pairlist \
                     because ignore_failures=true: {}",
                    err
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        Ok(self.apply_rules(candidates, &snapshot))
    }

    /// Run the include/exclude rules over each pair, dropping excluded ones
    /// and logging a summary.
    fn apply_rules(&self, pairs: Vec<String>, snapshot: &CategorySnapshot) -> Vec<String> {
        let total = pairs.len();
        let mut kept = Vec::with_capacity(total);

        for pair in pairs {
            let base = match self.exchange.pair_base_currency(&pair) {
                Some(base) => base,
                None => {
                    warn!("Could not determine base currency for '{}', removing it", pair);
                    continue;
                }
            };

            match self.excluded_by(&base, snapshot) {
                Some((kind, category)) => {
                    info!(
                        "Ignoring {} because '{}' is '{}' filtered for category '{}'",
                        pair, base, kind, category
                    );
                }
                None => kept.push(pair),
            }
        }

        info!("Validated {} pairs, filtered out {}", total, total - kept.len());
        kept
    }

    /// First rule check the base asset fails, if any.
    ///
    /// Include categories are checked before exclude categories and the
    /// first failing check wins; the order only determines which reason is
    /// reported, not the keep/drop outcome.
    fn excluded_by<'a>(
        &'a self,
        base: &str,
        snapshot: &CategorySnapshot,
    ) -> Option<(RuleKind, &'a str)> {
        for category in &self.config.include {
            if !snapshot.contains(RuleKind::Include, category, base) {
                return Some((RuleKind::Include, category.as_str()));
            }
        }
        for category in &self.config.exclude {
            if snapshot.contains(RuleKind::Exclude, category, base) {
                return Some((RuleKind::Exclude, category.as_str()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coingecko::CategoryMarket;
    use crate::error::ProviderError;
    use crate::exchange::SlashPairParser;
    use crate::clock::SystemClock;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StaticProvider {
        categories: HashMap<String, Vec<&'static str>>,
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl StaticProvider {
        fn new(categories: &[(&str, &[&'static str])]) -> Self {
            Self {
                categories: categories
                    .iter()
                    .map(|(category, symbols)| (category.to_string(), symbols.to_vec()))
                    .collect(),
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn failing(categories: &[(&str, &[&'static str])]) -> Self {
            let provider = Self::new(categories);
            provider.fail.store(true, Ordering::SeqCst);
            provider
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CategoryProvider for StaticProvider {
        async fn markets_by_category(
            &self,
            _vs_currency: &str,
            category: &str,
        ) -> Result<Vec<CategoryMarket>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ProviderError::Decode("simulated outage".to_string()));
            }
            Ok(self
                .categories
                .get(category)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|symbol| CategoryMarket {
                    symbol: symbol.to_lowercase(),
                    name: None,
                    current_price: None,
                })
                .collect())
        }
    }

    fn category_data() -> &'static [(&'static str, &'static [&'static str])] {
        &[
            ("meme-token", &["DOGE", "SHIB"]),
            ("stablecoins", &["USDT", "USDC"]),
        ]
    }

    fn config(include: &[&str], exclude: &[&str]) -> CategoryFilterConfig {
        CategoryFilterConfig {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            ..CategoryFilterConfig::default()
        }
    }

    fn filter_with(provider: Arc<StaticProvider>, config: CategoryFilterConfig) -> CategoryFilter {
        CategoryFilter::new(
            Arc::new(SlashPairParser),
            provider,
            Arc::new(SystemClock),
            config,
        )
        .unwrap()
    }

    fn pairs(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_include_and_exclude_worked_example() {
        // include=["meme-token"], exclude=["stablecoins"]:
        // USDT/USDC drops (base is a stablecoin), ETH/USDT drops (base is
        // not a meme token)
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &["stablecoins"]));

        let result = filter
            .filter_pairlist(pairs(&["DOGE/USDT", "USDT/USDC", "SHIB/BTC", "ETH/USDT"]))
            .await
            .unwrap();

        assert_eq!(result, pairs(&["DOGE/USDT", "SHIB/BTC"]));
    }

    #[tokio::test]
    async fn test_include_requires_membership_in_every_category() {
        let provider = Arc::new(StaticProvider::new(&[
            ("meme-token", &["DOGE", "SHIB"]),
            ("dog-themed", &["DOGE"]),
        ]));
        let filter = filter_with(provider, config(&["meme-token", "dog-themed"], &[]));

        let result = filter
            .filter_pairlist(pairs(&["DOGE/USDT", "SHIB/USDT"]))
            .await
            .unwrap();

        // SHIB is a meme token but not dog-themed
        assert_eq!(result, pairs(&["DOGE/USDT"]));
    }

    #[tokio::test]
    async fn test_exclude_drops_membership_in_any_category() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&[], &["stablecoins"]));

        let result = filter
            .filter_pairlist(pairs(&["USDC/EUR", "ETH/USDT"]))
            .await
            .unwrap();

        // ETH is unknown to the snapshot and never tripped by an exclude rule
        assert_eq!(result, pairs(&["ETH/USDT"]));
    }

    #[tokio::test]
    async fn test_unknown_base_fails_any_include_rule() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &[]));

        let result = filter.filter_pairlist(pairs(&["XYZ/USDT"])).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_survivor_order_preserved() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&[], &["stablecoins"]));

        let result = filter
            .filter_pairlist(pairs(&["ETH/USDT", "USDT/EUR", "BTC/USDT", "DOGE/USDT"]))
            .await
            .unwrap();

        assert_eq!(result, pairs(&["ETH/USDT", "BTC/USDT", "DOGE/USDT"]));
    }

    #[tokio::test]
    async fn test_repeated_application_is_idempotent_and_cached() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(
            Arc::clone(&provider),
            config(&["meme-token"], &["stablecoins"]),
        );
        let input = pairs(&["DOGE/USDT", "ETH/USDT"]);

        let first = filter.filter_pairlist(input.clone()).await.unwrap();
        let second = filter.filter_pairlist(input).await.unwrap();

        assert_eq!(first, second);
        // Two configured categories, fetched by exactly one cycle
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_open_returns_input_unchanged() {
        let provider = Arc::new(StaticProvider::failing(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &["stablecoins"]));
        let input = pairs(&["DOGE/USDT", "USDT/USDC"]);

        let result = filter.filter_pairlist(input.clone()).await.unwrap();
        assert_eq!(result, input);
    }

    #[tokio::test]
    async fn test_fail_closed_propagates_error() {
        let provider = Arc::new(StaticProvider::failing(category_data()));
        let mut cfg = config(&["meme-token"], &[]);
        cfg.ignore_failures = false;
        let filter = filter_with(provider, cfg);

        let err = filter
            .filter_pairlist(pairs(&["DOGE/USDT"]))
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::Provider(_)));
    }

    #[tokio::test]
    async fn test_disabled_filter_passes_through_without_fetching() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let mut cfg = config(&["meme-token"], &[]);
        cfg.enabled = false;
        let filter = filter_with(Arc::clone(&provider), cfg);
        let input = pairs(&["ETH/USDT", "XYZ/USDT"]);

        let result = filter.filter_pairlist(input.clone()).await.unwrap();
        assert_eq!(result, input);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_pair_is_dropped() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&[], &["stablecoins"]));

        let result = filter
            .filter_pairlist(pairs(&["ETH/USDT", "GARBAGE"]))
            .await
            .unwrap();
        assert_eq!(result, pairs(&["ETH/USDT"]));
    }

    #[tokio::test]
    async fn test_no_categories_keeps_everything() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(Arc::clone(&provider), config(&[], &[]));
        let input = pairs(&["ETH/USDT", "XYZ/BTC"]);

        let result = filter.filter_pairlist(input.clone()).await.unwrap();
        assert_eq!(result, input);
        assert_eq!(provider.call_count(), 0);
    }

    fn tickers() -> Vec<Ticker> {
        vec![
            Ticker {
                symbol: "DOGE/USDT".to_string(),
                last: dec!(0.12),
                quote_volume: dec!(1_000_000),
            },
            Ticker {
                symbol: "SHIB/BTC".to_string(),
                last: dec!(0.00000031),
                quote_volume: dec!(50_000),
            },
            Ticker {
                symbol: "ETH/USDT".to_string(),
                last: dec!(3000),
                quote_volume: dec!(9_000_000),
            },
        ]
    }

    #[tokio::test]
    async fn test_gen_pairlist_selects_stake_quote_then_filters() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &[]));

        let result = filter.gen_pairlist(&tickers()).await.unwrap();

        // SHIB/BTC is not quoted in the stake currency; ETH fails include
        assert_eq!(result, pairs(&["DOGE/USDT"]));
    }

    #[tokio::test]
    async fn test_gen_pairlist_fail_open_returns_empty() {
        let provider = Arc::new(StaticProvider::failing(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &[]));

        let result = filter.gen_pairlist(&tickers()).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_gen_pairlist_fail_closed_propagates_error() {
        let provider = Arc::new(StaticProvider::failing(category_data()));
        let mut cfg = config(&["meme-token"], &[]);
        cfg.ignore_failures = false;
        let filter = filter_with(provider, cfg);

        assert!(filter.gen_pairlist(&tickers()).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_bad_config_before_any_fetch() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let mut cfg = config(&["meme-token", ""], &[]);
        cfg.ignore_failures = false;

        let err = CategoryFilter::new(
            Arc::new(SlashPairParser),
            Arc::clone(&provider) as Arc<dyn CategoryProvider>,
            Arc::new(SystemClock),
            cfg,
        )
        .unwrap_err();

        assert!(matches!(err, FilterError::Config(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_desc_names_categories() {
        let provider = Arc::new(StaticProvider::new(category_data()));
        let filter = filter_with(provider, config(&["meme-token"], &["stablecoins"]));
        let desc = filter.short_desc();
        assert!(desc.contains("meme-token"));
        assert!(desc.contains("stablecoins"));
        assert!(!filter.needs_tickers());
    }
}
