//! Refreshing category snapshot cache
//!
//! Holds the most recently fetched category → symbol mapping for a bounded
//! time-to-live and guarantees at most one fetch cycle per expiry window.
//! The refresh-or-reuse decision and the cache replacement happen inside one
//! mutex critical section, so concurrent callers serialize and never observe
//! a partially built snapshot: a cycle either fully replaces the value or
//! leaves the stale one untouched and reports the error.
//!
//! Author: AI-Generated
//! Created: 2026-07-31

use crate::clock::Clock;
use crate::coingecko::CategoryProvider;
use crate::error::ProviderError;
use crate::types::{CategoryRule, CategorySnapshot};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Minimum pause between successive provider calls within one refresh cycle,
/// to respect the provider's rate limits.
pub const DEFAULT_FETCH_GAP: Duration = Duration::from_millis(100);

struct CachedSnapshot {
    snapshot: Arc<CategorySnapshot>,
    fetched_at: Instant,
}

/// TTL cache over the category provider.
pub struct SnapshotCache {
    provider: Arc<dyn CategoryProvider>,
    clock: Arc<dyn Clock>,
    rules: Vec<CategoryRule>,
    vs_currency: String,
    ttl: Duration,
    fetch_gap: Duration,
    state: Mutex<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(
        provider: Arc<dyn CategoryProvider>,
        clock: Arc<dyn Clock>,
        rules: Vec<CategoryRule>,
        vs_currency: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            provider,
            clock,
            rules,
            vs_currency: vs_currency.into(),
            ttl,
            fetch_gap: DEFAULT_FETCH_GAP,
            state: Mutex::new(None),
        }
    }

    /// Override the pause between successive provider calls.
    pub fn with_fetch_gap(mut self, fetch_gap: Duration) -> Self {
        self.fetch_gap = fetch_gap;
        self
    }

    /// Current snapshot, refreshed when missing or older than the TTL.
    ///
    /// Fails only when no fetch has ever succeeded or the cached value has
    /// expired and the refresh attempt failed. A failed refresh never mutates
    /// the cached value.
    pub async fn get_snapshot(&self) -> Result<Arc<CategorySnapshot>, ProviderError> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if self.clock.now().duration_since(cached.fetched_at) < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        let snapshot = Arc::new(self.fetch_all().await?);
        info!(
            "Category snapshot refreshed: {} category lists loaded",
            snapshot.len()
        );
        *state = Some(CachedSnapshot {
            snapshot: Arc::clone(&snapshot),
            fetched_at: self.clock.now(),
        });
        Ok(snapshot)
    }

    /// One full fetch cycle across all configured rules, include before
    /// exclude, pausing `fetch_gap` between successive provider calls.
    async fn fetch_all(&self) -> Result<CategorySnapshot, ProviderError> {
        let mut snapshot = CategorySnapshot::new();
        let mut first = true;
        for rule in &self.rules {
            for category in &rule.categories {
                if !first {
                    self.clock.sleep(self.fetch_gap).await;
                }
                first = false;

                let symbols = self
                    .provider
                    .fetch_category(&self.vs_currency, category)
                    .await?;
                debug!(
                    "Loaded {} symbols for category '{}' ('{}' rule)",
                    symbols.len(),
                    category,
                    rule.kind
                );
                snapshot.insert(rule.kind, category.clone(), symbols);
            }
        }
        Ok(snapshot)
    }
}
