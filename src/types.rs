// Core data structures for the category filter

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which side of the filter a category list belongs to.
///
/// `Include` requires the base asset to be a member of every listed
/// category; `Exclude` rejects a base asset that is a member of any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Include,
    Exclude,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuleKind::Include => write!(f, "include"),
            RuleKind::Exclude => write!(f, "exclude"),
        }
    }
}

/// An ordered list of category names attached to one rule kind.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub kind: RuleKind,
    pub categories: Vec<String>,
}

impl CategoryRule {
    pub fn new(kind: RuleKind, categories: Vec<String>) -> Self {
        Self { kind, categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Fully-materialized category → symbol-set mapping for one refresh window.
///
/// Built in one piece by a refresh cycle and replaced wholesale; a partially
/// fetched snapshot is never visible to callers. Symbols are uppercase.
#[derive(Debug, Default)]
pub struct CategorySnapshot {
    include: HashMap<String, HashSet<String>>,
    exclude: HashMap<String, HashSet<String>>,
}

impl CategorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: RuleKind) -> &HashMap<String, HashSet<String>> {
        match kind {
            RuleKind::Include => &self.include,
            RuleKind::Exclude => &self.exclude,
        }
    }

    pub(crate) fn insert(&mut self, kind: RuleKind, category: String, symbols: HashSet<String>) {
        let table = match kind {
            RuleKind::Include => &mut self.include,
            RuleKind::Exclude => &mut self.exclude,
        };
        table.insert(category, symbols);
    }

    /// Symbol set fetched for `category` under `kind`, if the category was
    /// part of the refresh cycle.
    pub fn symbols(&self, kind: RuleKind, category: &str) -> Option<&HashSet<String>> {
        self.table(kind).get(category)
    }

    /// Membership test. A category missing from the snapshot counts as an
    /// empty set.
    pub fn contains(&self, kind: RuleKind, category: &str, symbol: &str) -> bool {
        self.symbols(kind, category)
            .map(|set| set.contains(symbol))
            .unwrap_or(false)
    }

    /// Number of category lists held (include and exclude combined).
    pub fn len(&self) -> usize {
        self.include.len() + self.exclude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One row of a venue ticker snapshot, as handed over by the caller of the
/// pairlist generation mode.
#[derive(Debug, Clone)]
pub struct Ticker {
    /// Pair symbol, e.g. "DOGE/USDT"
    pub symbol: String,
    /// Last traded price
    pub last: Decimal,
    /// 24h volume in the quote currency
    pub quote_volume: Decimal,
}
