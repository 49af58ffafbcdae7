//! Pairlist filtering system
//!
//! Filters candidate trading pairs by CoinGecko category membership.
//!
//! Author: AI-Generated
//! Created: 2026-08-01

pub mod category;

pub use category::CategoryFilter;
