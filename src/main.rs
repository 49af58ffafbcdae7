//! Category pairlist screener
//!
//! Small CLI around the category filter: reads the filter configuration
//! from a TOML file, fetches category lists from CoinGecko, and prints the
//! candidate pairs that survive the include/exclude rules. Can also list
//! the category ids known to the provider.
//!
//! Author: AI-Generated
//! Created: 2026-08-02

use anyhow::Result;
use category_filter::{
    CategoryFilter, CategoryFilterConfig, CoinGeckoClient, SlashPairParser, SystemClock,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Category pairlist screener — filter trading pairs by CoinGecko categories
#[derive(Parser)]
#[command(name = "category-filter")]
struct Args {
    /// Path to the filter TOML configuration
    #[arg(short, long, env = "FILTER_CONFIG", default_value = "config/filter.toml")]
    config: String,

    /// List the category ids known to the provider and exit
    #[arg(long)]
    list_categories: bool,

    /// Candidate pairs to filter (e.g. DOGE/USDT SHIB/BTC)
    pairs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut client = match std::env::var("COINGECKO_API_BASE") {
        Ok(base) => CoinGeckoClient::with_api_base(base),
        Err(_) => CoinGeckoClient::new(),
    };
    if let Ok(key) = std::env::var("COINGECKO_API_KEY") {
        client = client.with_api_key(key);
    }

    if args.list_categories {
        for listing in client.categories_list().await? {
            println!("{}\t{}", listing.category_id, listing.name);
        }
        return Ok(());
    }

    if args.pairs.is_empty() {
        anyhow::bail!("no candidate pairs given, e.g.: category-filter DOGE/USDT SHIB/BTC");
    }

    let config = CategoryFilterConfig::load(&args.config)?;
    let filter = CategoryFilter::new(
        Arc::new(SlashPairParser),
        Arc::new(client),
        Arc::new(SystemClock),
        config,
    )?;
    info!("{}", filter.short_desc());

    let kept = filter.filter_pairlist(args.pairs).await?;
    for pair in &kept {
        println!("{}", pair);
    }

    Ok(())
}
