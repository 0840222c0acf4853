//! Pool Catalog Report
//!
//! Run with: cargo run --bin list-pools
//!
//! Fetches the live listing once and prints every pool the catalog accepts:
//! family, constituents, balances, and fee. Useful for checking what the
//! router will actually see before trading against it.

use console::style;
use eyre::Result;
use std::env;

use wayfinder::cartographer::{
    HttpPoolSource, PoolCatalog, PoolDataSource, PoolKind, RouteGraph, LISTING_CACHE_SECS,
};

#[tokio::main]
async fn main() -> Result<()> {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              WAYFINDER POOL CATALOG REPORT                 ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    dotenvy::dotenv().ok();

    let api_url = env::var("API_URL").unwrap_or_else(|_| {
        println!("⚠️  API_URL not set, using default endpoint");
        "https://api.cascade.exchange/v1".to_string()
    });
    println!("📡 API: {}", api_url);
    println!();

    let source = HttpPoolSource::new(api_url, LISTING_CACHE_SECS);
    let listing = source.fetch().await?;
    let catalog = PoolCatalog::from_listing(&listing);

    let mut weighted = 0;
    let mut stable = 0;

    for pool in &catalog.pools {
        let symbols: Vec<&str> = pool.coins.iter().map(|c| c.symbol.as_str()).collect();
        let balances: Vec<String> = pool
            .balances
            .iter()
            .zip(&pool.coins)
            .map(|(&b, c)| format!("{:.2}", b as f64 / 10f64.powi(c.decimals as i32)))
            .collect();

        let params = match &pool.kind {
            PoolKind::Weighted { weights } => {
                weighted += 1;
                format!(
                    "weights [{}]",
                    weights
                        .iter()
                        .map(|w| format!("{:.0}%", w * 100.0))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            PoolKind::Stable { amplification } => {
                stable += 1;
                format!("A = {}", amplification)
            }
        };

        println!(
            "  {} {:<28} {} | {} | balances [{}] | fee {:.2}%",
            style("•").cyan(),
            pool.name,
            symbols.join("/"),
            params,
            balances.join(", "),
            pool.fee * 100.0
        );
    }

    let graph = RouteGraph::from_pools(&catalog.pools);

    println!();
    println!(
        "{} {} pools accepted ({} weighted, {} stable)",
        style("✓").green(),
        catalog.pools.len(),
        weighted,
        stable
    );
    println!(
        "{} Routing graph: {} tokens, {} directed edges",
        style("✓").green(),
        graph.node_count(),
        graph.edge_count()
    );
    println!();

    Ok(())
}
