//! Wayfinder - swap routing bot
//!
//! Run with: cargo run -- --from 0x1::aptos_coin::AptosCoin --to <coin> --amount 1.0
//!
//! One invocation performs one scan: fetch the live pool listing, find the
//! best route for the configured trade, encode it, and act on it according
//! to the execution mode.

use clap::Parser;
use color_eyre::eyre::Result;
use console::style;
use std::path::PathBuf;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayfinder::brain::{RouteFinder, RouteRequest};
use wayfinder::cartographer::{HttpPoolSource, PoolCatalog, PoolDataSource, RouteGraph};
use wayfinder::config::Config;
use wayfinder::error::RouterError;
use wayfinder::executor::{ExecutionEngine, RouteEncoder};
use wayfinder::tokens::format_coin;

#[derive(Parser, Debug)]
#[command(name = "wayfinder", about = "Best-route swaps across weighted and stable pools")]
struct Cli {
    /// TOML config file; defaults to environment configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Coin type to convert from
    #[arg(long)]
    from: Option<String>,

    /// Coin type to convert to
    #[arg(long)]
    to: Option<String>,

    /// Input amount in decimal units
    #[arg(long)]
    amount: Option<f64>,

    /// Slippage tolerance in percent
    #[arg(long)]
    slippage: Option<f64>,

    /// Maximum hops per route
    #[arg(long)]
    max_hops: Option<usize>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🧭 WAYFINDER - Swap Routing Bot").cyan().bold()
    );
    println!(
        "{}",
        style("    Weighted + Stable Pools | Up to 3 Hops | Slippage Guarded").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Some(from) = &cli.from {
        config.input_coin = from.clone();
    }
    if let Some(to) = &cli.to {
        config.output_coin = to.clone();
    }
    if let Some(amount) = cli.amount {
        config.trade_amount = amount;
    }
    if let Some(slippage) = cli.slippage {
        config.slippage_pct = slippage;
    }
    if let Some(max_hops) = cli.max_hops {
        config.max_hops = max_hops;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wayfinder=info".parse()?),
        )
        .init();

    print_banner();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or CLI arguments");
        return Err(e.into());
    }

    config.print_summary();
    println!();

    // =============================================
    // PHASE 1: THE CARTOGRAPHER
    // =============================================
    println!(
        "{}",
        style("═══ PHASE 1: THE CARTOGRAPHER ═══").blue().bold()
    );
    println!();

    println!("{}", style("Step 1.1: Fetching pool listing...").blue());
    let start = Instant::now();

    let source = HttpPoolSource::new(config.api_url.clone(), config.listing_cache_secs);
    let listing = source.fetch().await?;

    println!(
        "{} Fetched {} coins, {} pools in {:?}",
        style("✓").green(),
        listing.coins.len(),
        listing.pools.len(),
        start.elapsed()
    );

    println!();
    println!("{}", style("Step 1.2: Parsing catalog and building graph...").blue());
    let start = Instant::now();

    let catalog = PoolCatalog::from_listing(&listing);
    let graph = RouteGraph::from_pools(&catalog.pools);

    println!(
        "{} Graph built in {:?}: {} nodes, {} edges",
        style("✓").green(),
        start.elapsed(),
        graph.node_count(),
        graph.edge_count()
    );

    // =============================================
    // PHASE 2: THE BRAIN
    // =============================================
    println!();
    println!("{}", style("═══ PHASE 2: THE BRAIN ═══").magenta().bold());
    println!();

    println!(
        "{}",
        style(format!(
            "Step 2.1: Searching {} → {} for {} units (≤ {} hops)...",
            format_coin(&config.input_coin),
            format_coin(&config.output_coin),
            config.trade_amount,
            config.max_hops
        ))
        .magenta()
    );
    let start = Instant::now();

    let request = RouteRequest {
        start: config.input_coin.clone(),
        end: config.output_coin.clone(),
        amount_in: config.trade_amount,
        max_hops: config.max_hops,
    };

    let route = match RouteFinder::new(&graph).find_best_route(&request) {
        Ok(route) => route,
        Err(RouterError::NoRouteFound { from, to, max_hops }) => {
            println!(
                "{} No route from {} to {} within {} hops. Nothing to do.",
                style("○").yellow(),
                format_coin(&from),
                format_coin(&to),
                max_hops
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Found {}-hop route in {:?}",
        style("✓").green(),
        route.hop_count(),
        start.elapsed()
    );
    println!("   Path:   {}", style(route.path_display()).cyan());
    for (i, step) in route.steps.iter().enumerate() {
        println!(
            "   Hop {}:  {} ({}, fee {:.2}%)",
            i + 1,
            step.pool.name,
            step.pool.family(),
            step.pool.fee * 100.0
        );
    }
    println!("   Quote:  {} → {}", route.amount_in, route.amount_out);

    // =============================================
    // PHASE 3: THE EXECUTOR
    // =============================================
    println!();
    println!("{}", style("═══ PHASE 3: THE EXECUTOR ═══").yellow().bold());
    println!();

    let input_decimals = catalog
        .coin_by_address(&config.input_coin)
        .map(|c| c.decimals)
        .or_else(|| wayfinder::tokens::decimals_for(&config.input_coin))
        .ok_or_else(|| RouterError::Validation(format!(
            "unknown decimals for {}",
            config.input_coin
        )))?;
    let output_decimals = catalog
        .coin_by_address(&config.output_coin)
        .map(|c| c.decimals)
        .or_else(|| wayfinder::tokens::decimals_for(&config.output_coin))
        .ok_or_else(|| RouterError::Validation(format!(
            "unknown decimals for {}",
            config.output_coin
        )))?;

    let encoder = RouteEncoder::new(config.dex_address.clone());
    let call = encoder.encode(
        &route,
        config.slippage_pct,
        input_decimals,
        output_decimals,
        config.wallet_balance,
    )?;

    let min_out = route.amount_out * (1.0 - config.slippage_pct / 100.0);
    println!("{} Encoded {}", style("✓").green(), call.function_id());
    println!("   Type args: {}", call.type_args.len());
    println!(
        "   Args:      amount_in = {}, min_out = {} (≥ {} {})",
        call.args[0],
        call.args[1],
        min_out,
        format_coin(&config.output_coin)
    );

    let engine = ExecutionEngine::new(config.clone());
    let result = engine.execute(&route, &call).await?;

    // =============================================
    // SUMMARY
    // =============================================
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").green()
    );
    println!("{}", style(" ✅ SCAN COMPLETE").green().bold());
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").green()
    );
    println!();
    println!("Summary:");
    println!("  • Pools in catalog: {}", catalog.pools.len());
    println!("  • Graph: {} nodes, {} edges", graph.node_count(), graph.edge_count());
    println!("  • Route: {} ({} hops)", route.path_display(), route.hop_count());
    println!("  • Quoted output: {}", route.amount_out);
    println!("  • Execution mode: {}", config.execution_mode);
    println!(
        "  • Result: {}",
        if result.is_success() { "✓ OK" } else { "✗ aborted" }
    );
    println!();

    Ok(())
}
