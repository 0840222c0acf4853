//! Configuration for the Wayfinder.
//!
//! Everything is overridable from the environment (and a `.env` file) or a
//! TOML file, with production-mode guardrails enforced by `validate()`.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::brain::DEFAULT_MAX_HOPS;
use crate::error::RouterError;
use crate::executor::MAX_SUPPORTED_HOPS;

/// Package address of the DEX deployment this bot targets.
pub const DEFAULT_DEX_ADDRESS: &str =
    "0xc35cade3880ebf1c3cd58eac1d3a4ca45a9c0254b05a7d3d50e8b4d26f42a6e1";

// ============================================
// EXECUTION MODE
// ============================================

/// Execution mode determines how the bot operates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Simulation mode - finds and quotes routes but never submits
    Simulation,

    /// DryRun mode - builds the full submission payload but doesn't send it
    DryRun,

    /// Production mode - actually submits transactions
    /// CAUTION: This uses real funds!
    Production,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Simulation
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Simulation => write!(f, "SIMULATION"),
            ExecutionMode::DryRun => write!(f, "DRY_RUN"),
            ExecutionMode::Production => write!(f, "PRODUCTION"),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

/// Main configuration struct for the Wayfinder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Network Settings ==========
    /// Base URL of the DEX pool-listing API
    pub api_url: String,

    /// Fullnode endpoint for transaction submission
    pub fullnode_url: String,

    // ========== Execution Settings ==========
    /// Current execution mode
    pub execution_mode: ExecutionMode,

    /// Enable/disable route logging
    pub route_log: bool,

    /// Path to append found-route logs
    pub route_log_path: String,

    // ========== Trade Request ==========
    /// Coin type to convert from
    pub input_coin: String,

    /// Coin type to convert to
    pub output_coin: String,

    /// Input amount in decimal units of the input coin
    pub trade_amount: f64,

    /// Slippage tolerance in percent, within [0, 100)
    pub slippage_pct: f64,

    /// Maximum hops per route (on-chain entry points cap this at 3)
    pub max_hops: usize,

    // ========== On-chain Targets ==========
    /// Package address of the DEX deployment
    pub dex_address: String,

    /// Wallet address used as the transaction sender
    pub wallet_address: Option<String>,

    /// Operator-supplied input-coin balance; when set, routes that need
    /// more than this are rejected before encoding
    pub wallet_balance: Option<f64>,

    // ========== Rate Limiting ==========
    /// Minimum seconds between scans
    pub scan_interval_secs: u64,

    /// How long a fetched pool listing stays fresh
    pub listing_cache_secs: u64,

    // ========== Safety Settings ==========
    /// Kill switch - immediately stop all operations
    pub emergency_stop: bool,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Network
            api_url: env::var("API_URL")
                .unwrap_or_else(|_| "https://api.cascade.exchange/v1".to_string()),
            fullnode_url: env::var("FULLNODE_URL")
                .unwrap_or_else(|_| "https://fullnode.mainnet.aptoslabs.com/v1".to_string()),

            // Execution
            execution_mode: match env::var("EXECUTION_MODE")
                .unwrap_or_else(|_| "simulation".to_string())
                .to_lowercase()
                .as_str()
            {
                "production" => ExecutionMode::Production,
                "dry_run" | "dryrun" => ExecutionMode::DryRun,
                _ => ExecutionMode::Simulation,
            },
            route_log: env::var("ROUTE_LOG")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            route_log_path: env::var("ROUTE_LOG_PATH")
                .unwrap_or_else(|_| "./logs/routes.log".to_string()),

            // Trade request
            input_coin: env::var("INPUT_COIN")
                .unwrap_or_else(|_| "0x1::aptos_coin::AptosCoin".to_string()),
            output_coin: env::var("OUTPUT_COIN").unwrap_or_else(|_| {
                "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC"
                    .to_string()
            }),
            trade_amount: env::var("TRADE_AMOUNT")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .unwrap_or(1.0),
            slippage_pct: env::var("SLIPPAGE_PCT")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .unwrap_or(0.5),
            max_hops: env::var("MAX_HOPS")
                .unwrap_or_else(|_| DEFAULT_MAX_HOPS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_HOPS),

            // On-chain targets
            dex_address: env::var("DEX_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_DEX_ADDRESS.to_string()),
            wallet_address: env::var("WALLET_ADDRESS").ok(),
            wallet_balance: env::var("WALLET_BALANCE").ok().and_then(|s| s.parse().ok()),

            // Rate limiting
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            listing_cache_secs: env::var("LISTING_CACHE_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),

            // Safety
            emergency_stop: env::var("EMERGENCY_STOP")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate the request parameters and production requirements.
    /// Runs before anything reaches the route finder or encoder.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.api_url.is_empty() {
            return Err(RouterError::Validation("API_URL must be set".into()));
        }

        if !(0.0..100.0).contains(&self.slippage_pct) {
            return Err(RouterError::Validation(format!(
                "SLIPPAGE_PCT must be in [0, 100), got {}",
                self.slippage_pct
            )));
        }

        if !self.trade_amount.is_finite() || self.trade_amount <= 0.0 {
            return Err(RouterError::Validation(format!(
                "TRADE_AMOUNT must be a positive number, got {}",
                self.trade_amount
            )));
        }

        if self.max_hops == 0 || self.max_hops > MAX_SUPPORTED_HOPS {
            return Err(RouterError::Validation(format!(
                "MAX_HOPS must be between 1 and {}, got {}",
                MAX_SUPPORTED_HOPS, self.max_hops
            )));
        }

        if !self.input_coin.contains("::") || !self.output_coin.contains("::") {
            return Err(RouterError::Validation(
                "INPUT_COIN and OUTPUT_COIN must be fully-qualified coin types".into(),
            ));
        }

        if self.input_coin == self.output_coin {
            return Err(RouterError::Validation(
                "INPUT_COIN and OUTPUT_COIN must differ".into(),
            ));
        }

        if self.execution_mode == ExecutionMode::Production && self.wallet_address.is_none() {
            return Err(RouterError::Validation(
                "Production mode requires WALLET_ADDRESS".into(),
            ));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              WAYFINDER - CONFIGURATION                     ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Execution Mode:    {:^40} ║", self.execution_mode);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ TRADE REQUEST                                              ║");
        println!("║ • Input:           {:^40} ║", crate::tokens::format_coin(&self.input_coin));
        println!("║ • Output:          {:^40} ║", crate::tokens::format_coin(&self.output_coin));
        println!("║ • Amount:          {:<40} ║", self.trade_amount);
        println!("║ • Slippage:        {:<39}% ║", self.slippage_pct);
        println!("║ • Max Hops:        {:^40} ║", self.max_hops);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ SAFETY                                                     ║");
        println!("║ • Emergency Stop:  {:^40} ║",
            if self.emergency_stop { "🛑 ACTIVE" } else { "✓ Inactive" }
        );
        println!("║ • Route Log:       {:^40} ║",
            if self.route_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("║ • Wallet:          {:^40} ║",
            if self.wallet_address.is_some() { "✓ Configured" } else { "✗ Not Set" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.cascade.exchange/v1".to_string(),
            fullnode_url: "https://fullnode.mainnet.aptoslabs.com/v1".to_string(),
            execution_mode: ExecutionMode::Simulation,
            route_log: true,
            route_log_path: "./logs/routes.log".to_string(),
            input_coin: "0x1::aptos_coin::AptosCoin".to_string(),
            output_coin:
                "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC"
                    .to_string(),
            trade_amount: 1.0,
            slippage_pct: 0.5,
            max_hops: DEFAULT_MAX_HOPS,
            dex_address: DEFAULT_DEX_ADDRESS.to_string(),
            wallet_address: None,
            wallet_balance: None,
            scan_interval_secs: 10,
            listing_cache_secs: 10,
            emergency_stop: false,
        }
    }
}

// ============================================
// ROUTE LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One found route, appended to the route log as JSONL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteLog {
    pub timestamp: DateTime<Utc>,
    pub path: Vec<String>,
    pub pools: Vec<String>,
    pub amount_in: f64,
    pub quoted_out: f64,
    pub hops: usize,
    pub function: String,
}

impl RouteLog {
    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
