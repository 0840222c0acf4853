//! Phase 3: The Executor
//!
//! Turns a found route into the exact on-chain call and, depending on the
//! execution mode, logs it, builds the submission payload, or submits it.
//!
//! ⚠️  WARNING: Production mode interacts with real funds!

pub mod encoder;
pub mod submitter;

pub use encoder::{EncodedCall, RouteEncoder, MAX_SUPPORTED_HOPS};
pub use submitter::{EntryFunctionPayload, HttpSubmitter, SubmissionReceipt, TransactionSubmitter};

use chrono::Utc;
use eyre::Result;
use tracing::{info, warn};

use crate::brain::Route;
use crate::config::{Config, ExecutionMode, RouteLog};

/// What the engine did with a route.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Simulated,
    DryRun { payload: serde_json::Value },
    Submitted { receipt: SubmissionReceipt },
    Aborted { reason: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        match self {
            ExecutionResult::Simulated | ExecutionResult::DryRun { .. } => true,
            ExecutionResult::Submitted { receipt } => receipt.success,
            ExecutionResult::Aborted { .. } => false,
        }
    }
}

/// The main execution engine
pub struct ExecutionEngine {
    config: Config,
    submitter: HttpSubmitter,
}

impl ExecutionEngine {
    pub fn new(config: Config) -> Self {
        Self {
            submitter: HttpSubmitter::new(config.fullnode_url.clone()),
            config,
        }
    }

    /// Check if the engine is ready for production
    pub fn is_production_ready(&self) -> bool {
        self.config.execution_mode == ExecutionMode::Production
            && self.config.wallet_address.is_some()
    }

    /// Act on an encoded route according to the execution mode.
    pub async fn execute(&self, route: &Route, call: &EncodedCall) -> Result<ExecutionResult> {
        if self.config.emergency_stop {
            return Ok(ExecutionResult::Aborted {
                reason: "Emergency stop is active".to_string(),
            });
        }

        if self.config.route_log {
            self.log_route(route, call)?;
        }

        match self.config.execution_mode {
            ExecutionMode::Simulation => {
                info!("📋 SIMULATION MODE: Would submit {}", call.function_id());
                info!("   Path: {}", route.path_display());
                info!("   Input: {} (base units: {})", route.amount_in, call.args[0]);
                info!("   Min output (base units): {}", call.args[1]);
                Ok(ExecutionResult::Simulated)
            }

            ExecutionMode::DryRun => {
                let payload = serde_json::to_value(EntryFunctionPayload::from_call(call))?;
                info!("🔬 DRY RUN: Built payload for {}", call.function_id());
                info!("   {} type args, {} scalar args", call.type_args.len(), call.args.len());
                Ok(ExecutionResult::DryRun { payload })
            }

            ExecutionMode::Production => {
                let Some(sender) = self.config.wallet_address.as_deref() else {
                    warn!("Production mode without WALLET_ADDRESS - aborting");
                    return Ok(ExecutionResult::Aborted {
                        reason: "WALLET_ADDRESS not configured".to_string(),
                    });
                };
                let receipt = self.submitter.submit(call, sender).await?;
                info!(
                    "🚀 Submitted {} → {} (success: {})",
                    call.function_id(),
                    receipt.hash,
                    receipt.success
                );
                Ok(ExecutionResult::Submitted { receipt })
            }
        }
    }

    fn log_route(&self, route: &Route, call: &EncodedCall) -> Result<()> {
        let log = RouteLog {
            timestamp: Utc::now(),
            path: route.coin_path().iter().map(|s| s.to_string()).collect(),
            pools: route.steps.iter().map(|s| s.pool.name.clone()).collect(),
            amount_in: route.amount_in,
            quoted_out: route.amount_out,
            hops: route.hop_count(),
            function: call.function_id(),
        };
        log.append_to_file(&self.config.route_log_path)
    }
}
