//! Route encoding - from a found route to the exact entry-function call.
//!
//! The on-chain package exposes one entry point per hop count. Single-hop
//! swaps go through the family's own script module; 2- and 3-hop swaps go
//! through the multihop router regardless of the pool families involved.
//!
//! Generic type arguments are positional and fixed-width: every pool
//! contributes a block of 4 asset slots plus 4 weight slots, padded with
//! the package's `Null` marker type, followed by the chain of coin types
//! actually traversed. Weight types are declared on-chain as
//! `Weight_<percent>`, so a weight that is not a whole percentage cannot
//! be encoded at all.

use serde::Serialize;

use crate::brain::{Route, TradeDirection};
use crate::cartographer::{Pool, PoolKind, POOL_ASSET_SLOTS};
use crate::error::RouterError;

/// The deepest route any on-chain entry point accepts.
pub const MAX_SUPPORTED_HOPS: usize = 3;

const WEIGHTED_SWAP_ENTRY: &str = "weighted_pool_scripts::swap_exact_in";
const STABLE_SWAP_ENTRY: &str = "stable_pool_scripts::swap_exact_in";
const TWO_HOP_ENTRY: &str = "router::swap_exact_in_2hop";
const THREE_HOP_ENTRY: &str = "router::swap_exact_in_3hop";

/// A weight must be a whole percentage within this tolerance to have a
/// declared on-chain type name.
const WEIGHT_ENCODING_TOLERANCE: f64 = 1e-9;

/// A fully-specified entry-function invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedCall {
    /// Package address the entry function lives under.
    pub address: String,
    /// `module::function` within that package.
    pub function_name: String,
    pub type_args: Vec<String>,
    pub args: Vec<u64>,
}

impl EncodedCall {
    pub fn function_id(&self) -> String {
        format!("{}::{}", self.address, self.function_name)
    }
}

/// Encodes routes against one deployed package.
pub struct RouteEncoder {
    dex_address: String,
}

impl RouteEncoder {
    pub fn new(dex_address: impl Into<String>) -> Self {
        Self {
            dex_address: dex_address.into(),
        }
    }

    /// Build the call for an exact-input route.
    ///
    /// `slippage_pct` is applied as `amount_out * (1 - pct/100)`; an
    /// out-of-range value still yields a mathematically consistent bound
    /// (floored at zero once scaled to integer units) rather than a panic -
    /// range validation belongs to the caller.
    pub fn encode(
        &self,
        route: &Route,
        slippage_pct: f64,
        input_decimals: u8,
        output_decimals: u8,
        known_balance: Option<f64>,
    ) -> Result<EncodedCall, RouterError> {
        if route.direction != TradeDirection::ExactInput {
            return Err(RouterError::Validation(
                "exact-output routes have no supported entry point".into(),
            ));
        }
        let hops = route.steps.len();
        if hops == 0 {
            return Err(RouterError::Validation("route has no hops".into()));
        }
        if hops > MAX_SUPPORTED_HOPS {
            return Err(RouterError::RouteTooLong { hops });
        }
        if let Some(available) = known_balance {
            if available < route.amount_in {
                return Err(RouterError::InsufficientBalance {
                    required: route.amount_in,
                    available,
                });
            }
        }

        let amount_in = to_base_units(route.amount_in, input_decimals);
        let min_out_decimal = route.amount_out * (1.0 - slippage_pct / 100.0);
        let min_out = to_base_units(min_out_decimal.max(0.0), output_decimals);

        let mut type_args = Vec::with_capacity(hops * POOL_ASSET_SLOTS * 2 + hops + 1);
        for step in &route.steps {
            type_args.extend(self.pool_type_args(&step.pool)?);
        }
        type_args.push(route.steps[0].from_coin.clone());
        for step in &route.steps {
            type_args.push(step.to_coin.clone());
        }

        let function_name = match hops {
            1 => match route.steps[0].pool.kind {
                PoolKind::Weighted { .. } => WEIGHTED_SWAP_ENTRY,
                PoolKind::Stable { .. } => STABLE_SWAP_ENTRY,
            },
            2 => TWO_HOP_ENTRY,
            _ => THREE_HOP_ENTRY,
        };

        Ok(EncodedCall {
            address: self.dex_address.clone(),
            function_name: function_name.to_string(),
            type_args,
            args: vec![amount_in, min_out],
        })
    }

    /// One pool's fixed-width type block: 4 asset slots then 4 weight slots.
    fn pool_type_args(&self, pool: &Pool) -> Result<Vec<String>, RouterError> {
        let null = self.null_type();
        let mut block = Vec::with_capacity(POOL_ASSET_SLOTS * 2);

        for slot in 0..POOL_ASSET_SLOTS {
            block.push(
                pool.coins
                    .get(slot)
                    .map(|coin| coin.address.clone())
                    .unwrap_or_else(|| null.clone()),
            );
        }

        match &pool.kind {
            PoolKind::Weighted { weights } => {
                for slot in 0..POOL_ASSET_SLOTS {
                    match weights.get(slot) {
                        Some(&weight) => block.push(self.weight_type(weight)?),
                        None => block.push(null.clone()),
                    }
                }
            }
            PoolKind::Stable { .. } => {
                for _ in 0..POOL_ASSET_SLOTS {
                    block.push(null.clone());
                }
            }
        }

        Ok(block)
    }

    fn null_type(&self) -> String {
        format!("{}::base_pool::Null", self.dex_address)
    }

    /// `0.8 → Weight_80`. The suffix must match the on-chain declaration
    /// exactly; a weight that is not a whole percentage is unencodable.
    fn weight_type(&self, weight: f64) -> Result<String, RouterError> {
        let percent = weight * 100.0;
        if (percent - percent.round()).abs() > WEIGHT_ENCODING_TOLERANCE {
            return Err(RouterError::UnencodableWeight { weight });
        }
        Ok(format!(
            "{}::weighted_pool::Weight_{}",
            self.dex_address,
            percent.round() as u32
        ))
    }
}

/// Scale a decimal amount to integer base units.
fn to_base_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(decimals as i32)).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::SwapStep;
    use crate::cartographer::Coin;

    const DEX: &str = "0xc35cade3880ebf1c3cd58eac1d3a4ca45a9c0254b05a7d3d50e8b4d26f42a6e1";
    const APT: &str = "0x1::aptos_coin::AptosCoin";
    const USDC: &str =
        "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC";
    const USDT: &str =
        "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDT";

    fn coin(address: &str, symbol: &str, decimals: u8) -> Coin {
        Coin {
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }

    fn weighted_pool() -> Pool {
        Pool {
            name: "W:APT-80:zUSDC-20".into(),
            kind: PoolKind::Weighted {
                weights: vec![0.8, 0.2],
            },
            coins: vec![coin(APT, "APT", 8), coin(USDC, "zUSDC", 6)],
            balances: vec![500_000_000_000, 9_000_000_000],
            fee: 0.003,
        }
    }

    fn stable_pool() -> Pool {
        Pool {
            name: "S:100:zUSDC:zUSDT".into(),
            kind: PoolKind::Stable {
                amplification: 100.0,
            },
            coins: vec![coin(USDC, "zUSDC", 6), coin(USDT, "zUSDT", 6)],
            balances: vec![1_000_000_000_000, 1_000_000_000_000],
            fee: 0.001,
        }
    }

    fn step(from: &str, to: &str, pool: Pool) -> SwapStep {
        SwapStep {
            from_coin: from.to_string(),
            to_coin: to.to_string(),
            pool,
        }
    }

    fn exact_input(steps: Vec<SwapStep>, amount_in: f64, amount_out: f64) -> Route {
        Route {
            steps,
            amount_in,
            amount_out,
            direction: TradeDirection::ExactInput,
        }
    }

    fn null_type() -> String {
        format!("{}::base_pool::Null", DEX)
    }

    #[test]
    fn test_one_hop_weighted_round_trip() {
        let route = exact_input(vec![step(APT, USDC, weighted_pool())], 1.5, 12.345678);
        let call = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, None)
            .unwrap();

        assert_eq!(call.address, DEX);
        assert_eq!(call.function_name, "weighted_pool_scripts::swap_exact_in");
        assert_eq!(call.type_args.len(), 10);

        // Asset slots, null-padded
        assert_eq!(call.type_args[0], APT);
        assert_eq!(call.type_args[1], USDC);
        assert_eq!(call.type_args[2], null_type());
        assert_eq!(call.type_args[3], null_type());
        // Weight slots
        assert_eq!(call.type_args[4], format!("{}::weighted_pool::Weight_80", DEX));
        assert_eq!(call.type_args[5], format!("{}::weighted_pool::Weight_20", DEX));
        assert_eq!(call.type_args[6], null_type());
        assert_eq!(call.type_args[7], null_type());
        // Traversal chain
        assert_eq!(call.type_args[8], APT);
        assert_eq!(call.type_args[9], USDC);

        // 1.5 APT at 8 decimals; 12.345678 * 0.99 USDC at 6 decimals
        assert_eq!(call.args, vec![150_000_000, 12_222_221]);

        // Decode back: pool token order and scaled amounts reproduce exactly.
        let decoded_pool_coins: Vec<&String> = call.type_args[..4]
            .iter()
            .filter(|t| **t != null_type())
            .collect();
        assert_eq!(decoded_pool_coins, vec![APT, USDC]);
        assert_eq!(call.args[0], (route.amount_in * 1e8).round() as u64);
        assert_eq!(
            call.args[1],
            (route.amount_out * 0.99 * 1e6).round() as u64
        );
    }

    #[test]
    fn test_one_hop_stable_entry_point_and_null_weights() {
        let route = exact_input(vec![step(USDC, USDT, stable_pool())], 100.0, 99.8);
        let call = RouteEncoder::new(DEX)
            .encode(&route, 0.5, 6, 6, None)
            .unwrap();

        assert_eq!(call.function_name, "stable_pool_scripts::swap_exact_in");
        // Stable pools contribute null weight slots.
        assert!(call.type_args[4..8].iter().all(|t| *t == null_type()));
    }

    #[test]
    fn test_two_hop_targets_router_and_concatenates_blocks() {
        let route = exact_input(
            vec![
                step(APT, USDC, weighted_pool()),
                step(USDC, USDT, stable_pool()),
            ],
            1.5,
            19.1,
        );
        let call = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, None)
            .unwrap();

        assert_eq!(call.function_name, "router::swap_exact_in_2hop");
        // 2 pool blocks of 8 plus the 3-coin traversal chain
        assert_eq!(call.type_args.len(), 19);
        assert_eq!(call.type_args[0], APT);
        assert_eq!(call.type_args[8], USDC);
        assert_eq!(call.type_args[9], USDT);
        assert_eq!(&call.type_args[16..], &[APT, USDC, USDT]);
    }

    #[test]
    fn test_three_hop_entry_point() {
        let route = exact_input(
            vec![
                step(APT, USDC, weighted_pool()),
                step(USDC, USDT, stable_pool()),
                step(USDT, APT, weighted_pool()),
            ],
            1.0,
            1.0,
        );
        let call = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 8, None)
            .unwrap();
        assert_eq!(call.function_name, "router::swap_exact_in_3hop");
        assert_eq!(call.type_args.len(), 28);
    }

    #[test]
    fn test_route_too_long() {
        let steps = vec![
            step(APT, USDC, weighted_pool()),
            step(USDC, USDT, stable_pool()),
            step(USDT, USDC, stable_pool()),
            step(USDC, APT, weighted_pool()),
        ];
        let err = RouteEncoder::new(DEX)
            .encode(&exact_input(steps, 1.0, 1.0), 1.0, 8, 8, None)
            .unwrap_err();
        assert_eq!(err, RouterError::RouteTooLong { hops: 4 });
    }

    #[test]
    fn test_insufficient_balance() {
        let route = exact_input(vec![step(APT, USDC, weighted_pool())], 1.5, 12.0);
        let err = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, Some(1.0))
            .unwrap_err();
        assert!(matches!(err, RouterError::InsufficientBalance { .. }));

        // An exactly sufficient balance passes.
        assert!(RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, Some(1.5))
            .is_ok());
    }

    #[test]
    fn test_fractional_weight_is_fatal() {
        let mut pool = weighted_pool();
        pool.kind = PoolKind::Weighted {
            weights: vec![0.805, 0.195],
        };
        let route = exact_input(vec![step(APT, USDC, pool)], 1.0, 1.0);
        let err = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, None)
            .unwrap_err();
        assert!(matches!(err, RouterError::UnencodableWeight { .. }));
    }

    #[test]
    fn test_extreme_slippage_floors_at_zero_without_error() {
        // Range validation is the caller's job; the encoder must still
        // produce a consistent bound for an unvalidated extreme.
        let route = exact_input(vec![step(APT, USDC, weighted_pool())], 1.5, 12.0);
        let call = RouteEncoder::new(DEX)
            .encode(&route, 150.0, 8, 6, None)
            .unwrap();
        assert_eq!(call.args[1], 0);
    }

    #[test]
    fn test_exact_output_is_rejected() {
        let mut route = exact_input(vec![step(APT, USDC, weighted_pool())], 1.5, 12.0);
        route.direction = TradeDirection::ExactOutput;
        let err = RouteEncoder::new(DEX)
            .encode(&route, 1.0, 8, 6, None)
            .unwrap_err();
        assert!(matches!(err, RouterError::Validation(_)));
    }
}
