//! Pool catalog - typed pools out of raw listings.
//!
//! The DEX encodes each pool's invariant family in its name:
//! - Stable pools start with the reserved `S` prefix and carry the
//!   amplification factor in the second segment: `S:100:zUSDC:zUSDT`.
//! - Anything else is weighted; every segment after the first is
//!   `token-weightPercent`: `W:APT-80:zUSDC-20`.
//!
//! A malformed pool is reported and excluded; the rest of the catalog
//! still parses. Operators need partial data over total failure.

use tracing::{info, warn};

use crate::cartographer::source::{RawPool, RawPoolListing};
use crate::error::RouterError;

/// Reserved name prefix that marks a stable pool.
pub const STABLE_POOL_PREFIX: &str = "S";

/// Swap fee per invariant family, as a fraction of the input.
pub const WEIGHTED_SWAP_FEE: f64 = 0.003;
pub const STABLE_SWAP_FEE: f64 = 0.001;

/// Weights must sum to 1 within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub const MIN_POOL_ASSETS: usize = 2;
pub const MAX_POOL_ASSETS: usize = 4;

// ============================================
// TYPES
// ============================================

/// A constituent coin, resolved against the shared coin list.
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Family-specific pool parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum PoolKind {
    /// Constant-value curve; one weight fraction per constituent, summing to 1.
    Weighted { weights: Vec<f64> },
    /// Amplified stable-swap curve.
    Stable { amplification: f64 },
}

/// A typed pool. Balances stay in raw base units exactly as listed; the
/// swap math normalizes through each constituent's decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub name: String,
    pub kind: PoolKind,
    pub coins: Vec<Coin>,
    pub balances: Vec<u64>,
    pub fee: f64,
}

impl Pool {
    pub fn family(&self) -> &'static str {
        match self.kind {
            PoolKind::Weighted { .. } => "weighted",
            PoolKind::Stable { .. } => "stable",
        }
    }

    pub fn asset_index(&self, address: &str) -> Option<usize> {
        self.coins.iter().position(|c| c.address == address)
    }
}

/// The parsed catalog: resolved coin list plus every well-formed pool.
#[derive(Debug, Clone)]
pub struct PoolCatalog {
    pub coins: Vec<Coin>,
    pub pools: Vec<Pool>,
}

impl PoolCatalog {
    /// Parse a raw listing. Malformed pools are skipped with a warning,
    /// preserving listing order for the ones that survive.
    pub fn from_listing(listing: &RawPoolListing) -> Self {
        let coins: Vec<Coin> = listing
            .coins
            .iter()
            .map(|raw| Coin {
                address: raw.address.clone(),
                symbol: raw.symbol.clone(),
                decimals: raw.decimals,
            })
            .collect();

        let mut pools = Vec::with_capacity(listing.pools.len());
        let mut skipped = 0;

        for raw in &listing.pools {
            match parse_pool(raw, &coins) {
                Ok(pool) => pools.push(pool),
                Err(e) => {
                    warn!("Skipping pool: {}", e);
                    skipped += 1;
                }
            }
        }

        let weighted = pools
            .iter()
            .filter(|p| matches!(p.kind, PoolKind::Weighted { .. }))
            .count();

        info!(
            "Catalog built: {} pools ({} weighted, {} stable)",
            pools.len(),
            weighted,
            pools.len() - weighted
        );
        if skipped > 0 {
            warn!("  Skipped {} malformed pools", skipped);
        }

        Self { coins, pools }
    }

    pub fn coin_by_address(&self, address: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.address == address)
    }
}

// ============================================
// PARSING
// ============================================

fn malformed(name: &str, reason: impl Into<String>) -> RouterError {
    RouterError::MalformedPoolName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_pool(raw: &RawPool, coins: &[Coin]) -> Result<Pool, RouterError> {
    let mut constituents = Vec::new();
    let mut balances = Vec::new();

    for (slot, coin_index) in raw.coins.iter().enumerate() {
        let Some(coin_index) = coin_index else {
            continue;
        };
        let coin = coins.get(*coin_index).ok_or_else(|| {
            malformed(&raw.name, format!("coin index {} out of range", coin_index))
        })?;
        let balance = raw
            .balances
            .get(slot)
            .copied()
            .flatten()
            .ok_or_else(|| malformed(&raw.name, format!("no balance for asset slot {}", slot)))?;
        constituents.push(coin.clone());
        balances.push(balance);
    }

    if constituents.len() < MIN_POOL_ASSETS || constituents.len() > MAX_POOL_ASSETS {
        return Err(malformed(
            &raw.name,
            format!("{} assets, expected 2-4", constituents.len()),
        ));
    }

    let kind = parse_pool_name(&raw.name, constituents.len())?;
    let fee = match kind {
        PoolKind::Weighted { .. } => WEIGHTED_SWAP_FEE,
        PoolKind::Stable { .. } => STABLE_SWAP_FEE,
    };

    Ok(Pool {
        name: raw.name.clone(),
        kind,
        coins: constituents,
        balances,
        fee,
    })
}

/// Classify a pool by its name and extract the family parameters.
fn parse_pool_name(name: &str, n_assets: usize) -> Result<PoolKind, RouterError> {
    let segments: Vec<&str> = name.split(':').collect();
    if segments.len() < 2 {
        return Err(malformed(name, "expected at least two colon-delimited segments"));
    }

    if segments[0] == STABLE_POOL_PREFIX {
        let amplification: u64 = segments[1]
            .parse()
            .map_err(|_| malformed(name, format!("amplification {:?} is not an integer", segments[1])))?;
        return Ok(PoolKind::Stable {
            amplification: amplification as f64,
        });
    }

    let mut weights = Vec::with_capacity(segments.len() - 1);
    for segment in &segments[1..] {
        let Some((_, percent)) = segment.rsplit_once('-') else {
            return Err(malformed(
                name,
                format!("segment {:?} does not match token-weightPercent", segment),
            ));
        };
        let percent: u32 = percent.parse().map_err(|_| {
            malformed(
                name,
                format!("segment {:?} does not match token-weightPercent", segment),
            )
        })?;
        weights.push(percent as f64 / 100.0);
    }

    if weights.len() != n_assets {
        return Err(malformed(
            name,
            format!("{} weights for {} assets", weights.len(), n_assets),
        ));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(malformed(name, format!("weights sum to {}, expected 1", sum)));
    }

    Ok(PoolKind::Weighted { weights })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::source::RawCoin;

    fn test_coins() -> Vec<RawCoin> {
        vec![
            RawCoin {
                address: "0x1::aptos_coin::AptosCoin".into(),
                symbol: "APT".into(),
                decimals: 8,
            },
            RawCoin {
                address: "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC".into(),
                symbol: "zUSDC".into(),
                decimals: 6,
            },
            RawCoin {
                address: "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDT".into(),
                symbol: "zUSDT".into(),
                decimals: 6,
            },
        ]
    }

    fn listing(pools: Vec<RawPool>) -> RawPoolListing {
        RawPoolListing {
            coins: test_coins(),
            pools,
        }
    }

    #[test]
    fn test_parse_weighted_pool() {
        let catalog = PoolCatalog::from_listing(&listing(vec![RawPool {
            name: "W:APT-80:zUSDC-20".into(),
            coins: vec![Some(0), Some(1), None, None],
            balances: vec![Some(500_000_000_000), Some(9_000_000_000), None, None],
        }]));

        assert_eq!(catalog.pools.len(), 1);
        let pool = &catalog.pools[0];
        assert_eq!(pool.kind, PoolKind::Weighted { weights: vec![0.8, 0.2] });
        assert_eq!(pool.fee, WEIGHTED_SWAP_FEE);
        assert_eq!(pool.coins.len(), 2);
        assert_eq!(pool.balances, vec![500_000_000_000, 9_000_000_000]);
        assert_eq!(pool.coins[1].symbol, "zUSDC");
    }

    #[test]
    fn test_parse_stable_pool() {
        let catalog = PoolCatalog::from_listing(&listing(vec![RawPool {
            name: "S:100:zUSDC:zUSDT".into(),
            coins: vec![Some(1), Some(2), None, None],
            balances: vec![Some(1_000_000_000_000), Some(1_000_000_000_000), None, None],
        }]));

        assert_eq!(catalog.pools.len(), 1);
        let pool = &catalog.pools[0];
        assert_eq!(pool.kind, PoolKind::Stable { amplification: 100.0 });
        assert_eq!(pool.fee, STABLE_SWAP_FEE);
        assert_eq!(pool.family(), "stable");
    }

    #[test]
    fn test_malformed_pool_is_skipped_not_fatal() {
        let catalog = PoolCatalog::from_listing(&listing(vec![
            RawPool {
                name: "W:APT-80:zUSDC".into(), // missing weight on second segment
                coins: vec![Some(0), Some(1), None, None],
                balances: vec![Some(1), Some(1), None, None],
            },
            RawPool {
                name: "W:APT-50:zUSDC-50".into(),
                coins: vec![Some(0), Some(1), None, None],
                balances: vec![Some(1), Some(1), None, None],
            },
        ]));

        assert_eq!(catalog.pools.len(), 1);
        assert_eq!(catalog.pools[0].name, "W:APT-50:zUSDC-50");
    }

    #[test]
    fn test_stable_amplification_must_be_numeric() {
        let err = parse_pool_name("S:fast", 2).unwrap_err();
        assert!(matches!(err, RouterError::MalformedPoolName { .. }));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = parse_pool_name("W:APT-80:zUSDC-30", 2).unwrap_err();
        match err {
            RouterError::MalformedPoolName { reason, .. } => {
                assert!(reason.contains("sum"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_weight_count_must_match_assets() {
        let err = parse_pool_name("W:APT-50:zUSDC-50", 3).unwrap_err();
        assert!(matches!(err, RouterError::MalformedPoolName { .. }));
    }

    #[test]
    fn test_coin_index_out_of_range() {
        let catalog = PoolCatalog::from_listing(&listing(vec![RawPool {
            name: "W:APT-50:zUSDC-50".into(),
            coins: vec![Some(0), Some(9), None, None],
            balances: vec![Some(1), Some(1), None, None],
        }]));
        assert!(catalog.pools.is_empty());
    }

    #[test]
    fn test_null_slots_are_dropped() {
        let catalog = PoolCatalog::from_listing(&listing(vec![RawPool {
            name: "S:85:APT:zUSDC:zUSDT".into(),
            coins: vec![Some(0), None, Some(1), Some(2)],
            balances: vec![Some(10), None, Some(20), Some(30)],
        }]));

        let pool = &catalog.pools[0];
        assert_eq!(pool.coins.len(), 3);
        assert_eq!(pool.balances, vec![10, 20, 30]);
    }
}
