//! Known-coin registry for the Wayfinder.
//!
//! Covers the coins that dominate routing on mainnet:
//! - Native APT and liquid-staking derivatives (stAPT, amAPT)
//! - LayerZero bridged assets (zUSDC, zUSDT, zWETH)
//! - Wormhole USDC
//! - DEX-native governance and stablecoins
//!
//! The pool listing carries its own coin metadata; this table is used for
//! human-readable path printing and as a decimals fallback when a listing
//! entry is incomplete.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// A coin we recognize by its fully-qualified Move type.
#[derive(Debug, Clone)]
pub struct KnownCoin {
    pub symbol: &'static str,
    pub address: &'static str,
    pub decimals: u8,
    pub category: CoinCategory,
}

/// Coin categories for filtering and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinCategory {
    /// Chain-native coin
    Native,

    /// Bridged stablecoins (LayerZero, Wormhole)
    BridgedStable,

    /// Other bridged assets
    BridgedVolatile,

    /// Liquid staking derivatives
    LiquidStaking,

    /// DEX-native stablecoins
    NativeStable,

    /// Governance tokens
    Governance,
}

// ============================================
// THE REGISTRY
// ============================================

pub fn known_coins() -> Vec<KnownCoin> {
    vec![
        KnownCoin {
            symbol: "APT",
            address: "0x1::aptos_coin::AptosCoin",
            decimals: 8,
            category: CoinCategory::Native,
        },
        KnownCoin {
            symbol: "zUSDC",
            address: "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC",
            decimals: 6,
            category: CoinCategory::BridgedStable,
        },
        KnownCoin {
            symbol: "zUSDT",
            address: "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDT",
            decimals: 6,
            category: CoinCategory::BridgedStable,
        },
        KnownCoin {
            symbol: "zWETH",
            address: "0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::WETH",
            decimals: 6,
            category: CoinCategory::BridgedVolatile,
        },
        KnownCoin {
            symbol: "whUSDC",
            address: "0x5e156f1207d0ebfa19a9eeff00d62a282278fb8719f4fab3a586a0a2c0fffbea::coin::T",
            decimals: 6,
            category: CoinCategory::BridgedStable,
        },
        KnownCoin {
            symbol: "stAPT",
            address: "0x111ae3e5bc816a5e63c2da97d0aa3886519e0cd5e4b046659fa35796bd11542a::stapt_token::StakedApt",
            decimals: 8,
            category: CoinCategory::LiquidStaking,
        },
        KnownCoin {
            symbol: "amAPT",
            address: "0x111ae3e5bc816a5e63c2da97d0aa3886519e0cd5e4b046659fa35796bd11542a::amapt_token::AmnisApt",
            decimals: 8,
            category: CoinCategory::LiquidStaking,
        },
        KnownCoin {
            symbol: "MOD",
            address: "0x6f986d146e4a90b828d8c12c14b6f4e003fdff11a8eecceceb63744363eaac01::mod_coin::MOD",
            decimals: 8,
            category: CoinCategory::NativeStable,
        },
        KnownCoin {
            symbol: "THL",
            address: "0x7fd500c11216f0fe3095d0c4b8aa4d64a4e2e04f83758462f2b127255643615::thl_coin::THL",
            decimals: 8,
            category: CoinCategory::Governance,
        },
    ]
}

lazy_static! {
    static ref COINS_BY_ADDRESS: HashMap<&'static str, KnownCoin> = known_coins()
        .into_iter()
        .map(|coin| (coin.address, coin))
        .collect();
}

/// Symbol for a coin type, if we track it.
pub fn symbol_for(address: &str) -> Option<&'static str> {
    COINS_BY_ADDRESS.get(address).map(|c| c.symbol)
}

/// Decimals fallback for listings that omit a coin's precision.
pub fn decimals_for(address: &str) -> Option<u8> {
    COINS_BY_ADDRESS.get(address).map(|c| c.decimals)
}

/// Short display form: symbol if known, otherwise a truncated coin type.
pub fn format_coin(address: &str) -> String {
    if let Some(symbol) = symbol_for(address) {
        return symbol.to_string();
    }
    match address.split_once("::") {
        Some((account, rest)) => {
            let head = if account.len() > 8 { &account[..8] } else { account };
            match rest.rsplit_once("::") {
                Some((_, name)) => format!("{}…::{}", head, name),
                None => format!("{}…::{}", head, rest),
            }
        }
        None => address.to_string(),
    }
}
