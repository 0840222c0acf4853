//! Phase 1: The Cartographer (Data Ingest)
//!
//! Fetches the pool listing, parses it into typed pools, and builds the
//! routing graph. Everything here is rebuilt from scratch on each scan;
//! reserves are only valid at the fetch instant.

mod catalog;
mod graph;
mod source;

pub use catalog::{
    Coin, Pool, PoolCatalog, PoolKind, MAX_POOL_ASSETS, STABLE_POOL_PREFIX, STABLE_SWAP_FEE,
    WEIGHTED_SWAP_FEE,
};
pub use graph::{EdgeData, RouteGraph};
pub use source::{
    HttpPoolSource, PoolDataSource, RawCoin, RawPool, RawPoolListing, LISTING_CACHE_SECS,
    POOL_ASSET_SLOTS,
};
