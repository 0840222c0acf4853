//! Pool listing ingestion.
//!
//! The DEX publishes its coin registry and pool listing as two JSON
//! endpoints. Both are fetched concurrently and the combined listing is
//! cached for a few seconds so back-to-back scans do not refetch.
//!
//! This is the only suspension point in the router: everything downstream
//! of `fetch()` is pure computation on the returned snapshot.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::RouterError;

/// How long a fetched listing stays fresh. Pool reserves are only valid at
/// the fetch instant, so this stays short.
pub const LISTING_CACHE_SECS: u64 = 10;

/// Every pool entry carries this many asset slots; unused slots are null.
pub const POOL_ASSET_SLOTS: usize = 4;

// ============================================
// WIRE TYPES
// ============================================

/// One entry of the shared coin list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawCoin {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

/// One raw pool entry as listed by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPool {
    /// Structured name encoding the invariant family and its parameters.
    pub name: String,
    /// Indices into the shared coin list, one per asset slot.
    pub coins: Vec<Option<usize>>,
    /// Raw base-unit balances, paired slot-for-slot with `coins`.
    pub balances: Vec<Option<u64>>,
}

/// A complete listing snapshot: shared coin list plus pool entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPoolListing {
    pub coins: Vec<RawCoin>,
    pub pools: Vec<RawPool>,
}

// ============================================
// DATA SOURCE
// ============================================

/// Supplier of raw pool listings. The HTTP implementation below is the
/// production one; tests substitute canned listings.
pub trait PoolDataSource {
    fn fetch(
        &self,
    ) -> impl std::future::Future<Output = Result<RawPoolListing, RouterError>> + Send;
}

#[derive(Debug, Clone)]
struct CachedListing {
    listing: RawPoolListing,
    fetched_at: Instant,
}

/// Fetches `{base}/coins` and `{base}/pools` with a short-lived cache.
pub struct HttpPoolSource {
    base_url: String,
    client: reqwest::Client,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CachedListing>>>,
}

impl HttpPoolSource {
    pub fn new(base_url: impl Into<String>, cache_ttl_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    fn cached(&self) -> Option<RawPoolListing> {
        if let Ok(guard) = self.cache.read() {
            if let Some(ref cached) = *guard {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    return Some(cached.listing.clone());
                }
            }
        }
        None
    }

    fn store(&self, listing: RawPoolListing) {
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(CachedListing {
                listing,
                fetched_at: Instant::now(),
            });
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RouterError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RouterError::Source(format!("GET {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(RouterError::Source(format!(
                "GET {}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RouterError::Source(format!("decoding {}: {}", url, e)))
    }
}

impl PoolDataSource for HttpPoolSource {
    async fn fetch(&self) -> Result<RawPoolListing, RouterError> {
        if let Some(listing) = self.cached() {
            debug!("Using cached pool listing ({} pools)", listing.pools.len());
            return Ok(listing);
        }

        let coins_url = format!("{}/coins", self.base_url);
        let pools_url = format!("{}/pools", self.base_url);

        let (coins, pools) = futures::try_join!(
            self.get_json::<Vec<RawCoin>>(&coins_url),
            self.get_json::<Vec<RawPool>>(&pools_url),
        )?;

        info!("Fetched listing: {} coins, {} pools", coins.len(), pools.len());

        let listing = RawPoolListing { coins, pools };
        self.store(listing.clone());
        Ok(listing)
    }
}
