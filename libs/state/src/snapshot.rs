//! In-memory reserve snapshot
//!
//! Serves reserves captured elsewhere (a config file, a fixture) through the
//! same [`ReserveProvider`] seam a live chain reader would use.

use crate::reserve_cache::ReserveKey;
use crate::traits::{ProviderError, ReserveProvider};
use async_trait::async_trait;
use dashmap::DashMap;
use simpleswap_amm::{Address, Reserves};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct StaticReserveProvider {
    pools: DashMap<ReserveKey, Reserves>,
    reads: AtomicU64,
}

impl StaticReserveProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: ReserveKey, reserves: Reserves) {
        self.pools.insert(key, reserves);
    }

    pub fn remove(&self, key: &ReserveKey) -> Option<Reserves> {
        self.pools.remove(key).map(|(_, reserves)| reserves)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Number of reads served so far, failed ones included
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl FromIterator<(ReserveKey, Reserves)> for StaticReserveProvider {
    fn from_iter<I: IntoIterator<Item = (ReserveKey, Reserves)>>(iter: I) -> Self {
        let provider = Self::new();
        for (key, reserves) in iter {
            provider.insert(key, reserves);
        }
        provider
    }
}

#[async_trait]
impl ReserveProvider for StaticReserveProvider {
    async fn get_reserves(
        &self,
        chain_id: u64,
        exchange: Address,
        token: Address,
    ) -> Result<Reserves, ProviderError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.pools
            .get(&ReserveKey::new(chain_id, exchange, token))
            .map(|entry| *entry)
            .ok_or(ProviderError::PoolNotFound { exchange, token })
    }
}
