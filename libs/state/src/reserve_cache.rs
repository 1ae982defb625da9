//! Block-Scoped Reserve Cache
//!
//! Holds the last reserve read per `(chain, exchange, token)` together with
//! the block it was taken at. A new block evicts every older read, so quotes
//! never mix balances from different blocks.

use crate::traits::ReserveProvider;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use simpleswap_amm::{Address, Reserves};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The chain moved on while the read was in flight
    #[error("Stale read discarded: read at block {read_at}, current block {current}")]
    StaleRead { read_at: u64, current: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReserveKey {
    pub chain_id: u64,
    pub exchange: Address,
    pub token: Address,
}

impl ReserveKey {
    pub fn new(chain_id: u64, exchange: Address, token: Address) -> Self {
        Self {
            chain_id,
            exchange,
            token,
        }
    }
}

/// One cached read. `reserves` is `None` when the read failed; the failure
/// stays cached until the next block like a successful read does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveEntry {
    pub reserves: Option<Reserves>,
    pub block: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ReserveCacheStats {
    pub cached_pools: usize,
    pub current_block: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub failed_reads: u64,
    pub discarded_reads: u64,
}

pub struct ReserveCache {
    entries: DashMap<ReserveKey, ReserveEntry>,
    current_block: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    failed_reads: AtomicU64,
    discarded_reads: AtomicU64,
}

impl Default for ReserveCache {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ReserveCache {
    pub fn new(current_block: u64) -> Self {
        Self {
            entries: DashMap::new(),
            current_block: AtomicU64::new(current_block),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            failed_reads: AtomicU64::new(0),
            discarded_reads: AtomicU64::new(0),
        }
    }

    pub fn current_block(&self) -> u64 {
        self.current_block.load(Ordering::Acquire)
    }

    /// Move to `block` and evict reads taken before it.
    ///
    /// Returns the number of evicted entries. A block at or below the current
    /// one changes nothing.
    pub fn advance_block(&self, block: u64) -> usize {
        let previous = self.current_block.fetch_max(block, Ordering::AcqRel);
        if block <= previous {
            return 0;
        }

        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.block >= block);
        let evicted = before.saturating_sub(self.entries.len());
        debug!(previous, block, evicted, "advanced reserve cache");
        evicted
    }

    /// Cached entry for `key`, current or not
    pub fn get(&self, key: &ReserveKey) -> Option<ReserveEntry> {
        match self.entries.get(key) {
            Some(entry) => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                Some(*entry)
            }
            None => {
                self.cache_misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Reserves read at the current block. A failed read is `None` as well.
    ///
    /// Does not touch the hit/miss counters; those track provider reads.
    pub fn reserves(&self, key: &ReserveKey) -> Option<Reserves> {
        let current = self.current_block();
        self.entries
            .get(key)
            .filter(|entry| entry.block == current)
            .and_then(|entry| entry.reserves)
    }

    /// True when nothing is cached for `key` at the current block
    pub fn needs_refresh(&self, key: &ReserveKey) -> bool {
        let current = self.current_block();
        self.entries
            .get(key)
            .map_or(true, |entry| entry.block != current)
    }

    /// Store a read taken at `block`. Reads older than the current block are
    /// dropped and reported as stale.
    pub fn insert(
        &self,
        key: ReserveKey,
        reserves: Option<Reserves>,
        block: u64,
    ) -> Result<(), CacheError> {
        let current = self.current_block();
        if block < current {
            self.discarded_reads.fetch_add(1, Ordering::Relaxed);
            return Err(CacheError::StaleRead {
                read_at: block,
                current,
            });
        }
        self.entries.insert(key, ReserveEntry { reserves, block });
        Ok(())
    }

    /// Read `key` through `provider` and cache the result at the block the
    /// read started in.
    ///
    /// A failed read is logged and cached as `None`. If the block advanced
    /// before the read resolved, the result is discarded.
    pub async fn refresh<P>(
        &self,
        provider: &P,
        key: ReserveKey,
    ) -> Result<Option<Reserves>, CacheError>
    where
        P: ReserveProvider + ?Sized,
    {
        let block = self.current_block();
        let reserves = match provider
            .get_reserves(key.chain_id, key.exchange, key.token)
            .await
        {
            Ok(reserves) => Some(reserves),
            Err(err) => {
                self.failed_reads.fetch_add(1, Ordering::Relaxed);
                warn!(
                    chain_id = key.chain_id,
                    exchange = ?key.exchange,
                    token = ?key.token,
                    %err,
                    "reserve read failed"
                );
                None
            }
        };

        let current = self.current_block();
        if current != block {
            self.discarded_reads.fetch_add(1, Ordering::Relaxed);
            debug!(read_at = block, current, "discarding reserve read from previous block");
            return Err(CacheError::StaleRead {
                read_at: block,
                current,
            });
        }

        self.insert(key, reserves, block)?;
        Ok(reserves)
    }

    /// Cached reserves when current, otherwise a fresh read
    pub async fn get_or_refresh<P>(
        &self,
        provider: &P,
        key: ReserveKey,
    ) -> Result<Option<Reserves>, CacheError>
    where
        P: ReserveProvider + ?Sized,
    {
        let current = self.current_block();
        let cached = self.entries.get(&key).map(|entry| *entry);
        if let Some(entry) = cached.filter(|entry| entry.block == current) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(entry.reserves);
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.refresh(provider, key).await
    }

    /// Lookup closure for building routes on one exchange from cached reads
    pub fn pools_of(
        &self,
        chain_id: u64,
        exchange: Address,
    ) -> impl Fn(Address) -> Option<Reserves> + '_ {
        move |token| self.reserves(&ReserveKey::new(chain_id, exchange, token))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> ReserveCacheStats {
        ReserveCacheStats {
            cached_pools: self.entries.len(),
            current_block: self.current_block(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            failed_reads: self.failed_reads.load(Ordering::Relaxed),
            discarded_reads: self.discarded_reads.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StaticReserveProvider;
    use simpleswap_amm::U256;

    fn key(token: u64) -> ReserveKey {
        ReserveKey::new(4, Address::from_low_u64_be(0xE0), Address::from_low_u64_be(token))
    }

    fn pool(coin: u64, token: u64) -> Reserves {
        Reserves::new(U256::from(coin), U256::from(token))
    }

    #[test]
    fn test_new_block_evicts_older_reads() {
        let cache = ReserveCache::new(10);
        cache.insert(key(1), Some(pool(1, 2)), 10).unwrap();
        cache.insert(key(2), None, 10).unwrap();
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.advance_block(11), 2);
        assert!(cache.is_empty());
        assert!(cache.needs_refresh(&key(1)));
    }

    #[test]
    fn test_older_block_signal_is_ignored() {
        let cache = ReserveCache::new(10);
        cache.insert(key(1), Some(pool(1, 2)), 10).unwrap();

        assert_eq!(cache.advance_block(9), 0);
        assert_eq!(cache.advance_block(10), 0);
        assert_eq!(cache.current_block(), 10);
        assert_eq!(cache.reserves(&key(1)), Some(pool(1, 2)));
    }

    #[test]
    fn test_insert_rejects_read_from_past_block() {
        let cache = ReserveCache::new(12);
        assert_eq!(
            cache.insert(key(1), Some(pool(1, 2)), 11),
            Err(CacheError::StaleRead {
                read_at: 11,
                current: 12
            })
        );
        assert!(cache.is_empty());
        assert_eq!(cache.stats().discarded_reads, 1);
    }

    #[tokio::test]
    async fn test_refresh_caches_success_and_failure() {
        let provider = StaticReserveProvider::new();
        provider.insert(key(1), pool(1_000, 2_000));
        let cache = ReserveCache::new(5);

        assert_eq!(cache.refresh(&provider, key(1)).await, Ok(Some(pool(1_000, 2_000))));
        // missing pool is cached as an empty read
        assert_eq!(cache.refresh(&provider, key(2)).await, Ok(None));
        assert!(!cache.needs_refresh(&key(2)));
        assert_eq!(cache.get(&key(2)).unwrap().reserves, None);
        assert_eq!(cache.stats().failed_reads, 1);
    }

    #[tokio::test]
    async fn test_get_or_refresh_reads_once_per_block() {
        let provider = StaticReserveProvider::new();
        provider.insert(key(1), pool(1_000, 2_000));
        let cache = ReserveCache::new(1);

        for _ in 0..3 {
            cache.get_or_refresh(&provider, key(1)).await.unwrap();
        }
        assert_eq!(provider.reads(), 1);

        cache.advance_block(2);
        provider.insert(key(1), pool(1_100, 1_900));
        assert_eq!(
            cache.get_or_refresh(&provider, key(1)).await,
            Ok(Some(pool(1_100, 1_900)))
        );
        assert_eq!(provider.reads(), 2);
    }

    #[tokio::test]
    async fn test_route_lookups_leave_hit_counters_alone() {
        let provider = StaticReserveProvider::new();
        provider.insert(key(1), pool(1_000, 2_000));
        let cache = ReserveCache::new(3);

        cache.get_or_refresh(&provider, key(1)).await.unwrap();
        let lookup = cache.pools_of(4, Address::from_low_u64_be(0xE0));
        for _ in 0..3 {
            assert_eq!(lookup(Address::from_low_u64_be(1)), Some(pool(1_000, 2_000)));
        }
        assert_eq!(lookup(Address::from_low_u64_be(9)), None);

        let stats = cache.stats();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.cache_misses, 1);

        cache.get_or_refresh(&provider, key(1)).await.unwrap();
        assert_eq!(cache.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_entry_from_older_block_is_read_again() {
        let provider = StaticReserveProvider::new();
        provider.insert(key(1), pool(1_000, 2_000));
        let cache = ReserveCache::new(8);
        cache.insert(key(1), None, 8).unwrap();

        // move the block without evicting, as a racing advance would leave it
        cache.current_block.store(9, Ordering::Release);
        assert_eq!(
            cache.get_or_refresh(&provider, key(1)).await,
            Ok(Some(pool(1_000, 2_000)))
        );
        assert_eq!(provider.reads(), 1);
    }

    #[test]
    fn test_pools_of_feeds_route_building() {
        let cache = ReserveCache::new(3);
        cache.insert(key(1), Some(pool(1_000, 2_000)), 3).unwrap();
        cache.insert(key(2), None, 3).unwrap();

        let lookup = cache.pools_of(4, Address::from_low_u64_be(0xE0));
        assert_eq!(lookup(Address::from_low_u64_be(1)), Some(pool(1_000, 2_000)));
        assert_eq!(lookup(Address::from_low_u64_be(2)), None);
        assert_eq!(lookup(Address::from_low_u64_be(3)), None);
    }
}
