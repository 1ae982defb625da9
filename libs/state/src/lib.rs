//! # SimpleSwap State - Reserve and Token Caches
//!
//! ## Purpose
//!
//! Caches the chain reads the quote engine depends on. Reserves are scoped to
//! the block they were read at and evicted when a new block arrives; token
//! metadata is cached for the life of the process.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`ReserveProvider`] and [`TokenProvider`]
//!   implementations, a current-block signal via
//!   [`ReserveCache::advance_block`]
//! - **Output Destinations**: route building in `simpleswap-amm`
//!   ([`ReserveCache::pools_of`]), decimals for unit parsing and rates
//!
//! ## Architecture Role
//!
//! ```text
//! chain reads -> [ReserveProvider] -> [ReserveCache] -> Exchange::route -> quote
//!                [TokenProvider]   -> [TokenRegistry] -> parse/format/rates
//! ```
//!
//! Both caches are `Send + Sync` and safe to share behind an `Arc`.

pub mod reserve_cache;
pub mod snapshot;
pub mod token_registry;
pub mod traits;

pub use reserve_cache::{CacheError, ReserveCache, ReserveCacheStats, ReserveEntry, ReserveKey};
pub use snapshot::StaticReserveProvider;
pub use token_registry::{TokenInfo, TokenRegistry};
pub use traits::{ProviderError, ReserveProvider, TokenProvider};
