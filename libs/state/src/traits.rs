//! Provider Traits
//!
//! Seams to the chain: anything that can read pool balances or token metadata.
//! Implementations live outside the engine (an RPC client, a snapshot file,
//! a test double).

use async_trait::async_trait;
use simpleswap_amm::{Address, Reserves};
use thiserror::Error;

/// Failures of an external read
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No pool for token {token:?} on exchange {exchange:?}")]
    PoolNotFound { exchange: Address, token: Address },

    #[error("Unknown token {0:?}")]
    TokenNotFound(Address),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid data from provider: {0}")]
    InvalidData(String),
}

/// Reads the current balances of one pool
#[async_trait]
pub trait ReserveProvider: Send + Sync {
    async fn get_reserves(
        &self,
        chain_id: u64,
        exchange: Address,
        token: Address,
    ) -> Result<Reserves, ProviderError>;
}

/// Reads ERC-20 metadata used for display and unit conversion
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token_name(&self, chain_id: u64, token: Address) -> Result<String, ProviderError>;

    async fn token_symbol(&self, chain_id: u64, token: Address) -> Result<String, ProviderError>;

    async fn token_decimals(&self, chain_id: u64, token: Address) -> Result<u8, ProviderError>;
}
