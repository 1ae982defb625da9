//! Token metadata per chain
//!
//! Seeded with the whitelisted tokens of each deployment. Unknown tokens are
//! resolved through a [`TokenProvider`] and cached once all three fields are
//! known.

use crate::traits::{ProviderError, TokenProvider};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use simpleswap_amm::units::MAX_DECIMALS;
use simpleswap_amm::Address;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: DashMap<(u64, Address), TokenInfo>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `info`, replacing any earlier entry.
    ///
    /// Precision above 18 decimals cannot be formatted and is rejected.
    pub fn register(
        &self,
        chain_id: u64,
        token: Address,
        info: TokenInfo,
    ) -> Result<(), ProviderError> {
        if info.decimals > MAX_DECIMALS {
            return Err(ProviderError::InvalidData(format!(
                "{} declares {} decimals",
                info.symbol, info.decimals
            )));
        }
        self.tokens.insert((chain_id, token), info);
        Ok(())
    }

    pub fn get(&self, chain_id: u64, token: Address) -> Option<TokenInfo> {
        self.tokens.get(&(chain_id, token)).map(|entry| entry.clone())
    }

    pub fn decimals(&self, chain_id: u64, token: Address) -> Option<u8> {
        self.tokens.get(&(chain_id, token)).map(|entry| entry.decimals)
    }

    pub fn symbol(&self, chain_id: u64, token: Address) -> Option<String> {
        self.tokens.get(&(chain_id, token)).map(|entry| entry.symbol.clone())
    }

    /// Look up `symbol` on `chain_id`, ignoring case
    pub fn find_by_symbol(&self, chain_id: u64, symbol: &str) -> Option<(Address, TokenInfo)> {
        self.tokens
            .iter()
            .filter(|entry| entry.key().0 == chain_id && entry.symbol.eq_ignore_ascii_case(symbol))
            .map(|entry| (entry.key().1, entry.value().clone()))
            .min_by_key(|(address, _)| *address)
    }

    /// All tokens known on `chain_id`, ordered by address
    pub fn tokens_on(&self, chain_id: u64) -> Vec<(Address, TokenInfo)> {
        let mut tokens: Vec<_> = self
            .tokens
            .iter()
            .filter(|entry| entry.key().0 == chain_id)
            .map(|entry| (entry.key().1, entry.value().clone()))
            .collect();
        tokens.sort_by_key(|(address, _)| *address);
        tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Cached details, otherwise read all three fields through `provider`.
    ///
    /// Nothing is cached unless every field resolves.
    pub async fn resolve<P>(
        &self,
        provider: &P,
        chain_id: u64,
        token: Address,
    ) -> Result<TokenInfo, ProviderError>
    where
        P: TokenProvider + ?Sized,
    {
        if let Some(info) = self.get(chain_id, token) {
            return Ok(info);
        }

        let name = provider.token_name(chain_id, token).await?;
        let symbol = provider.token_symbol(chain_id, token).await?;
        let decimals = provider.token_decimals(chain_id, token).await?;

        let info = TokenInfo::new(name, symbol, decimals);
        self.register(chain_id, token, info.clone())?;
        debug!(chain_id, ?token, symbol = %info.symbol, decimals, "resolved token details");
        Ok(info)
    }
}

#[async_trait]
impl TokenProvider for TokenRegistry {
    async fn token_name(&self, chain_id: u64, token: Address) -> Result<String, ProviderError> {
        self.get(chain_id, token)
            .map(|info| info.name)
            .ok_or(ProviderError::TokenNotFound(token))
    }

    async fn token_symbol(&self, chain_id: u64, token: Address) -> Result<String, ProviderError> {
        self.symbol(chain_id, token)
            .ok_or(ProviderError::TokenNotFound(token))
    }

    async fn token_decimals(&self, chain_id: u64, token: Address) -> Result<u8, ProviderError> {
        self.decimals(chain_id, token)
            .ok_or(ProviderError::TokenNotFound(token))
    }
}
