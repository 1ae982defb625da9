//! Swap routes through a hub-asset exchange
//!
//! Every SimpleSwap exchange lists tokens against one hub coin. A trade that
//! touches the hub uses a single pool; token-to-token trades chain the
//! token/hub pool of the input token with the hub/token pool of the output
//! token.

use crate::error::{QuoteError, Result};
use crate::pool_traits::{Orientation, OrientedPool, Pool};
use crate::pricing::Reserves;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Which side of the swap form the user typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// Input is exact, output is computed
    ExactInput,
    /// Output is exact, input is computed
    ExactOutput,
}

impl SwapDirection {
    pub fn flipped(self) -> Self {
        match self {
            SwapDirection::ExactInput => SwapDirection::ExactOutput,
            SwapDirection::ExactOutput => SwapDirection::ExactInput,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapKind {
    HubToToken,
    TokenToHub,
    TokenToToken,
}

impl SwapKind {
    /// Classify a pair against an exchange's hub coin.
    ///
    /// Returns `None` when a side is unset or both sides name the same asset.
    pub fn classify(input: Option<Address>, output: Option<Address>, hub: Address) -> Option<Self> {
        let (input, output) = (input?, output?);
        if input == output {
            return None;
        }
        Some(if input == hub {
            SwapKind::HubToToken
        } else if output == hub {
            SwapKind::TokenToHub
        } else {
            SwapKind::TokenToToken
        })
    }

    pub fn is_two_hop(self) -> bool {
        matches!(self, SwapKind::TokenToToken)
    }
}

/// Pools a quote runs through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapRoute {
    /// One pool, hub coin on one side
    Direct {
        pool: Reserves,
        orientation: Orientation,
    },
    /// token -> hub -> token through two pools of the same exchange
    TwoHop {
        input_pool: Reserves,
        output_pool: Reserves,
    },
}

impl SwapRoute {
    pub fn hub_to_token(pool: Reserves) -> Self {
        SwapRoute::Direct {
            pool,
            orientation: Orientation::CoinToToken,
        }
    }

    pub fn token_to_hub(pool: Reserves) -> Self {
        SwapRoute::Direct {
            pool,
            orientation: Orientation::TokenToCoin,
        }
    }

    pub fn kind(&self) -> SwapKind {
        match self {
            SwapRoute::Direct {
                orientation: Orientation::CoinToToken,
                ..
            } => SwapKind::HubToToken,
            SwapRoute::Direct {
                orientation: Orientation::TokenToCoin,
                ..
            } => SwapKind::TokenToHub,
            SwapRoute::TwoHop { .. } => SwapKind::TokenToToken,
        }
    }

    pub fn is_two_hop(&self) -> bool {
        self.kind().is_two_hop()
    }
}

/// Result of quoting one route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub direction: SwapDirection,
    pub kind: SwapKind,
    /// The computed side of the swap form
    pub dependent: U256,
    /// Hub-coin amount between the two legs of a two-hop route
    pub intermediate: Option<U256>,
}

impl Quote {
    /// `(input, output)` given the amount the user typed
    pub fn amounts(&self, independent: U256) -> (U256, U256) {
        match self.direction {
            SwapDirection::ExactInput => (independent, self.dependent),
            SwapDirection::ExactOutput => (self.dependent, independent),
        }
    }
}

/// Quote `amount` along `route`.
pub fn compute_quote(route: &SwapRoute, direction: SwapDirection, amount: U256) -> Result<Quote> {
    if amount.is_zero() {
        return Err(QuoteError::invalid_input("amount must be positive"));
    }

    let (dependent, intermediate) = match *route {
        SwapRoute::Direct { pool, orientation } => {
            let pool = OrientedPool::new(pool, orientation);
            let dependent = match direction {
                SwapDirection::ExactInput => pool.get_amount_out(amount)?,
                SwapDirection::ExactOutput => pool.get_amount_in(amount)?,
            };
            (dependent, None)
        }
        SwapRoute::TwoHop {
            input_pool,
            output_pool,
        } => {
            let sell = OrientedPool::new(input_pool, Orientation::TokenToCoin);
            let buy = OrientedPool::new(output_pool, Orientation::CoinToToken);
            match direction {
                SwapDirection::ExactInput => {
                    let hub_amount = nonzero(sell.get_amount_out(amount)?)?;
                    (buy.get_amount_out(hub_amount)?, Some(hub_amount))
                }
                SwapDirection::ExactOutput => {
                    let hub_amount = nonzero(buy.get_amount_in(amount)?)?;
                    (sell.get_amount_in(hub_amount)?, Some(hub_amount))
                }
            }
        }
    };

    Ok(Quote {
        direction,
        kind: route.kind(),
        dependent,
        intermediate,
    })
}

fn nonzero(amount: U256) -> Result<U256> {
    if amount.is_zero() {
        Err(QuoteError::InsufficientLiquidity)
    } else {
        Ok(amount)
    }
}

/// One hub exchange: a contract holding a pool per listed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exchange {
    pub address: Address,
    pub hub: Address,
    pub hub_decimals: u8,
}

impl Exchange {
    pub fn new(address: Address, hub: Address, hub_decimals: u8) -> Self {
        Self {
            address,
            hub,
            hub_decimals,
        }
    }

    pub fn classify(&self, input: Address, output: Address) -> Result<SwapKind> {
        SwapKind::classify(Some(input), Some(output), self.hub).ok_or(QuoteError::UnroutablePair)
    }

    /// Build the route for `input -> output` from this exchange's pool reserves.
    ///
    /// `reserves_of` returns the pool of a listed token; a pool that is not
    /// known yet makes the pair unserviceable on this exchange.
    pub fn route<F>(&self, input: Address, output: Address, reserves_of: F) -> Result<SwapRoute>
    where
        F: Fn(Address) -> Option<Reserves>,
    {
        let pool_of = |token: Address| reserves_of(token).ok_or(QuoteError::InsufficientLiquidity);
        Ok(match self.classify(input, output)? {
            SwapKind::HubToToken => SwapRoute::hub_to_token(pool_of(output)?),
            SwapKind::TokenToHub => SwapRoute::token_to_hub(pool_of(input)?),
            SwapKind::TokenToToken => SwapRoute::TwoHop {
                input_pool: pool_of(input)?,
                output_pool: pool_of(output)?,
            },
        })
    }
}
