//! Pool trait definitions for the quote router

use crate::error::Result;
use crate::pricing::{ConstantProduct, Reserves};
use ethers_core::types::U256;

/// Which side of a pool the trader sells into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Sell the hub coin, buy the token
    CoinToToken,
    /// Sell the token, buy the hub coin
    TokenToCoin,
}

/// Unified pool interface used by route composition
pub trait Pool {
    /// Output received for an exact input
    fn get_amount_out(&self, amount_in: U256) -> Result<U256>;

    /// Input required for an exact output
    fn get_amount_in(&self, amount_out: U256) -> Result<U256>;

    /// `(input_reserve, output_reserve)` in trade direction
    fn get_liquidity(&self) -> (U256, U256);
}

/// A reserve pair bound to a trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedPool {
    pub reserves: Reserves,
    pub orientation: Orientation,
}

impl OrientedPool {
    pub fn new(reserves: Reserves, orientation: Orientation) -> Self {
        Self {
            reserves,
            orientation,
        }
    }
}

impl Pool for OrientedPool {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = self.get_liquidity();
        ConstantProduct::quote_output_from_input(amount_in, reserve_in, reserve_out)
    }

    fn get_amount_in(&self, amount_out: U256) -> Result<U256> {
        let (reserve_in, reserve_out) = self.get_liquidity();
        ConstantProduct::quote_input_from_output(amount_out, reserve_in, reserve_out)
    }

    fn get_liquidity(&self) -> (U256, U256) {
        match self.orientation {
            Orientation::CoinToToken => (self.reserves.coin_reserve, self.reserves.token_reserve),
            Orientation::TokenToCoin => (self.reserves.token_reserve, self.reserves.coin_reserve),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_swaps_reserves() {
        let reserves = Reserves::new(U256::from(1000), U256::from(2000));
        let buy = OrientedPool::new(reserves, Orientation::CoinToToken);
        let sell = OrientedPool::new(reserves, Orientation::TokenToCoin);

        assert_eq!(buy.get_liquidity(), (U256::from(1000), U256::from(2000)));
        assert_eq!(sell.get_liquidity(), (U256::from(2000), U256::from(1000)));
        assert_eq!(buy.get_amount_out(U256::from(100)).unwrap(), U256::from(181));
    }
}
