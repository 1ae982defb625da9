//! Constant-product pricing for a single SimpleSwap pool
//!
//! Mirrors the exchange contract's `getInputPrice` / `getOutputPrice` with the
//! same multiply-before-divide order, so quotes match on-chain results to the
//! base unit.

use crate::error::{QuoteError, Result};
use crate::math::{narrow, wide_add, wide_div, wide_mul, widen};
use ethers_core::types::{U256, U512};
use serde::{Deserialize, Serialize};

/// Fee multiplier numerator (0.3% fee => 997/1000)
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

/// Balances of one pool: the exchange's hub coin and the listed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserves {
    pub coin_reserve: U256,
    pub token_reserve: U256,
}

impl Reserves {
    pub fn new(coin_reserve: U256, token_reserve: U256) -> Self {
        Self {
            coin_reserve,
            token_reserve,
        }
    }

    /// Both sides empty: nobody has provided liquidity yet
    pub fn is_uninitialized(&self) -> bool {
        self.coin_reserve.is_zero() && self.token_reserve.is_zero()
    }

    /// Either side empty: no price can be quoted
    pub fn is_empty(&self) -> bool {
        self.coin_reserve.is_zero() || self.token_reserve.is_zero()
    }
}

/// Constant-product formulas with the contract's 0.3% input fee
pub struct ConstantProduct;

impl ConstantProduct {
    /// Output received for an exact input:
    /// `floor(in * 997 * R_out / (R_in * 1000 + in * 997))`
    pub fn quote_output_from_input(
        input_amount: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        ensure_reserves(input_reserve, output_reserve)?;
        ensure_amount(input_amount)?;

        let input_with_fee = wide_mul(widen(input_amount), U512::from(FEE_NUMERATOR))?;
        let numerator = wide_mul(input_with_fee, widen(output_reserve))?;
        let denominator = wide_add(
            wide_mul(widen(input_reserve), U512::from(FEE_DENOMINATOR))?,
            input_with_fee,
        )?;

        let output = narrow(wide_div(numerator, denominator)?)?;
        ensure_serviceable(output)
    }

    /// Input required for an exact output:
    /// `floor(R_in * out * 1000 / ((R_out - out) * 997)) + 1`
    ///
    /// The `+ 1` matches the contract, which rounds in the pool's favour.
    pub fn quote_input_from_output(
        output_amount: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        ensure_reserves(input_reserve, output_reserve)?;
        ensure_amount(output_amount)?;
        if output_amount >= output_reserve {
            return Err(QuoteError::InsufficientLiquidity);
        }

        let numerator = wide_mul(
            input_reserve.full_mul(output_amount),
            U512::from(FEE_DENOMINATOR),
        )?;
        let denominator = wide_mul(
            widen(output_reserve - output_amount),
            U512::from(FEE_NUMERATOR),
        )?;

        let quotient = wide_div(numerator, denominator)?;
        let input = narrow(wide_add(quotient, U512::one())?)?;
        ensure_serviceable(input)
    }
}

fn ensure_reserves(input_reserve: U256, output_reserve: U256) -> Result<()> {
    if input_reserve.is_zero() || output_reserve.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(())
}

fn ensure_amount(amount: U256) -> Result<()> {
    if amount.is_zero() {
        return Err(QuoteError::invalid_input("amount must be positive"));
    }
    Ok(())
}

fn ensure_serviceable(amount: U256) -> Result<U256> {
    if amount.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(amount)
}
