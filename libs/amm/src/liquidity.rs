//! Add/remove liquidity arithmetic
//!
//! Pool-token shares are 18-decimal fractions of the total supply. The first
//! provider of an uninitialized pool sets the rate and mints liquidity equal to
//! the coin deposited.

use crate::error::{QuoteError, Result};
use crate::math::{div, mul, mul_div, pow10};
use crate::pricing::Reserves;
use crate::rate::RATE_DECIMALS;
use ethers_core::types::U256;

fn one() -> Result<U256> {
    Ok(pow10(RATE_DECIMALS)?)
}

pub fn is_new_exchange(reserves: &Reserves) -> bool {
    reserves.is_uninitialized()
}

/// Fraction of the pool owned by `balance`, 18 decimals. `None` for an
/// empty supply.
pub fn pool_share(balance: U256, total_supply: U256) -> Option<U256> {
    if total_supply.is_zero() {
        return None;
    }
    mul_div(balance, one().ok()?, total_supply).ok()
}

/// Portion of `reserve` owned at `share`
pub fn share_of_reserve(reserve: U256, share: U256) -> Result<U256> {
    Ok(mul_div(reserve, share, one()?)?)
}

/// Pool tokens minted for depositing `coin_amount`
pub fn liquidity_minted(
    total_supply: U256,
    coin_amount: U256,
    reserves: &Reserves,
) -> Result<U256> {
    if is_new_exchange(reserves) {
        return Ok(coin_amount);
    }
    if reserves.coin_reserve.is_zero() {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(mul_div(total_supply, coin_amount, reserves.coin_reserve)?)
}

/// Reserve backing one pool token, 18 decimals
pub fn per_liquidity_token(reserve: U256, total_supply: U256) -> Option<U256> {
    if total_supply.is_zero() {
        return None;
    }
    mul_div(reserve, one().ok()?, total_supply).ok()
}

/// Amount returned when burning `pool_tokens` at `per_token`
pub fn withdrawn_amount(per_token: U256, pool_tokens: U256) -> Result<U256> {
    Ok(mul_div(per_token, pool_tokens, one()?)?)
}

/// Token deposit matching `coin_amount` at the 18-decimal market rate
/// `coin -> token`
pub fn token_amount_for_coin(
    market_rate: U256,
    coin_amount: U256,
    hub_decimals: u8,
    token_decimals: u8,
) -> Result<U256> {
    let numerator = mul(mul(market_rate, coin_amount)?, pow10(u32::from(token_decimals))?)?;
    let denominator = mul(one()?, pow10(u32::from(hub_decimals))?)?;
    Ok(div(numerator, denominator)?)
}

/// Coin deposit matching `token_amount` at the inverted rate `token -> coin`
pub fn coin_amount_for_token(
    inverted_rate: U256,
    token_amount: U256,
    hub_decimals: u8,
    token_decimals: u8,
) -> Result<U256> {
    let numerator = mul(mul(inverted_rate, token_amount)?, pow10(u32::from(hub_decimals))?)?;
    let denominator = mul(one()?, pow10(u32::from(token_decimals))?)?;
    Ok(div(numerator, denominator)?)
}

/// A withdrawal must not exceed what the exchange actually holds
pub fn ensure_reserve_covers(real_reserve: U256, withdrawn: U256) -> Result<()> {
    if real_reserve < withdrawn {
        return Err(QuoteError::InsufficientLiquidity);
    }
    Ok(())
}
