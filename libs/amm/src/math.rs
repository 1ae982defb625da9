//! 256-bit integer helpers
//!
//! All pool math runs on [`U256`] with 512-bit intermediates, so a product of
//! two reserves never wraps. Results are narrowed back with an explicit overflow
//! check and every division truncates toward zero.

use crate::error::ArithmeticError;
use ethers_core::types::{U256, U512};

/// Largest `n` with `10^n` representable in 256 bits
pub const MAX_POW10_EXPONENT: u32 = 77;

type MathResult<T> = Result<T, ArithmeticError>;

#[inline]
pub fn widen(value: U256) -> U512 {
    U512::from(value)
}

/// Narrow a 512-bit value back to 256 bits
pub fn narrow(value: U512) -> MathResult<U256> {
    if value > widen(U256::MAX) {
        return Err(ArithmeticError::Overflow);
    }
    let U512(words) = value;
    Ok(U256([words[0], words[1], words[2], words[3]]))
}

pub fn add(a: U256, b: U256) -> MathResult<U256> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

pub fn sub(a: U256, b: U256) -> MathResult<U256> {
    a.checked_sub(b).ok_or(ArithmeticError::Underflow)
}

/// `min(a + b, ceiling)` without wrapping
pub fn add_clamped(a: U256, b: U256, ceiling: U256) -> U256 {
    let sum = widen(a) + widen(b);
    if sum > widen(ceiling) {
        ceiling
    } else {
        // sum <= ceiling <= U256::MAX
        a + b
    }
}

/// `max(a - b, floor)` where a negative difference clamps to `floor`
pub fn sub_floored(a: U256, b: U256, floor: U256) -> U256 {
    match a.checked_sub(b) {
        Some(diff) if diff > floor => diff,
        _ => floor,
    }
}

pub fn mul(a: U256, b: U256) -> MathResult<U256> {
    narrow(a.full_mul(b))
}

pub fn div(a: U256, b: U256) -> MathResult<U256> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok(a / b)
}

/// `floor(a * b / denominator)` with a full 512-bit product
pub fn mul_div(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
    if denominator.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    narrow(a.full_mul(b) / widen(denominator))
}

pub fn wide_mul(a: U512, b: U512) -> MathResult<U512> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow)
}

pub fn wide_add(a: U512, b: U512) -> MathResult<U512> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

pub fn wide_div(a: U512, b: U512) -> MathResult<U512> {
    if b.is_zero() {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok(a / b)
}

/// `10^exponent`, used to scale between token decimals
pub fn pow10(exponent: u32) -> MathResult<U256> {
    if exponent > MAX_POW10_EXPONENT {
        return Err(ArithmeticError::InvalidExponent { exponent });
    }
    Ok(U256::exp10(exponent as usize))
}
