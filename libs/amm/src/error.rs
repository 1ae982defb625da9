//! Error types for quote computation
//!
//! Expected trading conditions (empty pools, oversized trades, unparsable
//! amounts) surface as [`QuoteError`] values the caller matches on to pick UI
//! copy. [`ArithmeticError`] marks an upstream contract violation such as a
//! zero divisor reaching the helpers.

use thiserror::Error;

/// Failures of the 256-bit integer helpers
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow: result exceeds 256 bits")]
    Overflow,

    #[error("Underflow: result would be negative")]
    Underflow,

    /// `10^exponent` does not fit in 256 bits
    #[error("Invalid exponent: 10^{exponent} is not representable")]
    InvalidExponent { exponent: u32 },
}

/// Errors returned by the quote engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    /// The pool cannot service a trade of this size
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    /// Malformed or out-of-range user amount
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Both sides name the same asset, or a side is missing
    #[error("No route between the selected assets")]
    UnroutablePair,
}

impl QuoteError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Short user-facing message for the swap form
    pub fn user_message(&self) -> &'static str {
        match self {
            QuoteError::InsufficientLiquidity => "insufficient liquidity",
            QuoteError::InvalidInput(_) => "input not valid",
            QuoteError::UnroutablePair => "select a token",
            QuoteError::Arithmetic(_) => "something went wrong",
        }
    }

    pub fn is_insufficient_liquidity(&self) -> bool {
        matches!(self, QuoteError::InsufficientLiquidity)
    }
}

pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            QuoteError::InsufficientLiquidity.user_message(),
            "insufficient liquidity"
        );
        assert_eq!(
            QuoteError::invalid_input("empty").user_message(),
            "input not valid"
        );
    }

    #[test]
    fn test_arithmetic_converts() {
        let err: QuoteError = ArithmeticError::DivisionByZero.into();
        assert_eq!(err, QuoteError::Arithmetic(ArithmeticError::DivisionByZero));
        assert_eq!(err.to_string(), "Division by zero");
    }
}
