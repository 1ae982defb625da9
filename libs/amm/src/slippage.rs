//! Slippage bounds sent with swap and liquidity transactions

use crate::math::{add_clamped, mul_div, sub_floored};
use crate::route::SwapRoute;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// 100% expressed in bips
pub const BIPS_SCALE: u64 = 10_000;

/// Default tolerance for trades touching the hub coin
pub const ALLOWED_SLIPPAGE_DEFAULT_BIPS: u32 = 100;
/// Default tolerance for token-to-token trades
pub const TOKEN_ALLOWED_SLIPPAGE_DEFAULT_BIPS: u32 = 100;
/// Tolerance applied to add/remove liquidity amounts
pub const LIQUIDITY_ALLOWED_SLIPPAGE_BIPS: u32 = 200;

/// Acceptable range around a computed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageBounds {
    pub minimum: U256,
    pub maximum: U256,
}

/// `value ± floor(value * bips / 10000)`, clamped to `[0, U256::MAX]`
pub fn calculate_slippage_bounds(value: U256, tolerance_bips: u32) -> SlippageBounds {
    // an offset past 256 bits clamps both bounds exactly like U256::MAX does
    let offset = mul_div(value, U256::from(tolerance_bips), U256::from(BIPS_SCALE))
        .unwrap_or(U256::MAX);
    SlippageBounds {
        minimum: sub_floored(value, offset, U256::zero()),
        maximum: add_clamped(value, offset, U256::MAX),
    }
}

/// Tolerance tiers configured for the swap form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageTolerance {
    /// Direct trades against the hub coin
    pub default_bips: u32,
    /// token -> hub -> token trades
    pub token_bips: u32,
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self {
            default_bips: ALLOWED_SLIPPAGE_DEFAULT_BIPS,
            token_bips: TOKEN_ALLOWED_SLIPPAGE_DEFAULT_BIPS,
        }
    }
}

impl SlippageTolerance {
    pub fn new(default_bips: u32, token_bips: u32) -> Self {
        Self {
            default_bips,
            token_bips,
        }
    }

    pub fn bips_for(&self, is_two_hop: bool) -> u32 {
        if is_two_hop {
            self.token_bips
        } else {
            self.default_bips
        }
    }

    pub fn compute_bounds(&self, value: U256, is_two_hop: bool) -> SlippageBounds {
        calculate_slippage_bounds(value, self.bips_for(is_two_hop))
    }

    pub fn bounds_for_route(&self, value: U256, route: &SwapRoute) -> SlippageBounds {
        self.compute_bounds(value, route.is_two_hop())
    }
}
