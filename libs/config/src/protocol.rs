//! Exchange contract constants
//!
//! Values the front end shares with the SimpleSwap contracts. Pricing
//! constants are defined next to the formulas in `simpleswap-amm` and
//! re-exported here so tools read them from one place.

use simpleswap_amm::math::mul_div;
use simpleswap_amm::U256;

pub use simpleswap_amm::pricing::{FEE_DENOMINATOR, FEE_NUMERATOR};
pub use simpleswap_amm::rate::{FEE_BIAS, HIGH_SLIPPAGE_WARNING, RATE_DECIMALS, SLIPPAGE_WARNING};
pub use simpleswap_amm::slippage::{
    ALLOWED_SLIPPAGE_DEFAULT_BIPS, BIPS_SCALE, LIQUIDITY_ALLOWED_SLIPPAGE_BIPS,
    TOKEN_ALLOWED_SLIPPAGE_DEFAULT_BIPS,
};

/// Seconds a submitted swap stays valid
pub const DEADLINE_FROM_NOW_SECS: u64 = 60 * 15;

/// Extra gas on top of the estimate, in bips (10%)
pub const GAS_MARGIN_BIPS: u64 = 1_000;

/// Contract deadline for a transaction built at `now_secs`
pub fn deadline(now_secs: u64) -> u64 {
    now_secs.saturating_add(DEADLINE_FROM_NOW_SECS)
}

/// Gas limit with the safety margin applied, saturating at `U256::MAX`
pub fn calculate_gas_margin(estimate: U256) -> U256 {
    let offset = mul_div(estimate, U256::from(GAS_MARGIN_BIPS), U256::from(BIPS_SCALE))
        .unwrap_or(U256::MAX);
    estimate.saturating_add(offset)
}
