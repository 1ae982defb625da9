//! Display rates and slippage warnings
//!
//! Rates are 18-decimal fixed-point ratios independent of either token's
//! native decimals. Every helper here feeds display only, so failures degrade
//! to `None` instead of erroring.

use crate::math::{div, mul, pow10};
use crate::pricing::Reserves;
use crate::route::SwapKind;
use ethers_core::types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-point precision of every rate
pub const RATE_DECIMALS: u32 = 18;

/// The 0.3% pool fee in rate units, removed from displayed slippage
pub const FEE_BIAS: u64 = 3_000_000_000_000_000;
/// 5%: start warning about price impact
pub const SLIPPAGE_WARNING: u64 = 50_000_000_000_000_000;
/// 20%: require explicit confirmation
pub const HIGH_SLIPPAGE_WARNING: u64 = 200_000_000_000_000_000;

/// Output per input (or input per output when `invert`) scaled to 18 decimals.
///
/// `None` when a value or decimals is absent, a divisor is zero, or a step
/// overflows.
pub fn get_exchange_rate(
    input_value: Option<U256>,
    input_decimals: Option<u8>,
    output_value: Option<U256>,
    output_decimals: Option<u8>,
    invert: bool,
) -> Option<U256> {
    let (input_value, input_decimals) = (input_value?, input_decimals?);
    let (output_value, output_decimals) = (output_value?, output_decimals?);

    let factor = pow10(RATE_DECIMALS).ok()?;
    let input_scale = pow10(u32::from(input_decimals)).ok()?;
    let output_scale = pow10(u32::from(output_decimals)).ok()?;

    let (numerator, denominator, up, down) = if invert {
        (input_value, output_value, output_scale, input_scale)
    } else {
        (output_value, input_value, input_scale, output_scale)
    };

    let rate = div(mul(numerator, factor).ok()?, denominator).ok()?;
    div(mul(rate, up).ok()?, down).ok()
}

/// One pool of a trade together with its listed token's decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSide {
    pub reserves: Reserves,
    pub decimals: u8,
}

impl PoolSide {
    pub fn new(reserves: Reserves, decimals: u8) -> Self {
        Self { reserves, decimals }
    }
}

/// Unslipped price implied by the current reserves.
///
/// `input` is the pool of the token being sold, `output` the pool of the
/// token being bought; the side that is the hub coin itself is unused.
pub fn get_market_rate(
    kind: SwapKind,
    input: Option<PoolSide>,
    output: Option<PoolSide>,
    hub_decimals: u8,
    invert: bool,
) -> Option<U256> {
    let sell_leg = |invert: bool| {
        let side = input?;
        get_exchange_rate(
            Some(side.reserves.token_reserve),
            Some(side.decimals),
            Some(side.reserves.coin_reserve),
            Some(hub_decimals),
            invert,
        )
    };
    let buy_leg = |invert: bool| {
        let side = output?;
        get_exchange_rate(
            Some(side.reserves.coin_reserve),
            Some(hub_decimals),
            Some(side.reserves.token_reserve),
            Some(side.decimals),
            invert,
        )
    };

    match kind {
        SwapKind::HubToToken => buy_leg(invert),
        SwapKind::TokenToHub => sell_leg(invert),
        SwapKind::TokenToToken => {
            let (first, second) = (sell_leg(invert)?, buy_leg(invert)?);
            div(mul(first, second).ok()?, pow10(RATE_DECIMALS).ok()?).ok()
        }
    }
}

/// Relative gap between the effective rate and the market rate, minus the
/// fee, in 18-decimal units (`10^16` = 1%). A gap smaller than the fee
/// reports zero.
pub fn percent_slippage(exchange_rate: Option<U256>, market_rate: Option<U256>) -> Option<U256> {
    let (rate, market) = (exchange_rate?, market_rate?);
    let gap = if rate > market { rate - market } else { market - rate };
    let relative = div(mul(gap, pow10(RATE_DECIMALS).ok()?).ok()?, market).ok()?;
    Some(relative.saturating_sub(U256::from(FEE_BIAS)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippageWarning {
    None,
    /// `[5%, 20%)`
    Warning,
    /// `>= 20%`
    High,
}

impl SlippageWarning {
    pub fn from_percent(percent: Option<U256>) -> Self {
        match percent {
            Some(p) if p >= U256::from(HIGH_SLIPPAGE_WARNING) => SlippageWarning::High,
            Some(p) if p >= U256::from(SLIPPAGE_WARNING) => SlippageWarning::Warning,
            _ => SlippageWarning::None,
        }
    }

    pub fn requires_confirmation(self) -> bool {
        matches!(self, SlippageWarning::High)
    }
}

/// Everything the swap form shows next to a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRate {
    pub exchange_rate: Option<U256>,
    pub exchange_rate_inverted: Option<U256>,
    pub market_rate: Option<U256>,
    pub percent_slippage: Option<U256>,
    pub warning: SlippageWarning,
}

/// Effective and market rates for a quoted trade.
pub fn compute_display_rate(
    kind: SwapKind,
    amounts: (U256, U256),
    input: Option<PoolSide>,
    output: Option<PoolSide>,
    decimals: (u8, u8),
    hub_decimals: u8,
) -> DisplayRate {
    let (input_amount, output_amount) = amounts;
    let (input_decimals, output_decimals) = decimals;

    let rate = |invert| {
        get_exchange_rate(
            Some(input_amount),
            Some(input_decimals),
            Some(output_amount),
            Some(output_decimals),
            invert,
        )
    };
    let exchange_rate = rate(false);
    let market_rate = get_market_rate(kind, input, output, hub_decimals, false);
    let percent = percent_slippage(exchange_rate, market_rate);

    DisplayRate {
        exchange_rate,
        exchange_rate_inverted: rate(true),
        market_rate,
        percent_slippage: percent,
        warning: SlippageWarning::from_percent(percent),
    }
}

/// Fixed-point integer as a `Decimal` with `decimals` fractional digits.
///
/// `None` past the 96-bit `Decimal` mantissa or 28-digit scale.
pub fn to_display_decimal(value: U256, decimals: u32) -> Option<Decimal> {
    if value > U256::from(i128::MAX as u128) {
        return None;
    }
    Decimal::try_from_i128_with_scale(value.low_u128() as i128, decimals).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const E18: u64 = 1_000_000_000_000_000_000;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_rate_normalises_decimals() {
        // 1 USDT (6 decimals) buys 2 tokens (18 decimals) -> rate 2.0
        let rate = get_exchange_rate(
            Some(u(1_000_000)),
            Some(6),
            Some(u(2 * E18)),
            Some(18),
            false,
        )
        .unwrap();
        assert_eq!(rate, u(2 * E18));

        let inverted =
            get_exchange_rate(Some(u(1_000_000)), Some(6), Some(u(2 * E18)), Some(18), true)
                .unwrap();
        assert_eq!(inverted, u(E18 / 2));
    }

    #[test]
    fn test_rate_degrades_to_none() {
        assert_eq!(get_exchange_rate(None, Some(18), Some(u(1)), Some(18), false), None);
        assert_eq!(get_exchange_rate(Some(u(1)), Some(18), Some(u(1)), None, false), None);
        assert_eq!(
            get_exchange_rate(Some(U256::zero()), Some(18), Some(u(1)), Some(18), false),
            None
        );
        assert_eq!(get_exchange_rate(Some(u(1)), Some(18), Some(U256::MAX), Some(18), false), None);
    }

    #[test]
    fn test_market_rate_per_kind() {
        let pool = Reserves::new(u(1000) * u(E18), u(2000) * u(E18));
        let side = PoolSide::new(pool, 18);

        let buy = get_market_rate(SwapKind::HubToToken, None, Some(side), 18, false).unwrap();
        assert_eq!(buy, u(2 * E18));

        let sell = get_market_rate(SwapKind::TokenToHub, Some(side), None, 18, false).unwrap();
        assert_eq!(sell, u(E18 / 2));

        // sell at 0.5, buy at 2.0 -> 1.0
        let cross =
            get_market_rate(SwapKind::TokenToToken, Some(side), Some(side), 18, false).unwrap();
        assert_eq!(cross, u(E18));

        assert_eq!(get_market_rate(SwapKind::TokenToToken, Some(side), None, 18, false), None);
    }

    #[test]
    fn test_percent_slippage_removes_fee_bias() {
        // 10% below market -> 10% - 0.3%
        let percent = percent_slippage(Some(u(9 * E18 / 10)), Some(u(E18))).unwrap();
        assert_eq!(percent, u(E18 / 10 - FEE_BIAS));

        // a gap inside the fee reports zero
        let percent = percent_slippage(Some(u(E18 - 1_000)), Some(u(E18))).unwrap();
        assert_eq!(percent, U256::zero());

        assert_eq!(percent_slippage(Some(u(1)), Some(U256::zero())), None);
    }

    #[test]
    fn test_warning_tiers() {
        assert_eq!(SlippageWarning::from_percent(None), SlippageWarning::None);
        assert_eq!(
            SlippageWarning::from_percent(Some(u(SLIPPAGE_WARNING - 1))),
            SlippageWarning::None
        );
        assert_eq!(
            SlippageWarning::from_percent(Some(u(SLIPPAGE_WARNING))),
            SlippageWarning::Warning
        );
        assert_eq!(
            SlippageWarning::from_percent(Some(u(HIGH_SLIPPAGE_WARNING - 1))),
            SlippageWarning::Warning
        );
        assert!(
            SlippageWarning::from_percent(Some(u(HIGH_SLIPPAGE_WARNING))).requires_confirmation()
        );
    }

    #[test]
    fn test_display_rate_for_direct_trade() {
        // 100 in against 1000/2000 yields 181 out: effective 1.81 vs market 2.0
        let pool = Reserves::new(u(1000), u(2000));
        let display = compute_display_rate(
            SwapKind::HubToToken,
            (u(100), u(181)),
            None,
            Some(PoolSide::new(pool, 18)),
            (18, 18),
            18,
        );

        assert_eq!(display.exchange_rate, Some(u(181) * u(E18) / u(100)));
        assert_eq!(display.market_rate, Some(u(2 * E18)));
        // |1.81 - 2| / 2 = 9.5%, minus 0.3%
        assert_eq!(display.percent_slippage, Some(u(95) * u(E18) / u(1000) - u(FEE_BIAS)));
        assert_eq!(display.warning, SlippageWarning::Warning);
    }

    #[test]
    fn test_display_decimal_conversion() {
        assert_eq!(to_display_decimal(u(1_810_000_000_000_000_000), 18), Some(dec!(1.81)));
        assert_eq!(to_display_decimal(u(25), 2), Some(dec!(0.25)));
        assert_eq!(to_display_decimal(U256::MAX, 18), None);
    }
}
