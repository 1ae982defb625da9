//! Conversions between typed decimal strings and base units

use crate::error::{QuoteError, Result};
use crate::math::pow10;
use ethers_core::types::U256;

/// Largest token precision the engine formats
pub const MAX_DECIMALS: u8 = 18;

/// Parse a user-typed amount into base units.
///
/// Accepts plain decimal notation with at most `decimals` fractional digits.
/// The result must be positive and below `U256::MAX`.
pub fn parse_amount(text: &str, decimals: u8) -> Result<U256> {
    let text = text.trim();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return Err(QuoteError::invalid_input("empty amount"));
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(QuoteError::invalid_input(format!("not a number: {text}")));
    }
    if fraction.len() > usize::from(decimals) {
        return Err(QuoteError::invalid_input(format!(
            "more than {decimals} fractional digits"
        )));
    }

    let digits = format!("{whole}{fraction:0<width$}", width = usize::from(decimals));
    let value = U256::from_dec_str(&digits)
        .map_err(|_| QuoteError::invalid_input("amount exceeds 256 bits"))?;

    if value.is_zero() || value == U256::MAX {
        return Err(QuoteError::invalid_input("amount out of range"));
    }
    Ok(value)
}

/// Render base units with a decimal point, keeping at least one fractional
/// digit (`1000000` at 6 decimals is `"1.0"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Format an amount for display, rounded half-up to `display_decimals`.
///
/// Amounts below the smallest displayable unit print as `<0.001` (or in full
/// when `use_less_than` is false). `None` in, `None` out.
pub fn amount_formatter(
    amount: Option<U256>,
    base_decimals: u8,
    display_decimals: u8,
    use_less_than: bool,
) -> Result<Option<String>> {
    if base_decimals > MAX_DECIMALS
        || display_decimals > MAX_DECIMALS
        || display_decimals > base_decimals
    {
        return Err(QuoteError::invalid_input(format!(
            "invalid combination of base decimals {base_decimals} \
             and display decimals {display_decimals}"
        )));
    }

    let amount = match amount {
        None => return Ok(None),
        Some(amount) if amount.is_zero() => return Ok(Some("0".to_string())),
        Some(amount) => amount,
    };

    let base_amount = pow10(u32::from(base_decimals))?;
    let minimum_display_amount = base_amount / pow10(u32::from(display_decimals))?;

    if amount < minimum_display_amount {
        return Ok(Some(if use_less_than {
            format!("<{}", format_units(minimum_display_amount, base_decimals))
        } else {
            format_units(amount, base_decimals)
        }));
    }

    let rounded = amount.saturating_add(minimum_display_amount / 2);
    let formatted = format_units(rounded, base_decimals);
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let shown = &fraction[..fraction.len().min(usize::from(display_decimals))];

    if shown.bytes().all(|b| b == b'0') {
        Ok(Some(whole.to_string()))
    } else {
        Ok(Some(format!("{whole}.{}", shown.trim_end_matches('0'))))
    }
}
