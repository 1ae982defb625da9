//! Printable results of the quoter commands

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use simpleswap_amm::rate::to_display_decimal;
use simpleswap_amm::{amount_formatter, Address, SlippageWarning, SwapDirection, SwapKind, U256};
use std::fmt;

/// Significant fractional digits shown for amounts and rates
const DISPLAY_DECIMALS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountReport {
    pub symbol: String,
    /// Base units as a decimal string
    pub raw: String,
    pub display: String,
}

impl AmountReport {
    pub fn new(symbol: &str, raw: U256, decimals: u8) -> Result<Self> {
        let display = amount_formatter(Some(raw), decimals, decimals.min(DISPLAY_DECIMALS), true)?
            .unwrap_or_default();
        Ok(Self {
            symbol: symbol.to_string(),
            raw: raw.to_string(),
            display,
        })
    }
}

impl fmt::Display for AmountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display, self.symbol)
    }
}

/// 18-decimal rate for display, rounded to a readable precision
pub fn display_rate(rate: Option<U256>) -> Option<Decimal> {
    rate.and_then(|r| to_display_decimal(r, 18))
        .map(|d| d.round_dp(u32::from(DISPLAY_DECIMALS) + 2).normalize())
}

/// 18-decimal fraction (`10^18` = 100%) as a percentage
pub fn display_percent(fraction: Option<U256>) -> Option<Decimal> {
    fraction
        .and_then(|p| to_display_decimal(p, 16))
        .map(|d| d.round_dp(2).normalize())
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteReport {
    pub exchange: String,
    pub exchange_address: Address,
    pub kind: SwapKind,
    pub direction: SwapDirection,
    pub input: AmountReport,
    pub output: AmountReport,
    /// Hub amount between the legs of a token-to-token trade
    pub intermediate: Option<AmountReport>,
    /// Minimum received (exact input) or maximum sold (exact output)
    pub limit: AmountReport,
    pub tolerance_bips: u32,
    pub rate: Option<Decimal>,
    pub inverted_rate: Option<Decimal>,
    pub market_rate: Option<Decimal>,
    pub price_impact_percent: Option<Decimal>,
    pub warning: SlippageWarning,
}

fn or_dash(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl fmt::Display for QuoteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "exchange      {} ({:?})", self.exchange, self.exchange_address)?;
        match &self.intermediate {
            Some(hub) => writeln!(
                f,
                "route         {} -> {} -> {}",
                self.input.symbol, hub, self.output.symbol
            )?,
            None => writeln!(f, "route         {} -> {}", self.input.symbol, self.output.symbol)?,
        }
        writeln!(f, "input         {}", self.input)?;
        writeln!(f, "output        {}", self.output)?;

        let label = match self.direction {
            SwapDirection::ExactInput => "min received",
            SwapDirection::ExactOutput => "max sold",
        };
        writeln!(
            f,
            "{label:<13} {} ({}.{:02}% tolerance)",
            self.limit,
            self.tolerance_bips / 100,
            self.tolerance_bips % 100
        )?;
        writeln!(
            f,
            "rate          1 {} = {} {}",
            self.input.symbol,
            or_dash(self.rate),
            self.output.symbol
        )?;
        writeln!(
            f,
            "              1 {} = {} {}",
            self.output.symbol,
            or_dash(self.inverted_rate),
            self.input.symbol
        )?;
        writeln!(f, "market rate   {}", or_dash(self.market_rate))?;
        write!(f, "price impact  {}%", or_dash(self.price_impact_percent))?;
        match self.warning {
            SlippageWarning::None => Ok(()),
            SlippageWarning::Warning => write!(f, "  warning: large price impact"),
            SlippageWarning::High => {
                write!(f, "  WARNING: very high price impact, confirm before trading")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquidityReport {
    pub exchange: String,
    pub new_exchange: bool,
    pub coin: AmountReport,
    pub token: AmountReport,
    /// Most tokens the deposit may pull
    pub max_token: AmountReport,
    pub liquidity_minted: String,
    pub min_liquidity: String,
    pub pool_share_percent: Option<Decimal>,
}

impl fmt::Display for LiquidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let new_pool = if self.new_exchange { " (new pool)" } else { "" };
        writeln!(f, "exchange      {}{new_pool}", self.exchange)?;
        writeln!(f, "deposit       {} + {}", self.coin, self.token)?;
        writeln!(f, "max tokens    {}", self.max_token)?;
        writeln!(f, "minted        {} (min {})", self.liquidity_minted, self.min_liquidity)?;
        write!(f, "pool share    {}%", or_dash(self.pool_share_percent))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveLiquidityReport {
    pub exchange: String,
    /// Pool tokens burned, base units
    pub pool_tokens: String,
    /// Share of the pool held before the burn
    pub ownership_percent: Option<Decimal>,
    pub pooled_coin: AmountReport,
    pub pooled_token: AmountReport,
    pub coin: AmountReport,
    pub token: AmountReport,
    pub min_coin: AmountReport,
    pub min_token: AmountReport,
}

impl fmt::Display for RemoveLiquidityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "exchange      {}", self.exchange)?;
        writeln!(f, "pool share    {}%", or_dash(self.ownership_percent))?;
        writeln!(f, "pooled        {} + {}", self.pooled_coin, self.pooled_token)?;
        writeln!(f, "withdraw      {} + {}", self.coin, self.token)?;
        write!(f, "min received  {} + {}", self.min_coin, self.min_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_report_formats_display_units() {
        let report = AmountReport::new("USDT", U256::from(1_234_567u64), 6).unwrap();
        assert_eq!(report.display, "1.2346");
        assert_eq!(report.raw, "1234567");
        assert_eq!(report.to_string(), "1.2346 USDT");
    }

    #[test]
    fn test_percent_and_rate_display() {
        // 9.04%
        let fraction = U256::from(90_400_000_000_000_000u64);
        assert_eq!(display_percent(Some(fraction)), Decimal::from_str("9.04").ok());
        assert_eq!(
            display_rate(Some(U256::from(1_813_200_000_000_000_000u64))),
            Decimal::from_str("1.8132").ok()
        );
        assert_eq!(display_rate(None), None);
    }
}
