//! # SimpleSwap Quoter
//!
//! ## Purpose
//!
//! Command-line front end over the quote engine: resolves tokens, reads pool
//! reserves through the block-scoped cache, quotes every hub exchange that
//! lists the pair and reports the best one with its slippage limit and price
//! impact. Also previews liquidity deposits and withdrawals.
//!
//! ## Integration Points
//!
//! - **Configuration**: [`simpleswap_config::QuoteConfig`] (TOML file plus
//!   `SIMPLESWAP_` environment overrides)
//! - **Reserves**: any [`simpleswap_state::ReserveProvider`]; the binary uses
//!   the `[[reserves]]` snapshot of the config
//! - **Output**: human readable text or JSON on stdout, logs on stderr

pub mod engine;
pub mod logging;
pub mod report;

pub use engine::{
    snapshot_provider, LiquidityRequest, QuoteRequest, QuoteService, RemoveLiquidityRequest,
};
pub use logging::init_logging;
pub use report::{AmountReport, LiquidityReport, QuoteReport, RemoveLiquidityReport};
