//! # SimpleSwap AMM - Client-Side Quote Engine
//!
//! ## Purpose
//!
//! Exact integer mathematics for quoting trades against SimpleSwap hub
//! exchanges. Every formula mirrors the exchange contract (0.3% input fee,
//! constant product, truncating division) so the amounts shown in the swap
//! form are the amounts the contract will settle.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool reserves from the reserve cache, token decimals
//!   from the token registry, user-typed amounts
//! - **Output Destinations**: swap and liquidity forms (dependent amounts,
//!   slippage bounds, display rates), transaction builders (selected exchange)
//! - **Exchanges**: one per hub coin (USDx, USDT), each listing tokens against
//!   its hub
//!
//! ## Architecture Role
//!
//! ```text
//! math -> pricing -> route -> router
//!                  \-> slippage, rate, liquidity
//! ```
//!
//! The engine keeps no state: reserves arrive as plain arguments and every
//! result is recomputed per call. No floating point is used anywhere.

pub mod error;
pub mod liquidity;
pub mod math;
pub mod pool_traits;
pub mod pricing;
pub mod rate;
pub mod route;
pub mod router;
pub mod slippage;
pub mod units;

pub use error::{ArithmeticError, QuoteError, Result};
pub use pool_traits::{Orientation, OrientedPool, Pool};
pub use pricing::{ConstantProduct, Reserves};
pub use rate::{
    compute_display_rate, get_exchange_rate, get_market_rate, percent_slippage, DisplayRate,
    PoolSide, SlippageWarning,
};
pub use route::{compute_quote, Exchange, Quote, SwapDirection, SwapKind, SwapRoute};
pub use router::{pick_best, select_best, Candidate, Selection};
pub use slippage::{calculate_slippage_bounds, SlippageBounds, SlippageTolerance};
pub use units::{amount_formatter, format_units, parse_amount};

/// Integer and address types used across the public API
pub use ethers_core::types::{Address, U256};
