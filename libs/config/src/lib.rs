//! # SimpleSwap Configuration
//!
//! Deployment constants and quoting configuration shared by the SimpleSwap
//! tools.
//!
//! ## Features
//!
//! - **Protocol Constants**: pool fee, bips scale, slippage tiers, warning
//!   thresholds, transaction deadline, gas margin
//! - **Deployments**: exchange, hub coin and test token addresses per chain
//! - **Quote Configuration**: TOML file with `SIMPLESWAP_` environment
//!   overrides, including an optional reserve snapshot
//!
//! ## Usage
//!
//! ```rust,no_run
//! use simpleswap_config::{deployment, protocol, QuoteConfig};
//!
//! let fee = (protocol::FEE_NUMERATOR, protocol::FEE_DENOMINATOR);
//! let rinkeby = deployment::ChainAddresses::for_chain(deployment::RINKEBY);
//! let config = QuoteConfig::load(None)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod deployment;
pub mod protocol;
pub mod quote_config;

pub use deployment::ChainAddresses;
pub use quote_config::{
    ExchangeConfig, GlobalConfig, QuoteConfig, ReserveConfig, SlippageConfig, TokenConfig,
};
