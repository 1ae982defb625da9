//! Quote Configuration Module
//!
//! Loads quoting settings from a TOML file with `SIMPLESWAP_` environment
//! overrides. Nested keys use a double underscore:
//! `SIMPLESWAP_GLOBAL__LOG_LEVEL=debug`, `SIMPLESWAP_SLIPPAGE__TOKEN_BIPS=150`.

use crate::deployment::{ChainAddresses, RINKEBY, RINKEBY_TOKENS, USDT_DECIMALS, USDX_DECIMALS};
use anyhow::{bail, ensure, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use simpleswap_amm::slippage::{
    ALLOWED_SLIPPAGE_DEFAULT_BIPS, BIPS_SCALE, LIQUIDITY_ALLOWED_SLIPPAGE_BIPS,
    TOKEN_ALLOWED_SLIPPAGE_DEFAULT_BIPS,
};
use simpleswap_amm::units::MAX_DECIMALS;
use simpleswap_amm::{Address, Exchange, Reserves, SlippageTolerance, U256};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "SIMPLESWAP";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct QuoteConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub slippage: SlippageConfig,

    #[serde(default)]
    pub exchanges: Vec<ExchangeConfig>,

    #[serde(default)]
    pub tokens: Vec<TokenConfig>,

    /// Reserve snapshot served instead of chain reads
    #[serde(default)]
    pub reserves: Vec<ReserveConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    pub chain_id: u64,
    /// Block the reserve snapshot was taken at
    pub block_number: u64,
    pub json_logs: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            chain_id: RINKEBY,
            block_number: 0,
            json_logs: false,
        }
    }
}

/// Tolerance tiers in bips
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SlippageConfig {
    pub default_bips: u32,
    pub token_bips: u32,
    pub liquidity_bips: u32,
}

impl Default for SlippageConfig {
    fn default() -> Self {
        Self {
            default_bips: ALLOWED_SLIPPAGE_DEFAULT_BIPS,
            token_bips: TOKEN_ALLOWED_SLIPPAGE_DEFAULT_BIPS,
            liquidity_bips: LIQUIDITY_ALLOWED_SLIPPAGE_BIPS,
        }
    }
}

impl SlippageConfig {
    pub fn tolerance(&self) -> SlippageTolerance {
        SlippageTolerance::new(self.default_bips, self.token_bips)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub name: String,
    pub address: Address,
    pub hub: Address,
    pub hub_decimals: u8,
}

impl ExchangeConfig {
    pub fn exchange(&self) -> Exchange {
        Exchange::new(self.address, self.hub, self.hub_decimals)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// One pool of the snapshot. Balances are base-unit decimal strings since
/// they routinely exceed 64 bits.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReserveConfig {
    /// Name of an entry in `[[exchanges]]`
    pub exchange: String,
    pub token: Address,
    pub coin_reserve: String,
    pub token_reserve: String,
}

impl ReserveConfig {
    pub fn reserves(&self) -> Result<Reserves> {
        let parse = |field: &str, text: &str| {
            U256::from_dec_str(text.trim()).with_context(|| {
                format!("Invalid {field} '{text}' for token {:?} on {}", self.token, self.exchange)
            })
        };
        Ok(Reserves::new(
            parse("coin_reserve", &self.coin_reserve)?,
            parse("token_reserve", &self.token_reserve)?,
        ))
    }
}

impl QuoteConfig {
    /// Load `path` (required when given) with environment overrides.
    ///
    /// Without a file, the known deployment of the configured chain supplies
    /// exchanges and tokens.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading quote config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: QuoteConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if config.exchanges.is_empty() {
            debug!(chain_id = config.global.chain_id, "no exchanges configured, using deployment");
            config.apply_deployment()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default configuration for a known chain
    pub fn for_chain(chain_id: u64) -> Result<Self> {
        let mut config = QuoteConfig {
            global: GlobalConfig {
                chain_id,
                ..GlobalConfig::default()
            },
            ..QuoteConfig::default()
        };
        config.apply_deployment()?;
        config.validate()?;
        Ok(config)
    }

    /// Fill exchanges and hub/test tokens from the published deployment
    fn apply_deployment(&mut self) -> Result<()> {
        let chain_id = self.global.chain_id;
        let Some(chain) = ChainAddresses::for_chain(chain_id) else {
            bail!("No known deployment for chain {chain_id}");
        };

        for (name, exchange) in chain.exchanges()? {
            self.exchanges.push(ExchangeConfig {
                name: name.to_string(),
                address: exchange.address,
                hub: exchange.hub,
                hub_decimals: exchange.hub_decimals,
            });
        }

        let known: HashSet<Address> = self.tokens.iter().map(|t| t.address).collect();
        let mut listed = vec![
            (chain.usdx, "USDx", "USDx", USDX_DECIMALS),
            (chain.usdt, "Tether USD", "USDT", USDT_DECIMALS),
        ];
        if chain_id == RINKEBY {
            listed.extend(RINKEBY_TOKENS.iter().copied());
        }
        for (address, name, symbol, decimals) in listed {
            let address = crate::deployment::parse_address(address)?;
            if !known.contains(&address) {
                self.tokens.push(TokenConfig {
                    address,
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                    decimals,
                });
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let bips = [
            ("default_bips", self.slippage.default_bips),
            ("token_bips", self.slippage.token_bips),
            ("liquidity_bips", self.slippage.liquidity_bips),
        ];
        for (field, value) in bips {
            ensure!(
                u64::from(value) <= BIPS_SCALE,
                "slippage.{field} = {value} exceeds {BIPS_SCALE} bips"
            );
        }

        let mut names = HashSet::new();
        for exchange in &self.exchanges {
            ensure!(names.insert(exchange.name.as_str()), "Duplicate exchange '{}'", exchange.name);
            ensure!(
                exchange.hub_decimals <= MAX_DECIMALS,
                "Exchange '{}' hub decimals {} exceed {MAX_DECIMALS}",
                exchange.name,
                exchange.hub_decimals
            );
        }

        for token in &self.tokens {
            ensure!(
                token.decimals <= MAX_DECIMALS,
                "Token {} decimals {} exceed {MAX_DECIMALS}",
                token.symbol,
                token.decimals
            );
        }

        for reserve in &self.reserves {
            ensure!(
                names.contains(reserve.exchange.as_str()),
                "Reserve entry names unknown exchange '{}'",
                reserve.exchange
            );
            reserve.reserves()?;
        }
        Ok(())
    }

    /// Render as TOML, e.g. to seed a config file from a deployment
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn exchange(&self, name: &str) -> Option<&ExchangeConfig> {
        self.exchanges.iter().find(|e| e.name == name)
    }

    pub fn token_by_symbol(&self, symbol: &str) -> Option<&TokenConfig> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }
}
