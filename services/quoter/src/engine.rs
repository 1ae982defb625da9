//! Quote service
//!
//! Wires the configured exchanges, the token registry and the reserve cache
//! to the quote engine. Every request reads reserves through the cache, so
//! repeated quotes within one block hit the provider once per pool.

use crate::report::{
    display_percent, display_rate, AmountReport, LiquidityReport, QuoteReport,
    RemoveLiquidityReport,
};
use anyhow::{bail, ensure, Context, Result};
use simpleswap_amm::liquidity::{
    coin_amount_for_token, ensure_reserve_covers, is_new_exchange, liquidity_minted,
    per_liquidity_token, pool_share, share_of_reserve, token_amount_for_coin, withdrawn_amount,
};
use simpleswap_amm::units::MAX_DECIMALS;
use simpleswap_amm::{
    calculate_slippage_bounds, compute_display_rate, get_exchange_rate, parse_amount, select_best,
    Address, Candidate, Exchange, PoolSide, QuoteError, Reserves, SlippageTolerance,
    SwapDirection, U256,
};
use simpleswap_config::deployment::parse_address;
use simpleswap_config::QuoteConfig;
use simpleswap_state::{
    ReserveCache, ReserveKey, ReserveProvider, StaticReserveProvider, TokenInfo, TokenRegistry,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    /// Symbol or address of the token sold
    pub input: String,
    /// Symbol or address of the token bought
    pub output: String,
    /// Amount typed on the independent side, in display units
    pub amount: String,
    pub direction: SwapDirection,
}

/// Pool tokens carry the hub exchange's fixed 18 decimals
pub const POOL_TOKEN_DECIMALS: u8 = MAX_DECIMALS;

/// Deposit preview. On an existing pool either side may be given and the
/// other follows the current rate; the coin side wins when both are set.
/// An empty pool needs both.
#[derive(Debug, Clone, Default)]
pub struct LiquidityRequest {
    pub exchange: String,
    pub token: String,
    /// Hub coin deposited, in display units
    pub coin_amount: Option<String>,
    /// Token deposited, in display units
    pub token_amount: Option<String>,
    /// Pool token supply in base units; required unless the pool is empty
    pub total_supply: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveLiquidityRequest {
    pub exchange: String,
    pub token: String,
    /// Pool tokens burned, in display units
    pub pool_tokens: String,
    /// Pool token supply in base units
    pub total_supply: String,
    /// Pool tokens held, in display units; defaults to the amount burned
    pub balance: Option<String>,
}

fn parse_supply(text: &str) -> Result<U256> {
    U256::from_dec_str(text.trim())
        .map_err(|_| QuoteError::invalid_input(format!("total supply '{text}'")).into())
}

/// Reserve provider serving the `[[reserves]]` snapshot of `config`
pub fn snapshot_provider(config: &QuoteConfig) -> Result<StaticReserveProvider> {
    let provider = StaticReserveProvider::new();
    for entry in &config.reserves {
        let exchange = config
            .exchange(&entry.exchange)
            .with_context(|| format!("Unknown exchange '{}'", entry.exchange))?;
        provider.insert(
            ReserveKey::new(config.global.chain_id, exchange.address, entry.token),
            entry.reserves()?,
        );
    }
    debug!(pools = provider.len(), "loaded reserve snapshot");
    Ok(provider)
}

pub struct QuoteService {
    chain_id: u64,
    exchanges: Vec<(String, Exchange)>,
    tolerance: SlippageTolerance,
    liquidity_bips: u32,
    registry: TokenRegistry,
    cache: ReserveCache,
    provider: Arc<dyn ReserveProvider>,
}

impl QuoteService {
    pub fn from_config(config: &QuoteConfig) -> Result<Self> {
        let provider = snapshot_provider(config)?;
        Self::with_provider(config, Arc::new(provider))
    }

    pub fn with_provider(config: &QuoteConfig, provider: Arc<dyn ReserveProvider>) -> Result<Self> {
        let chain_id = config.global.chain_id;
        let registry = TokenRegistry::new();
        for token in &config.tokens {
            registry
                .register(
                    chain_id,
                    token.address,
                    TokenInfo::new(&token.name, &token.symbol, token.decimals),
                )
                .with_context(|| format!("Invalid token {}", token.symbol))?;
        }

        let exchanges = config
            .exchanges
            .iter()
            .map(|e| (e.name.clone(), e.exchange()))
            .collect::<Vec<_>>();
        ensure!(!exchanges.is_empty(), "No exchanges configured for chain {chain_id}");

        info!(
            chain_id,
            exchanges = exchanges.len(),
            tokens = registry.len(),
            block = config.global.block_number,
            "quote service ready"
        );

        Ok(Self {
            chain_id,
            exchanges,
            tolerance: config.slippage.tolerance(),
            liquidity_bips: config.slippage.liquidity_bips,
            registry,
            cache: ReserveCache::new(config.global.block_number),
            provider,
        })
    }

    pub fn cache(&self) -> &ReserveCache {
        &self.cache
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Forward a new-block signal; returns the number of evicted reads
    pub fn advance_block(&self, block: u64) -> usize {
        self.cache.advance_block(block)
    }

    /// Find a token by `0x` address or by symbol
    pub fn resolve_token(&self, text: &str) -> Result<(Address, TokenInfo)> {
        let text = text.trim();
        if text.starts_with("0x") {
            let address = parse_address(text)?;
            let info = self
                .registry
                .get(self.chain_id, address)
                .with_context(|| format!("Unknown token {text}"))?;
            Ok((address, info))
        } else {
            self.registry
                .find_by_symbol(self.chain_id, text)
                .with_context(|| format!("Unknown token symbol {text}"))
        }
    }

    fn exchange_by_name(&self, name: &str) -> Result<&(String, Exchange)> {
        self.exchanges
            .iter()
            .find(|(n, _)| n == name)
            .with_context(|| format!("Unknown exchange '{name}'"))
    }

    fn symbol_of(&self, token: Address) -> String {
        self.registry
            .symbol(self.chain_id, token)
            .unwrap_or_else(|| format!("{token:?}"))
    }

    /// Make sure the pools of `tokens` on `exchange` are current
    async fn load_pools(&self, exchange: &Exchange, tokens: &[Address]) {
        for &token in tokens.iter().filter(|&&t| t != exchange.hub) {
            let key = ReserveKey::new(self.chain_id, exchange.address, token);
            if let Err(err) = self.cache.get_or_refresh(self.provider.as_ref(), key).await {
                warn!(exchange = ?exchange.address, ?token, %err, "reserve read not usable");
            }
        }
    }

    /// Quote on every exchange that can route the pair and keep the best.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteReport> {
        let (input, input_info) = self.resolve_token(&request.input)?;
        let (output, output_info) = self.resolve_token(&request.output)?;

        let independent_decimals = match request.direction {
            SwapDirection::ExactInput => input_info.decimals,
            SwapDirection::ExactOutput => output_info.decimals,
        };
        let amount = parse_amount(&request.amount, independent_decimals)?;

        let mut candidates = Vec::new();
        let mut unroutable = 0;
        for (index, (name, exchange)) in self.exchanges.iter().enumerate() {
            if exchange.classify(input, output).is_err() {
                unroutable += 1;
                continue;
            }
            self.load_pools(exchange, &[input, output]).await;

            let pools = self.cache.pools_of(self.chain_id, exchange.address);
            match exchange.route(input, output, pools) {
                Ok(route) => candidates.push(Candidate::new(index, route)),
                Err(err) => debug!(exchange = %name, %err, "exchange cannot serve pair"),
            }
        }
        if unroutable == self.exchanges.len() {
            return Err(QuoteError::UnroutablePair.into());
        }

        let selection = select_best(request.direction, amount, &candidates)?;
        let (name, exchange) = &self.exchanges[selection.key];
        let route = &candidates[selection.index].route;
        let kind = selection.quote.kind;

        let (amount_in, amount_out) = selection.quote.amounts(amount);
        let bounds = self.tolerance.bounds_for_route(selection.dependent(), route);
        let limit = match request.direction {
            SwapDirection::ExactInput => {
                AmountReport::new(&output_info.symbol, bounds.minimum, output_info.decimals)?
            }
            SwapDirection::ExactOutput => {
                AmountReport::new(&input_info.symbol, bounds.maximum, input_info.decimals)?
            }
        };

        let pools = self.cache.pools_of(self.chain_id, exchange.address);
        let display = compute_display_rate(
            kind,
            (amount_in, amount_out),
            pools(input).map(|r| PoolSide::new(r, input_info.decimals)),
            pools(output).map(|r| PoolSide::new(r, output_info.decimals)),
            (input_info.decimals, output_info.decimals),
            exchange.hub_decimals,
        );

        let intermediate = match selection.quote.intermediate {
            Some(hub_amount) => Some(AmountReport::new(
                &self.symbol_of(exchange.hub),
                hub_amount,
                exchange.hub_decimals,
            )?),
            None => None,
        };

        info!(
            exchange = %name,
            ?kind,
            direction = ?request.direction,
            dependent = %selection.dependent(),
            "quoted swap"
        );

        Ok(QuoteReport {
            exchange: name.clone(),
            exchange_address: exchange.address,
            kind,
            direction: request.direction,
            input: AmountReport::new(&input_info.symbol, amount_in, input_info.decimals)?,
            output: AmountReport::new(&output_info.symbol, amount_out, output_info.decimals)?,
            intermediate,
            limit,
            tolerance_bips: self.tolerance.bips_for(kind.is_two_hop()),
            rate: display_rate(display.exchange_rate),
            inverted_rate: display_rate(display.exchange_rate_inverted),
            market_rate: display_rate(display.market_rate),
            price_impact_percent: display_percent(display.percent_slippage),
            warning: display.warning,
        })
    }

    /// Listed pool of `token` on the named exchange, read through the cache
    async fn pool_of(
        &self,
        exchange_name: &str,
        token: &str,
    ) -> Result<(&(String, Exchange), TokenInfo, Reserves)> {
        let entry = self.exchange_by_name(exchange_name)?;
        let (name, exchange) = entry;
        let (token, info) = self.resolve_token(token)?;
        if token == exchange.hub {
            bail!("{} is the hub coin of '{name}'", info.symbol);
        }

        let key = ReserveKey::new(self.chain_id, exchange.address, token);
        let reserves = self
            .cache
            .get_or_refresh(self.provider.as_ref(), key)
            .await?
            .ok_or(QuoteError::InsufficientLiquidity)
            .with_context(|| format!("No pool for {} on '{name}'", info.symbol))?;
        Ok((entry, info, reserves))
    }

    /// Preview depositing hub coin and the matching token amount.
    pub async fn add_liquidity(&self, request: &LiquidityRequest) -> Result<LiquidityReport> {
        let ((name, exchange), info, reserves) =
            self.pool_of(&request.exchange, &request.token).await?;
        let (hub_decimals, token_decimals) = (exchange.hub_decimals, info.decimals);
        let parse_coin = |text: &str| parse_amount(text, hub_decimals);
        let parse_token = |text: &str| parse_amount(text, token_decimals);
        let new_exchange = is_new_exchange(&reserves);
        let coin_text = request.coin_amount.as_deref();
        let token_text = request.token_amount.as_deref();

        let (coin_amount, token_amount, total_supply) = if new_exchange {
            let (Some(coin), Some(token)) = (coin_text, token_text) else {
                bail!("An empty pool needs both a coin and a token amount");
            };
            (parse_coin(coin)?, parse_token(token)?, U256::zero())
        } else {
            let supply = request
                .total_supply
                .as_deref()
                .context("An existing pool needs its pool token supply")?;
            let supply = parse_supply(supply)?;

            let rate_at = |invert| {
                get_exchange_rate(
                    Some(reserves.coin_reserve),
                    Some(hub_decimals),
                    Some(reserves.token_reserve),
                    Some(token_decimals),
                    invert,
                )
                .ok_or(QuoteError::InsufficientLiquidity)
            };

            match (coin_text, token_text) {
                (Some(coin), _) => {
                    let coin = parse_coin(coin)?;
                    let token =
                        token_amount_for_coin(rate_at(false)?, coin, hub_decimals, token_decimals)?;
                    (coin, token, supply)
                }
                (None, Some(token)) => {
                    let token = parse_token(token)?;
                    let coin =
                        coin_amount_for_token(rate_at(true)?, token, hub_decimals, token_decimals)?;
                    (coin, token, supply)
                }
                (None, None) => bail!("Give a coin or a token amount to deposit"),
            }
        };

        let max_token = if new_exchange {
            token_amount
        } else {
            calculate_slippage_bounds(token_amount, self.liquidity_bips).maximum
        };
        let minted = liquidity_minted(total_supply, coin_amount, &reserves)?;
        let min_liquidity = calculate_slippage_bounds(minted, self.liquidity_bips).minimum;
        let share = pool_share(minted, total_supply.saturating_add(minted));

        debug!(exchange = %name, new_exchange, %coin_amount, %token_amount, "previewed deposit");

        let hub_symbol = self.symbol_of(exchange.hub);
        Ok(LiquidityReport {
            exchange: name.clone(),
            new_exchange,
            coin: AmountReport::new(&hub_symbol, coin_amount, hub_decimals)?,
            token: AmountReport::new(&info.symbol, token_amount, token_decimals)?,
            max_token: AmountReport::new(&info.symbol, max_token, token_decimals)?,
            liquidity_minted: minted.to_string(),
            min_liquidity: min_liquidity.to_string(),
            pool_share_percent: display_percent(share),
        })
    }

    /// Preview burning pool tokens for their share of both reserves.
    ///
    /// The snapshot reserves stand in for the exchange's real balances, so a
    /// withdrawal past either reserve is `InsufficientLiquidity`.
    pub async fn remove_liquidity(
        &self,
        request: &RemoveLiquidityRequest,
    ) -> Result<RemoveLiquidityReport> {
        let ((name, exchange), info, reserves) =
            self.pool_of(&request.exchange, &request.token).await?;

        let supply = parse_supply(&request.total_supply)?;
        if supply.is_zero() {
            return Err(QuoteError::InsufficientLiquidity)
                .with_context(|| format!("No pool tokens issued for {} on '{name}'", info.symbol));
        }
        let burned = parse_amount(&request.pool_tokens, POOL_TOKEN_DECIMALS)?;
        let balance = match &request.balance {
            Some(text) => parse_amount(text, POOL_TOKEN_DECIMALS)?,
            None => burned,
        };
        if burned > balance {
            return Err(QuoteError::invalid_input("burning more pool tokens than held").into());
        }

        let ownership = pool_share(balance, supply).ok_or(QuoteError::InsufficientLiquidity)?;
        let per_coin = per_liquidity_token(reserves.coin_reserve, supply)
            .ok_or(QuoteError::InsufficientLiquidity)?;
        let per_token = per_liquidity_token(reserves.token_reserve, supply)
            .ok_or(QuoteError::InsufficientLiquidity)?;

        let coin_withdrawn = withdrawn_amount(per_coin, burned)?;
        let token_withdrawn = withdrawn_amount(per_token, burned)?;
        ensure_reserve_covers(reserves.coin_reserve, coin_withdrawn)
            .and_then(|()| ensure_reserve_covers(reserves.token_reserve, token_withdrawn))
            .with_context(|| format!("Withdrawal exceeds the reserves of '{name}'"))?;

        let min_coin = calculate_slippage_bounds(coin_withdrawn, self.liquidity_bips).minimum;
        let min_token = calculate_slippage_bounds(token_withdrawn, self.liquidity_bips).minimum;

        debug!(
            exchange = %name,
            %burned,
            %coin_withdrawn,
            %token_withdrawn,
            "previewed withdrawal"
        );

        let hub_symbol = self.symbol_of(exchange.hub);
        let hub_decimals = exchange.hub_decimals;
        Ok(RemoveLiquidityReport {
            exchange: name.clone(),
            pool_tokens: burned.to_string(),
            ownership_percent: display_percent(Some(ownership)),
            pooled_coin: AmountReport::new(
                &hub_symbol,
                share_of_reserve(reserves.coin_reserve, ownership)?,
                hub_decimals,
            )?,
            pooled_token: AmountReport::new(
                &info.symbol,
                share_of_reserve(reserves.token_reserve, ownership)?,
                info.decimals,
            )?,
            coin: AmountReport::new(&hub_symbol, coin_withdrawn, hub_decimals)?,
            token: AmountReport::new(&info.symbol, token_withdrawn, info.decimals)?,
            min_coin: AmountReport::new(&hub_symbol, min_coin, hub_decimals)?,
            min_token: AmountReport::new(&info.symbol, min_token, info.decimals)?,
        })
    }
}
