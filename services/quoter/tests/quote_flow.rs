//! End-to-end quotes from a TOML reserve snapshot

use simpleswap_amm::{QuoteError, SlippageWarning, SwapDirection, SwapKind};
use simpleswap_config::QuoteConfig;
use simpleswap_quoter::{
    snapshot_provider, LiquidityRequest, QuoteRequest, QuoteService, RemoveLiquidityRequest,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"
[global]
chain_id = 4
block_number = 100

[slippage]
token_bips = 150

[[exchanges]]
name = "usdx"
address = "0x00000000000000000000000000000000000000e1"
hub = "0x0000000000000000000000000000000000000010"
hub_decimals = 18

[[exchanges]]
name = "usdt"
address = "0x00000000000000000000000000000000000000e2"
hub = "0x0000000000000000000000000000000000000020"
hub_decimals = 6

[[tokens]]
address = "0x0000000000000000000000000000000000000010"
name = "USDx"
symbol = "USDx"
decimals = 18

[[tokens]]
address = "0x0000000000000000000000000000000000000020"
name = "Tether USD"
symbol = "USDT"
decimals = 6

[[tokens]]
address = "0x0000000000000000000000000000000000000030"
name = "CryptoCow"
symbol = "COW"
decimals = 18

[[tokens]]
address = "0x0000000000000000000000000000000000000040"
name = "Token 1"
symbol = "T1"
decimals = 18

[[tokens]]
address = "0x0000000000000000000000000000000000000050"
name = "Token 2"
symbol = "T2"
decimals = 18

[[reserves]]
exchange = "usdx"
token = "0x0000000000000000000000000000000000000030"
coin_reserve = "1000000000000000000000"
token_reserve = "2000000000000000000000"

[[reserves]]
exchange = "usdx"
token = "0x0000000000000000000000000000000000000040"
coin_reserve = "500000000000000000000"
token_reserve = "500000000000000000000"

[[reserves]]
exchange = "usdx"
token = "0x0000000000000000000000000000000000000050"
coin_reserve = "0"
token_reserve = "0"

[[reserves]]
exchange = "usdt"
token = "0x0000000000000000000000000000000000000030"
coin_reserve = "1000000000"
token_reserve = "1500000000000000000000"

[[reserves]]
exchange = "usdt"
token = "0x0000000000000000000000000000000000000040"
coin_reserve = "500000000"
token_reserve = "400000000000000000000"
"#;

fn load_config() -> (TempDir, QuoteConfig) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.toml");
    fs::write(&path, SNAPSHOT).unwrap();
    let config = QuoteConfig::load(Some(&path)).unwrap();
    (dir, config)
}

fn request(input: &str, output: &str, amount: &str, direction: SwapDirection) -> QuoteRequest {
    QuoteRequest {
        input: input.to_string(),
        output: output.to_string(),
        amount: amount.to_string(),
        direction,
    }
}

#[tokio::test]
async fn test_hub_to_token_quote() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    let report = service
        .quote(&request("USDx", "COW", "1", SwapDirection::ExactInput))
        .await
        .unwrap();

    assert_eq!(report.exchange, "usdx");
    assert_eq!(report.kind, SwapKind::HubToToken);
    assert_eq!(report.output.raw, "1992013962079806432");
    assert_eq!(report.output.display, "1.992");
    assert!(report.intermediate.is_none());
    assert_eq!(report.tolerance_bips, 100);
    assert_eq!(report.limit.raw, "1972093822459008368");
    assert_eq!(report.warning, SlippageWarning::None);
    assert!(report.rate.is_some());
}

#[tokio::test]
async fn test_token_to_token_picks_best_exchange() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    // the USDT exchange gives 5.1979 T1 against 4.8969 on USDx
    let report = service
        .quote(&request("COW", "T1", "10", SwapDirection::ExactInput))
        .await
        .unwrap();

    assert_eq!(report.exchange, "usdt");
    assert_eq!(report.kind, SwapKind::TokenToToken);
    assert_eq!(report.output.raw, "5197941524507657786");
    assert_eq!(report.tolerance_bips, 150);
    assert_eq!(report.limit.raw, "5119972401640042920");

    let hub = report.intermediate.unwrap();
    assert_eq!(hub.symbol, "USDT");
    assert_eq!(hub.raw, "6602780");
}

#[tokio::test]
async fn test_exact_output_needs_least_input() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    let report = service
        .quote(&request("COW", "T1", "5", SwapDirection::ExactOutput))
        .await
        .unwrap();

    assert_eq!(report.exchange, "usdt");
    assert_eq!(report.output.raw, "5000000000000000000");
    assert_eq!(report.input.raw, "9611909100785897588");
    assert_eq!(report.limit.raw, "9756087737297686051");
}

#[tokio::test]
async fn test_failures_map_to_quote_errors() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    // more COW than the pool holds
    let err = service
        .quote(&request("USDx", "COW", "2000", SwapDirection::ExactOutput))
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<QuoteError>(), Some(&QuoteError::InsufficientLiquidity));

    // T2 pool holds nothing yet
    let err = service
        .quote(&request("USDx", "T2", "1", SwapDirection::ExactInput))
        .await
        .unwrap_err();
    assert_eq!(err.downcast_ref::<QuoteError>(), Some(&QuoteError::InsufficientLiquidity));

    let err = service
        .quote(&request("USDx", "COW", "1.2.3", SwapDirection::ExactInput))
        .await
        .unwrap_err();
    let message = err.downcast_ref::<QuoteError>().map(QuoteError::user_message);
    assert_eq!(message, Some("input not valid"));

    assert!(service
        .quote(&request("USDx", "DAI", "1", SwapDirection::ExactInput))
        .await
        .is_err());
}

#[tokio::test]
async fn test_reads_are_cached_per_block() {
    let (_dir, config) = load_config();
    let provider = Arc::new(snapshot_provider(&config).unwrap());
    let service = QuoteService::with_provider(&config, provider.clone()).unwrap();
    let cow_to_t1 = request("COW", "T1", "10", SwapDirection::ExactInput);

    let first = service.quote(&cow_to_t1).await.unwrap();
    let reads = provider.reads();
    assert!(reads > 0);

    let second = service.quote(&cow_to_t1).await.unwrap();
    assert_eq!(provider.reads(), reads);
    assert_eq!(first.output, second.output);

    assert!(service.advance_block(101) > 0);
    assert!(service.cache().is_empty());
    service.quote(&cow_to_t1).await.unwrap();
    assert_eq!(provider.reads(), reads * 2);
}

#[tokio::test]
async fn test_add_liquidity_to_existing_pool() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    let report = service
        .add_liquidity(&LiquidityRequest {
            exchange: "usdx".to_string(),
            token: "COW".to_string(),
            coin_amount: Some("10".to_string()),
            token_amount: None,
            total_supply: Some("1000000000000000000000".to_string()),
        })
        .await
        .unwrap();

    assert!(!report.new_exchange);
    assert_eq!(report.token.raw, "20000000000000000000");
    assert_eq!(report.max_token.raw, "20400000000000000000");
    assert_eq!(report.liquidity_minted, "10000000000000000000");
    assert_eq!(report.min_liquidity, "9800000000000000000");
    assert_eq!(report.pool_share_percent.map(|p| p.to_string()), Some("0.99".to_string()));
}

#[tokio::test]
async fn test_first_deposit_sets_the_rate() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();
    let mut request = LiquidityRequest {
        exchange: "usdx".to_string(),
        token: "T2".to_string(),
        coin_amount: Some("10".to_string()),
        token_amount: None,
        total_supply: None,
    };

    assert!(service.add_liquidity(&request).await.is_err());

    // the token side alone cannot price an empty pool either
    request.coin_amount = None;
    request.token_amount = Some("50".to_string());
    assert!(service.add_liquidity(&request).await.is_err());

    request.coin_amount = Some("10".to_string());
    let report = service.add_liquidity(&request).await.unwrap();
    assert!(report.new_exchange);
    assert_eq!(report.token.raw, "50000000000000000000");
    assert_eq!(report.liquidity_minted, "10000000000000000000");
    assert_eq!(report.pool_share_percent.map(|p| p.to_string()), Some("100".to_string()));
}

#[tokio::test]
async fn test_add_liquidity_from_token_side() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    let report = service
        .add_liquidity(&LiquidityRequest {
            exchange: "usdx".to_string(),
            token: "COW".to_string(),
            coin_amount: None,
            token_amount: Some("20".to_string()),
            total_supply: Some("1000000000000000000000".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(report.coin.raw, "10000000000000000000");
    assert_eq!(report.token.raw, "20000000000000000000");
    assert_eq!(report.max_token.raw, "20400000000000000000");
    assert_eq!(report.liquidity_minted, "10000000000000000000");

    // 6-decimal hub: 15 COW at 0.666666 USDT each
    let report = service
        .add_liquidity(&LiquidityRequest {
            exchange: "usdt".to_string(),
            token: "COW".to_string(),
            coin_amount: None,
            token_amount: Some("15".to_string()),
            total_supply: Some("1000000000000000000000".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(report.coin.raw, "9999990");
    assert_eq!(report.coin.symbol, "USDT");
    assert_eq!(report.liquidity_minted, "9999990000000000000");
}

fn withdrawal(pool_tokens: &str, balance: Option<&str>) -> RemoveLiquidityRequest {
    RemoveLiquidityRequest {
        exchange: "usdx".to_string(),
        token: "COW".to_string(),
        pool_tokens: pool_tokens.to_string(),
        total_supply: "1000000000000000000000".to_string(),
        balance: balance.map(str::to_string),
    }
}

#[tokio::test]
async fn test_remove_liquidity_returns_share_of_both_reserves() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    let report = service.remove_liquidity(&withdrawal("100", None)).await.unwrap();
    assert_eq!(report.pool_tokens, "100000000000000000000");
    assert_eq!(report.ownership_percent.map(|p| p.to_string()), Some("10".to_string()));
    assert_eq!(report.coin.raw, "100000000000000000000");
    assert_eq!(report.token.raw, "200000000000000000000");
    assert_eq!(report.min_coin.raw, "98000000000000000000");
    assert_eq!(report.min_token.raw, "196000000000000000000");
    assert_eq!(report.pooled_coin.raw, "100000000000000000000");

    // burning part of a larger holding
    let report = service.remove_liquidity(&withdrawal("100", Some("400"))).await.unwrap();
    assert_eq!(report.ownership_percent.map(|p| p.to_string()), Some("40".to_string()));
    assert_eq!(report.pooled_coin.raw, "400000000000000000000");
    assert_eq!(report.pooled_token.raw, "800000000000000000000");
    assert_eq!(report.coin.raw, "100000000000000000000");
}

#[tokio::test]
async fn test_remove_liquidity_rejects_impossible_withdrawals() {
    let (_dir, config) = load_config();
    let service = QuoteService::from_config(&config).unwrap();

    // more pool tokens than were issued would drain past the reserves
    let err = service.remove_liquidity(&withdrawal("2000", None)).await.unwrap_err();
    assert_eq!(err.downcast_ref::<QuoteError>(), Some(&QuoteError::InsufficientLiquidity));

    let err = service
        .remove_liquidity(&withdrawal("100", Some("50")))
        .await
        .unwrap_err();
    let message = err.downcast_ref::<QuoteError>().map(QuoteError::user_message);
    assert_eq!(message, Some("input not valid"));

    let mut empty_supply = withdrawal("1", None);
    empty_supply.total_supply = "0".to_string();
    assert!(service.remove_liquidity(&empty_supply).await.is_err());
}
