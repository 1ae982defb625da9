//! SimpleSwap quote CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use simpleswap_amm::{QuoteError, SwapDirection};
use simpleswap_config::QuoteConfig;
use simpleswap_quoter::{
    init_logging, LiquidityRequest, QuoteRequest, QuoteService, RemoveLiquidityRequest,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overrides the configured one
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a swap on the best exchange
    Quote {
        /// Token sold, symbol or address
        #[arg(long)]
        from: String,

        /// Token bought, symbol or address
        #[arg(long)]
        to: String,

        /// Amount in display units; the input unless --exact-output
        amount: String,

        /// Treat the amount as the exact output
        #[arg(long)]
        exact_output: bool,

        #[arg(long)]
        json: bool,
    },

    /// Preview a liquidity deposit
    AddLiquidity {
        /// Exchange name from the config
        #[arg(long)]
        exchange: String,

        /// Listed token, symbol or address
        #[arg(long)]
        token: String,

        /// Hub coin deposited, display units
        #[arg(long, required_unless_present = "token_amount")]
        coin_amount: Option<String>,

        /// Token deposited, display units; needed with the coin amount for a new pool
        #[arg(long)]
        token_amount: Option<String>,

        /// Current pool token supply in base units
        #[arg(long)]
        total_supply: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Preview burning pool tokens
    RemoveLiquidity {
        /// Exchange name from the config
        #[arg(long)]
        exchange: String,

        /// Listed token, symbol or address
        #[arg(long)]
        token: String,

        /// Pool tokens burned, display units
        pool_tokens: String,

        /// Current pool token supply in base units
        #[arg(long)]
        total_supply: String,

        /// Pool tokens held, display units; defaults to the amount burned
        #[arg(long)]
        balance: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List known tokens of the configured chain
    Tokens,

    /// Print the effective configuration as TOML
    Config,
}

fn print<T: Serialize + std::fmt::Display>(report: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

async fn run(args: Args, config: QuoteConfig) -> Result<()> {
    match args.command {
        Command::Quote {
            from,
            to,
            amount,
            exact_output,
            json,
        } => {
            let service = QuoteService::from_config(&config)?;
            let direction = if exact_output {
                SwapDirection::ExactOutput
            } else {
                SwapDirection::ExactInput
            };
            let report = service
                .quote(&QuoteRequest {
                    input: from,
                    output: to,
                    amount,
                    direction,
                })
                .await?;
            print(&report, json)?;
        }
        Command::AddLiquidity {
            exchange,
            token,
            coin_amount,
            token_amount,
            total_supply,
            json,
        } => {
            let service = QuoteService::from_config(&config)?;
            let report = service
                .add_liquidity(&LiquidityRequest {
                    exchange,
                    token,
                    coin_amount,
                    token_amount,
                    total_supply,
                })
                .await?;
            print(&report, json)?;
        }
        Command::RemoveLiquidity {
            exchange,
            token,
            pool_tokens,
            total_supply,
            balance,
            json,
        } => {
            let service = QuoteService::from_config(&config)?;
            let report = service
                .remove_liquidity(&RemoveLiquidityRequest {
                    exchange,
                    token,
                    pool_tokens,
                    total_supply,
                    balance,
                })
                .await?;
            print(&report, json)?;
        }
        Command::Tokens => {
            let service = QuoteService::from_config(&config)?;
            let mut tokens = service.registry().tokens_on(config.global.chain_id);
            tokens.sort_by(|a, b| a.1.symbol.cmp(&b.1.symbol));
            for (address, info) in tokens {
                println!("{:<8} {:>2}  {:?}  {}", info.symbol, info.decimals, address, info.name);
            }
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match QuoteConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let level = args.log_level.as_deref().unwrap_or(&config.global.log_level);
    if let Err(err) = init_logging(level, args.json_logs || config.global.json_logs) {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }
    debug!(chain_id = config.global.chain_id, "configuration loaded");

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            match err.downcast_ref::<QuoteError>() {
                Some(quote_err) => eprintln!("{}", quote_err.user_message()),
                None => eprintln!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
