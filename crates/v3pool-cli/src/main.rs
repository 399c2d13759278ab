use alloy::primitives::{Address, U256};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use v3pool_core::{
    compute_pool_salt, convert_slot0_to_price, order_tokens, PoolKey, PoolLocator, PriceResult,
};
use v3pool_data::{
    parse_address, Chain, ChainRegistry, Derivation, DescriptorSource, DirectoryDescriptors,
    EmbeddedDescriptors, FeeTier, Token,
};

struct AppContext {
    locator: PoolLocator,
}

#[derive(Parser, Debug)]
#[command(name = "v3pool")]
#[command(about = "Uniswap V3 pool address derivation and price toolkit")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Read interface descriptors from this directory instead of the bundled ones.
    #[arg(long, global = true)]
    abi_dir: Option<PathBuf>,

    /// HTTP timeout for each RPC call.
    #[arg(long, global = true, default_value_t = 10)]
    rpc_timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List configured chains and how their pools are located.
    Chains(ChainsArgs),
    /// Order two token addresses canonically.
    Order(OrderArgs),
    /// Derive a pool address.
    Derive(DeriveArgs),
    /// Convert a raw sqrtPriceX96 into a decimal price.
    Price(PriceArgs),
    /// Read slot0 from a pool.
    Slot0(Slot0Args),
    /// Derive a pool, read its slot0 and print the price.
    Quote(QuoteArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
struct ChainsArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Args, Debug)]
struct OrderArgs {
    token_a: String,
    token_b: String,
}

#[derive(Args, Debug)]
struct DeriveArgs {
    #[arg(long)]
    chain: Chain,

    /// Fee tier: 100, 500, 3000, 10000 or lowest/low/medium/high.
    #[arg(long, default_value = "3000")]
    fee: FeeTier,

    #[arg(value_parser = parse_address_arg)]
    token_a: Address,

    #[arg(value_parser = parse_address_arg)]
    token_b: Address,

    /// Also print the CREATE2 salt.
    #[arg(long)]
    salt: bool,
}

#[derive(Args, Debug)]
struct PriceArgs {
    /// Raw sqrtPriceX96, decimal or 0x-prefixed hex.
    sqrt_price_x96: String,

    /// Decimals of token0, 0 to 255.
    #[arg(long, default_value_t = 18, allow_negative_numbers = true)]
    decimals0: i32,

    /// Decimals of token1, 0 to 255.
    #[arg(long, default_value_t = 18, allow_negative_numbers = true)]
    decimals1: i32,

    /// Print token0 per token1 instead.
    #[arg(long)]
    invert: bool,
}

#[derive(Args, Debug)]
struct Slot0Args {
    #[arg(long)]
    chain: Chain,

    #[arg(value_parser = parse_address_arg)]
    pool: Address,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    #[arg(long)]
    chain: Chain,

    #[arg(long, default_value = "3000")]
    fee: FeeTier,

    #[arg(value_parser = parse_address_arg)]
    token_a: Address,

    #[arg(value_parser = parse_address_arg)]
    token_b: Address,

    #[arg(long, default_value_t = 18)]
    decimals_a: u8,

    #[arg(long, default_value_t = 18)]
    decimals_b: u8,

    #[arg(long)]
    symbol_a: Option<String>,

    #[arg(long)]
    symbol_b: Option<String>,

    /// Print token0 per token1 instead.
    #[arg(long)]
    invert: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

fn parse_address_arg(s: &str) -> Result<Address, String> {
    parse_address(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let registry = Arc::new(ChainRegistry::uniswap_v3().with_env_overrides());
    let descriptors: Arc<dyn DescriptorSource> = match cli.abi_dir {
        Some(dir) => {
            info!(abi_dir = %dir.display(), "using on-disk interface descriptors");
            Arc::new(DirectoryDescriptors::new(dir))
        }
        None => Arc::new(EmbeddedDescriptors),
    };
    let locator = PoolLocator::connect(
        registry,
        descriptors,
        Duration::from_secs(cli.rpc_timeout_secs),
    )
    .wrap_err("failed to set up RPC callers")?;

    let ctx = AppContext { locator };

    match cli.command {
        Commands::Chains(args) => handle_chains(&ctx, args),
        Commands::Order(args) => handle_order(args),
        Commands::Derive(args) => handle_derive(&ctx, args).await,
        Commands::Price(args) => handle_price(args),
        Commands::Slot0(args) => handle_slot0(&ctx, args).await,
        Commands::Quote(args) => handle_quote(&ctx, args).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn handle_chains(ctx: &AppContext, args: ChainsArgs) -> Result<()> {
    let registry = ctx.locator.registry();
    let chains = registry.chains();

    match args.output {
        OutputFormat::Json => {
            let rows = chains
                .iter()
                .map(|&chain| {
                    let config = registry.config(chain)?;
                    Ok(serde_json::json!({
                        "chain": chain,
                        "chain_id": chain.id(),
                        "factory": format!("{:#x}", config.factory_address),
                        "derivation": derivation_label(config.derivation),
                        "init_code_hash": config.init_code_hash().map(|h| format!("{h:#x}")),
                        "rpc_endpoint": config.rpc_endpoint,
                        "pool_descriptor": config.pool_abi_descriptor,
                        "factory_descriptor": config.factory_abi_descriptor,
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            let json_str =
                serde_json::to_string_pretty(&rows).wrap_err("failed to serialize JSON")?;
            println!("{json_str}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec![
                "Chain",
                "Chain ID",
                "Factory",
                "Derivation",
                "RPC Endpoint",
                "Pool Descriptor",
            ]);
            for chain in chains {
                let config = registry.config(chain)?;
                table.add_row(vec![
                    chain.to_string(),
                    chain.id().to_string(),
                    format!("{:#x}", config.factory_address),
                    derivation_label(config.derivation).to_string(),
                    config.rpc_endpoint.clone().unwrap_or_else(|| "-".to_string()),
                    config
                        .pool_abi_descriptor
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}\n");
        }
    }
    Ok(())
}

fn derivation_label(derivation: Derivation) -> &'static str {
    match derivation {
        Derivation::Create2 { .. } => "create2",
        Derivation::FactoryLookup => "factory lookup",
    }
}

fn handle_order(args: OrderArgs) -> Result<()> {
    let (token0, token1) = order_tokens(&args.token_a, &args.token_b)?;
    println!("token0: {token0:#x}");
    println!("token1: {token1:#x}");
    Ok(())
}

async fn handle_derive(ctx: &AppContext, args: DeriveArgs) -> Result<()> {
    let pool = ctx
        .locator
        .derive_pool_address(args.token_a, args.token_b, args.fee, args.chain)
        .await?;

    println!("{pool:#x}");
    if args.salt {
        let key = PoolKey::new(args.token_a, args.token_b, args.fee)?;
        println!("salt: {:#x}", compute_pool_salt(&key));
    }
    Ok(())
}

fn handle_price(args: PriceArgs) -> Result<()> {
    let sqrt_price_x96 = parse_u256(&args.sqrt_price_x96)?;
    let price = convert_slot0_to_price(sqrt_price_x96, args.decimals0, args.decimals1)?;
    println!("{}", oriented(&price, args.invert)?);
    Ok(())
}

fn parse_u256(input: &str) -> Result<U256> {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|e| eyre!("invalid sqrtPriceX96 {input:?}: {e}"))
}

fn oriented(price: &PriceResult, invert: bool) -> Result<PriceResult> {
    if !invert {
        return Ok(price.clone());
    }
    price
        .inverse()
        .ok_or_else(|| eyre!("cannot invert a zero price"))
}

async fn handle_slot0(ctx: &AppContext, args: Slot0Args) -> Result<()> {
    let slot0 = ctx.locator.fetch_slot0(args.pool, args.chain).await?;

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["sqrtPriceX96".to_string(), slot0.sqrt_price_x96.to_string()]);
    table.add_row(vec!["tick".to_string(), slot0.tick.to_string()]);
    table.add_row(vec![
        "observationIndex".to_string(),
        slot0.observation_index.to_string(),
    ]);
    table.add_row(vec![
        "observationCardinality".to_string(),
        slot0.observation_cardinality.to_string(),
    ]);
    table.add_row(vec![
        "observationCardinalityNext".to_string(),
        slot0.observation_cardinality_next.to_string(),
    ]);
    table.add_row(vec!["feeProtocol".to_string(), slot0.fee_protocol.to_string()]);
    table.add_row(vec!["unlocked".to_string(), slot0.unlocked.to_string()]);
    println!("{table}\n");
    Ok(())
}

async fn handle_quote(ctx: &AppContext, args: QuoteArgs) -> Result<()> {
    let token_a = build_token(args.token_a, args.decimals_a, args.symbol_a);
    let token_b = build_token(args.token_b, args.decimals_b, args.symbol_b);

    let quote = ctx
        .locator
        .fetch_pool_price(token_a, token_b, args.fee, args.chain)
        .await?;

    let price = oriented(&quote.price, args.invert)?;
    let (base, quote_token) = if args.invert {
        (&quote.token1, &quote.token0)
    } else {
        (&quote.token0, &quote.token1)
    };

    match args.output {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "chain": quote.chain,
                "pool": format!("{:#x}", quote.pool),
                "fee": quote.fee,
                "token0": format!("{:#x}", quote.token0.address),
                "token1": format!("{:#x}", quote.token1.address),
                "sqrt_price_x96": quote.slot0.sqrt_price_x96.to_string(),
                "tick": quote.slot0.tick,
                "base": base.label(),
                "quote": quote_token.label(),
                "price": price.display,
            });
            let json_str =
                serde_json::to_string_pretty(&output).wrap_err("failed to serialize JSON")?;
            println!("{json_str}");
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Metric", "Value"]);
            table.add_row(vec!["Chain".to_string(), quote.chain.to_string()]);
            table.add_row(vec!["Pool".to_string(), format!("{:#x}", quote.pool)]);
            table.add_row(vec!["Fee".to_string(), quote.fee.to_string()]);
            table.add_row(vec!["token0".to_string(), quote.token0.label()]);
            table.add_row(vec!["token1".to_string(), quote.token1.label()]);
            table.add_row(vec![
                "sqrtPriceX96".to_string(),
                quote.slot0.sqrt_price_x96.to_string(),
            ]);
            table.add_row(vec!["Tick".to_string(), quote.slot0.tick.to_string()]);
            table.add_row(vec![
                format!("Price ({} per {})", quote_token.label(), base.label()),
                price.display,
            ]);
            println!("{table}\n");
        }
    }
    Ok(())
}

fn build_token(address: Address, decimals: u8, symbol: Option<String>) -> Token {
    let token = Token::new(address).with_decimals(decimals);
    match symbol {
        Some(symbol) => token.with_symbol(symbol),
        None => token,
    }
}
