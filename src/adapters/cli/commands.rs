//! CLI Command Handlers
//!
//! Implementation of all CLI commands for DeFiPass.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::jupiter::{JupiterClient, JupiterConfig};
use crate::adapters::solana::{parse_commitment, Ed25519Verifier, KeypairWallet, SolanaClient};
use crate::application::{
    BalanceReader, ConnectOutcome, ConnectionManager, PollPolicy, SessionHandle, SwapForm,
    SwapSettings, SwapWorkflow,
};
use crate::config::{load_config, Config};
use crate::domain::{
    explorer_address_url, explorer_tx_url, format_amount, truncate_address, DataSource,
    QuoteOutcome, TokenCatalog, TokenDescriptor,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/defipass.toml";

/// DeFiPass - Walletless Solana swaps through the Jupiter aggregator
#[derive(Parser, Debug)]
#[command(
    name = "defipass",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Walletless Solana swaps through the Jupiter aggregator",
    long_about = "DeFiPass connects a wallet session, lists popular tokens, quotes swaps \
                  through Jupiter (with offline fallback pricing) and signs swap payloads."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect the wallet and show address and balance
    Status(StatusCmd),

    /// List selectable tokens
    Tokens(TokensCmd),

    /// Get a quote for a token swap
    Quote(QuoteCmd),

    /// Sign and verify a token swap
    Swap(SwapCmd),
}

#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}

#[derive(Parser, Debug)]
pub struct TokensCmd {
    /// Show token tags
    #[arg(long)]
    pub tags: bool,
}

#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input token symbol or mint (e.g., SOL)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token symbol or mint (e.g., USDC)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount to swap, in display units
    #[arg(value_name = "AMOUNT")]
    pub amount: String,
}

#[derive(Parser, Debug)]
pub struct SwapCmd {
    /// Input token symbol or mint (e.g., SOL)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token symbol or mint (e.g., USDC)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount to swap, in display units
    #[arg(value_name = "AMOUNT")]
    pub amount: String,

    /// Confirm swap without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Report success right after signing
    #[arg(long)]
    pub no_verify: bool,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_or_default(&app.config)?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;
    tracing::debug!("Using config {}", app.config.display());

    match app.command {
        Command::Status(cmd) => status_command(cmd, &config).await,
        Command::Tokens(cmd) => tokens_command(cmd, &config).await,
        Command::Quote(cmd) => quote_command(cmd, &config).await,
        Command::Swap(cmd) => swap_command(cmd, &config).await,
    }
}

/// Config file if present, otherwise defaults plus env overrides
fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    config.validate().context("Invalid default configuration")?;
    Ok(config)
}

/// Level chosen from the flags, falling back to the configured one
fn flag_level<'a>(verbose: bool, debug: bool, configured: &'a str) -> &'a str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    }
}

/// A non-empty `RUST_LOG` wins over the flags and the config file
fn filter_directive(rust_log: Option<String>, verbose: bool, debug: bool, configured: &str) -> String {
    rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| flag_level(verbose, debug, configured).to_string())
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let directive = filter_directive(std::env::var("RUST_LOG").ok(), verbose, debug, configured);
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(flag_level(verbose, debug, configured)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn build_workflow(config: &Config, settings: SwapSettings) -> Result<SwapWorkflow> {
    let jupiter = JupiterClient::with_config(JupiterConfig::from(config))
        .context("Failed to create Jupiter client")?;

    Ok(SwapWorkflow::new(
        Arc::new(jupiter),
        Arc::new(Ed25519Verifier),
        settings,
    ))
}

fn build_connection(config: &Config) -> Result<ConnectionManager> {
    let path = config.solana.expanded_keypair_path();
    let wallet = KeypairWallet::from_file(&path)
        .with_context(|| format!("Failed to load keypair from {}", path.display()))?;

    Ok(ConnectionManager::new(Arc::new(wallet), PollPolicy::from(config)))
}

fn build_balance_reader(config: &Config) -> Result<BalanceReader> {
    let commitment = parse_commitment(&config.solana.commitment)
        .with_context(|| format!("Invalid commitment {:?}", config.solana.commitment))?;
    let client = SolanaClient::new(config.solana.rpc_url.clone(), commitment);
    Ok(BalanceReader::new(Arc::new(client)))
}

/// Connect and wait for a ready session, continuing once if no address showed up
async fn connect_session(manager: &ConnectionManager) -> Result<SessionHandle> {
    let outcome = manager.connect().await.map_err(|e| {
        tracing::error!("Connection failed: {}", e);
        anyhow::anyhow!(e.user_message())
    })?;

    match outcome {
        ConnectOutcome::Ready(session) => Ok(session),
        ConnectOutcome::AwaitingManualProceed => {
            println!("Wallet connected but no address reported yet, proceeding anyway...");
            manager
                .proceed_anyway()
                .map_err(|e| anyhow::anyhow!(e.user_message()))
        }
    }
}

fn resolve_token<'a>(catalog: &'a TokenCatalog, query: &str) -> Result<&'a TokenDescriptor> {
    match catalog.resolve(query) {
        Some(token) => Ok(token),
        None => {
            let known: Vec<&str> = catalog.tokens().iter().map(|t| t.symbol.as_str()).collect();
            bail!("Unknown token {:?}. Available: {}", query, known.join(", "))
        }
    }
}

fn source_note(source: DataSource) -> &'static str {
    match source {
        DataSource::Live => "",
        DataSource::Fallback => " (offline estimate)",
    }
}

/// Handle status command
async fn status_command(cmd: StatusCmd, config: &Config) -> Result<()> {
    let manager = build_connection(config)?;
    let session = connect_session(&manager).await?;
    let address = session
        .address()
        .context("Session is ready but has no address")?;

    let balance = build_balance_reader(config)?.sol_balance(&session).await;

    match cmd.format.as_str() {
        "json" => {
            let json = serde_json::json!({
                "state": session.state(),
                "address": address,
                "lamports": balance.map(|b| b.lamports),
                "balanceSource": balance.map(|b| b.source),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => {
            println!("Wallet:   {}", truncate_address(&address, 4, 4));
            println!("State:    {}", session.state());
            if let Some(balance) = balance {
                println!("Balance:  {}{}", balance.display(), source_note(balance.source));
            }
            println!("Explorer: {}", explorer_address_url(&address));
        }
    }

    manager.disconnect().await;
    Ok(())
}

/// Handle tokens command
async fn tokens_command(cmd: TokensCmd, config: &Config) -> Result<()> {
    let workflow = build_workflow(config, SwapSettings::from(config))?;
    let catalog = workflow
        .load_tokens()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!(
        "{} tokens{}",
        catalog.len(),
        source_note(catalog.source())
    );
    for token in catalog.tokens() {
        print!(
            "  {:<8} {:<24} {}  ({} decimals)",
            token.symbol,
            token.name,
            truncate_address(&token.address, 4, 4),
            token.decimals
        );
        if cmd.tags && !token.tags.is_empty() {
            print!("  [{}]", token.tags.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Quote and print; returns the form so the swap command can reuse it
async fn quote_and_print(
    workflow: &SwapWorkflow,
    input: &str,
    output: &str,
    amount: &str,
) -> Result<SwapForm> {
    let catalog = workflow
        .load_tokens()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let mut form = SwapForm {
        from_token: Some(resolve_token(&catalog, input)?.clone()),
        to_token: Some(resolve_token(&catalog, output)?.clone()),
        from_amount: amount.to_string(),
        ..SwapForm::default()
    };

    let outcome = workflow
        .get_quote(form.from_token.as_ref(), form.to_token.as_ref(), &form.from_amount)
        .await
        .map_err(|e| {
            tracing::error!("Quote failed: {}", e);
            anyhow::anyhow!("Failed to get swap quote. Please try different tokens or amount.")
        })?;
    form.apply_quote(&outcome);

    let QuoteOutcome::Priced(ref quote) = outcome else {
        println!("Enter an amount greater than zero");
        return Ok(form);
    };

    println!(
        "{} {} -> {} {}{}",
        format_amount(&form.from_amount, u32::from(quote.input_token.decimals)),
        quote.input_token.symbol,
        format_amount(&form.to_amount, u32::from(quote.output_token.decimals)),
        quote.output_token.symbol,
        source_note(quote.source)
    );
    println!("  Rate:         {}", form.rate_display());
    println!("  Price impact: {}%", quote.price_impact_pct);
    println!("  Route:        {}", quote.route_description());
    println!(
        "  Slippage:     {} bps",
        workflow.settings().slippage_bps
    );

    Ok(form)
}

/// Handle quote command
async fn quote_command(cmd: QuoteCmd, config: &Config) -> Result<()> {
    let workflow = build_workflow(config, SwapSettings::from(config))?;
    quote_and_print(&workflow, &cmd.input_token, &cmd.output_token, &cmd.amount).await?;
    Ok(())
}

/// Handle swap command
async fn swap_command(cmd: SwapCmd, config: &Config) -> Result<()> {
    let mut settings = SwapSettings::from(config);
    if cmd.no_verify {
        tracing::warn!("Signature verification disabled for this swap");
        settings.require_verification = false;
    }

    let workflow = build_workflow(config, settings)?;
    let form =
        quote_and_print(&workflow, &cmd.input_token, &cmd.output_token, &cmd.amount).await?;
    if !form.can_submit(workflow.is_swapping()) {
        bail!("Nothing to swap: select both tokens and an amount greater than zero");
    }

    if !cmd.yes {
        print!("\nSign this swap? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !matches!(input.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let manager = build_connection(config)?;
    let session = connect_session(&manager).await?;

    let result = workflow
        .swap(
            form.from_token.as_ref(),
            form.to_token.as_ref(),
            &form.from_amount,
            &session,
        )
        .await;
    manager.disconnect().await;

    let receipt = result.map_err(|e| {
        tracing::error!("Swap failed: {}", e);
        anyhow::anyhow!(e.user_message())
    })?;

    println!("\n{}", receipt.success_message());
    println!("  Signature:    {}", receipt.signature_base58());
    println!("  Verification: {:?}", receipt.verification);
    if receipt.source.is_live() {
        println!("  Explorer:     {}", explorer_tx_url(&receipt.txid));
    } else {
        println!("  Payload:      placeholder (aggregator unavailable)");
    }

    Ok(())
}
