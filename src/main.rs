//! Djed Client - Entry Point
//!
//! Command-line front end over the Djed client library. Each command
//! loads the configuration, connects to the node and runs one
//! operation; `watch` keeps polling until Ctrl-C.
//!
//! Wiring sequence:
//! 1. Load `.env` and config.toml + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Connect to the node (chain id check, rate limit, timeout)
//! 4. Resolve the Djed contract set
//! 5. Run the command; wallet commands also connect the wallet
//! 6. `watch`: spawn metrics + health servers and the market monitor,
//!    wait for SIGINT, then broadcast shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use djed_client::adapters::chain::{DjedProvider, RpcWallet};
use djed_client::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use djed_client::config::{self, AppConfig};
use djed_client::domain::session::truncate_address;
use djed_client::domain::{AccountDetails, CoinDetails, MaxAmount, TradeKind, TxPhase, WalletStatus};
use djed_client::error::DjedError;
use djed_client::ports::WalletGateway;
use djed_client::usecases::{plan_trade, DjedClient, MarketMonitor, PollEvent, TradeExecutor, TxSubmitter};

#[derive(Parser)]
#[command(name = "djed-client")]
#[command(about = "Read, quote and trade on a Djed stablecoin deployment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (defaults to config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wallet connection status
    Connect,

    /// Supplies, prices, reserve and reserve ratio
    Market,

    /// Reserve ratio bounds, fee and stablecoin threshold supply
    Params,

    /// Balances of an account (defaults to the wallet's first account)
    Account {
        address: Option<Address>,
    },

    /// Price a trade without submitting it
    Quote {
        #[arg(value_enum)]
        kind: TradeArg,
        /// Amount of coins, as a decimal string
        amount: String,
    },

    /// Maximum amount tradeable for an account
    Max {
        #[arg(value_enum)]
        kind: TradeArg,
        address: Option<Address>,
    },

    /// Quote, check and submit a trade through the wallet
    Trade {
        #[arg(value_enum)]
        kind: TradeArg,
        /// Amount of coins, as a decimal string
        amount: String,
    },

    /// Poll the market and export Prometheus metrics until Ctrl-C
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum TradeArg {
    BuySc,
    SellSc,
    BuyRc,
    SellRc,
}

impl From<TradeArg> for TradeKind {
    fn from(arg: TradeArg) -> Self {
        match arg {
            TradeArg::BuySc => Self::BuyStableCoin,
            TradeArg::SellSc => Self::SellStableCoin,
            TradeArg::BuyRc => Self::BuyReserveCoin,
            TradeArg::SellRc => Self::SellReserveCoin,
        }
    }
}

#[derive(Serialize)]
struct MarketView {
    #[serde(flatten)]
    coin_details: CoinDetails,
    oracle_exchange_rate: String,
}

#[derive(Serialize)]
struct MaxView {
    kind: TradeKind,
    max: MaxAmount,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config_path = cli.config.as_deref().map(|p| p.to_string_lossy().into_owned());
    let config = config::loader::resolve_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    // ── 2. Structured JSON logging on stderr ────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.network.chain_id,
        djed = %config.contracts.djed,
        "Starting Djed client"
    );

    match cli.command {
        Commands::Connect => connect(&config, cli.json).await,
        Commands::Market => {
            let (_, client) = open_client(&config).await?;
            let market = client.market();
            let (coin_details, oracle_exchange_rate) =
                tokio::try_join!(market.get_coin_details(), market.get_oracle_exchange_rate())?;
            let view = MarketView {
                coin_details,
                oracle_exchange_rate,
            };
            output(cli.json, &view, || render_market(&view))
        }
        Commands::Params => {
            let (_, client) = open_client(&config).await?;
            let params = client.market().get_system_params().await?;
            output(cli.json, &params, || {
                format!(
                    "reserve ratio min: {}\nreserve ratio max: {}\nfee: {}\nstablecoin threshold (unscaled): {}",
                    params.reserve_ratio_min,
                    params.reserve_ratio_max,
                    params.fee,
                    params.threshold_number_sc
                )
            })
        }
        Commands::Account { address } => {
            let (_, client) = open_client(&config).await?;
            let account = resolve_account(&config, address).await?;
            let details = client.market().get_account_details(account).await?;
            output(cli.json, &details, || render_account(&details))
        }
        Commands::Quote { kind, amount } => {
            let (_, client) = open_client(&config).await?;
            let quote = client.quoter().trade_data_price(kind.into(), &amount).await?;
            output(cli.json, &quote, || {
                format!("{}: {} for {} base asset", quote.kind, quote.amount_scaled, quote.total_scaled)
            })
        }
        Commands::Max { kind, address } => {
            let kind = TradeKind::from(kind);
            let (_, client) = open_client(&config).await?;
            let account = resolve_account(&config, address).await?;
            let market = client.market();
            let (coin_details, params, details) = tokio::try_join!(
                market.get_coin_details(),
                market.get_system_params(),
                market.get_account_details(account),
            )?;
            let max = client
                .quoter()
                .max_amount(kind, coin_details.unscaled_number_sc, params.threshold_number_sc, &details)
                .await?;
            let view = MaxView { kind, max };
            output(cli.json, &view, || format!("max {}: {}", view.kind, view.max))
        }
        Commands::Trade { kind, amount } => {
            let (_, client) = open_client(&config).await?;
            trade(&config, &client, kind.into(), &amount, cli.json).await
        }
        Commands::Watch => {
            let (provider, client) = open_client(&config).await?;
            watch(&config, provider, &client).await
        }
    }
}

/// Connect to the node (chain id check) and resolve the contract set.
async fn open_client(config: &AppConfig) -> Result<(Arc<DjedProvider>, DjedClient<DjedProvider>)> {
    let provider = Arc::new(
        DjedProvider::connect(&config.network)
            .await
            .context("Failed to connect to the node")?,
    );
    let client = DjedClient::connect(Arc::clone(&provider), &config.contracts, config.scaling)
        .await
        .context("Failed to resolve Djed contracts")?;
    Ok((provider, client))
}

/// Print `value` as JSON, or the human rendering.
fn output<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human());
    }
    Ok(())
}

fn render_market(view: &MarketView) -> String {
    let d = &view.coin_details;
    format!(
        "stablecoin supply: {}\nstablecoin price: {}\nreservecoin supply: {}\n\
         reservecoin buy price: {}\nreservecoin sell price: {}\nreserve: {}\n\
         reserve ratio: {}\noracle exchange rate: {}",
        d.scaled_number_sc,
        d.scaled_price_sc,
        d.scaled_number_rc,
        d.scaled_buy_price_rc,
        d.scaled_sell_price_rc,
        d.scaled_reserve_bc,
        d.percent_reserve_ratio,
        view.oracle_exchange_rate
    )
}

fn render_account(details: &AccountDetails) -> String {
    format!(
        "account: {}\nstablecoin: {}\nreservecoin: {}\nbase asset: {}",
        truncate_address(&details.account),
        details.scaled_balance_sc,
        details.scaled_balance_rc,
        details.scaled_balance_bc
    )
}

async fn connect(config: &AppConfig, json: bool) -> Result<()> {
    let status = match RpcWallet::connect(&config.network).await {
        Ok(wallet) => WalletStatus::from_accounts(&wallet.accounts().await?),
        Err(DjedError::WalletUnavailable(reason)) => {
            warn!(%reason, "Wallet unavailable");
            WalletStatus::Disconnected
        }
        Err(e) => return Err(e.into()),
    };
    output(json, &status, || status.label())
}

/// Explicit address, or the wallet's first account.
async fn resolve_account(config: &AppConfig, address: Option<Address>) -> Result<Address> {
    if let Some(address) = address {
        return Ok(address);
    }
    let wallet = RpcWallet::connect(&config.network).await?;
    WalletStatus::from_accounts(&wallet.accounts().await?)
        .account()
        .ok_or_else(|| DjedError::NoAccountConnected.into())
}

async fn trade(
    config: &AppConfig,
    client: &DjedClient<DjedProvider>,
    kind: TradeKind,
    amount: &str,
    json: bool,
) -> Result<()> {
    let wallet = Arc::new(RpcWallet::connect(&config.network).await?);
    let accounts = wallet.accounts().await?;
    let account = WalletStatus::from_accounts(&accounts)
        .account()
        .ok_or(DjedError::NoAccountConnected)?;

    let details = client.market().get_account_details(account).await?;
    let (quote, tx) = plan_trade(&client.quoter(), &client.tx_builder(), kind, amount, &details).await?;
    info!(%kind, amount = %quote.amount_scaled, total = %quote.total_scaled, "Trade planned");

    let submitter = TxSubmitter::new(
        client.reader(),
        wallet,
        Duration::from_millis(config.transactions.confirmation_delay_ms),
    );
    let executor = TradeExecutor::new(submitter);

    let mut phases = executor.subscribe();
    let progress = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = phases.borrow_and_update().clone();
            if !matches!(phase, TxPhase::Idle) {
                eprintln!("{}", phase.title());
            }
        }
    });

    let result = executor.execute(&accounts, &tx).await;
    drop(executor);
    let _ = progress.await;

    let phase = result?;
    output(json, &phase, || phase.title().to_string())
}

async fn watch(config: &AppConfig, provider: Arc<DjedProvider>, client: &DjedClient<DjedProvider>) -> Result<()> {
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());
    let mut servers = Vec::new();

    let metrics = if config.metrics.enabled {
        let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
        let metrics_handle = tokio::spawn(
            Arc::clone(&metrics).serve(config.metrics.bind_address.clone(), shutdown_tx.subscribe()),
        );
        let health_handle = tokio::spawn(
            HealthServer::new(Arc::clone(&health), config.metrics.health_port).run(shutdown_tx.subscribe()),
        );
        servers.push(metrics_handle);
        servers.push(health_handle);
        Some(metrics)
    } else {
        None
    };

    let monitor = MarketMonitor::new(
        client.market(),
        Duration::from_millis(config.watch.refresh_period_ms),
        shutdown_tx.subscribe(),
    );
    let (events_tx, mut events_rx) = mpsc::channel::<PollEvent>(16);
    let monitor_handle = tokio::spawn(monitor.run(events_tx));

    let consumer_health = Arc::clone(&health);
    let consumer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            if let Some(metrics) = &metrics {
                metrics.record_poll(event.is_ok());
                if let PollEvent::Ok { coin_details, .. } = &event {
                    metrics.record_coin_details(coin_details);
                }
            }
            if event.is_ok() {
                consumer_health.set_chain_healthy(true);
            } else {
                consumer_health.set_chain_healthy(provider.is_healthy().await);
            }
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(error = %e, "Failed to serialize poll event"),
            }
        }
    });

    info!("Market monitor running, Ctrl-C to stop");
    signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("SIGINT received, shutting down");

    let _ = shutdown_tx.send(());
    health.set_monitor_running(false);

    let polls = tokio::time::timeout(Duration::from_secs(5), monitor_handle)
        .await
        .ok()
        .and_then(Result::ok)
        .unwrap_or_default();
    let _ = tokio::time::timeout(Duration::from_secs(5), consumer).await;
    for handle in servers {
        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(Err(e))) => warn!(error = %e, "Server stopped with error"),
            Ok(Err(e)) => warn!(error = %e, "Server task panicked"),
            _ => {}
        }
    }

    info!(polls, "Shutdown complete");
    Ok(())
}
