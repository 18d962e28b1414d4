use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretSlice;
use tracing_subscriber::prelude::*;
use vp_crypto::CryptUtil;
use vp_crypto::signer::eddsa::EDDSACryptUtil;
use vp_exchange_core::config::core_config::ExchangeConfig;
use vp_exchange_core::model::message::{Message, Notification};
use vp_exchange_core::provider::event_channel::{EventChannel, LocalEventBus};
use vp_exchange_core::repository::in_memory::InMemoryWallet;
use vp_exchange_core::{Collaborators, build_orchestrator};

/// Answers challenge requests on behalf of a local wallet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<Vec<PathBuf>>,

    /// Challenge request JSON files, processed in order against the same wallet
    #[arg(short, long, value_name = "FILE", required = true)]
    request: Vec<PathBuf>,

    /// Hex encoded wallet seed, a random one is generated when absent
    #[arg(long, env = "VP_EXCHANGE_SEED", hide_env_values = true)]
    seed: Option<String>,

    /// Overrides the configured account
    #[arg(long)]
    account: Option<u32>,

    /// Discloses requested claims without asking
    #[arg(long)]
    auto_consent: bool,

    #[arg(long, default_value = "info")]
    trace_level: String,

    #[arg(long)]
    trace_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_files = cli.config.clone().unwrap_or_default();
    let mut config = ExchangeConfig::from_files(config_files.as_slice())?;
    if let Some(account) = cli.account {
        config.account_id = account;
    }

    initialize_tracing(&cli.trace_level, cli.trace_json)?;

    let crypt_util: Arc<dyn CryptUtil> = match &cli.seed {
        Some(seed) => {
            let seed = SecretSlice::from(hex::decode(seed).context("Seed is not valid hex")?);
            Arc::new(EDDSACryptUtil::new(seed)?)
        }
        None => {
            tracing::warn!("No seed given, using a throwaway wallet");
            Arc::new(EDDSACryptUtil::generate())
        }
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, config, crypt_util))
}

async fn run(
    cli: Cli,
    config: ExchangeConfig,
    crypt_util: Arc<dyn CryptUtil>,
) -> anyhow::Result<()> {
    let wallet = Arc::new(InMemoryWallet::new(crypt_util.clone()));
    let bus = Arc::new(LocalEventBus::new());

    let collaborators = Collaborators::with_defaults(&config, crypt_util, wallet.clone())?;
    let orchestrator = Arc::new(build_orchestrator(&config, collaborators, bus.clone()));
    bus.register(orchestrator).await;

    for path in &cli.request {
        let payload = read_json(path)?;
        tracing::info!(request = %path.display(), "Processing challenge request");

        let notifications = bus
            .dispatch(Message::process_challenge_request(payload))
            .await?;
        print_notifications(&notifications)?;

        let Some(consent) = notifications.iter().find_map(Notification::consent) else {
            continue;
        };

        if !cli.auto_consent {
            tracing::warn!(
                request = %path.display(),
                "Consent required, rerun with --auto-consent to disclose"
            );
            continue;
        }

        let notifications = bus
            .dispatch(Message::accept_consent(&consent.context())?)
            .await?;
        print_notifications(&notifications)?;
    }

    tracing::info!(
        credentials = wallet.credentials().await.len(),
        transactions = wallet.transactions().await.len(),
        "Done"
    );
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed reading {}", path.display()))?;
    serde_json::from_slice(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_notifications(notifications: &[Notification]) -> anyhow::Result<()> {
    for notification in notifications {
        println!("{}", serde_json::to_string_pretty(notification)?);
    }
    Ok(())
}

fn initialize_tracing(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))?;

    let tracing_layer = tracing_subscriber::registry().with(filter);

    if json {
        tracing_layer
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_layer.with(tracing_subscriber::fmt::layer()).init();
    };
    Ok(())
}
