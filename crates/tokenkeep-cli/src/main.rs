mod cli;
mod config;
mod storage;

use chrono::{DateTime, Utc};
use clap::Parser;
use color_eyre::Result;
use tokenkeep_core::{Credential, CredentialStore};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand};

const HEALTH_PROBE_KEY: &str = "health-probe";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let namespace = config.namespace_or_default(cli.namespace.as_deref());

    match cli.command {
        Command::Version => print_version(),
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        Command::Get { key } => {
            let store = storage::store_from_config(&config, &namespace).await?;
            run_get(&store, &key).await?
        }
        Command::Store {
            key,
            id,
            token,
            expires_at,
        } => {
            let store = storage::store_from_config(&config, &namespace).await?;
            run_store(&store, &key, build_credential(id, token, expires_at)).await?
        }
        Command::Remove { key } => {
            let store = storage::store_from_config(&config, &namespace).await?;
            store.remove_credential(&key).await?;
            println!("Removed {key}");
        }
        Command::Health => {
            let store = storage::store_from_config(&config, &namespace).await?;
            run_store_health(&store).await?;
            println!("Storage: ok ({})", store.root().display());
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("tokenkeep {}", env!("CARGO_PKG_VERSION"));
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

fn build_credential(id: String, token: String, expires_at: Option<DateTime<Utc>>) -> Credential {
    let credential = Credential::new(id, token);
    match expires_at {
        Some(at) => credential.with_expiry(at),
        None => credential,
    }
}

async fn run_get<S: CredentialStore>(store: &S, key: &str) -> Result<()> {
    match store.get_credential(key).await? {
        Some(credential) => {
            if credential.is_expired(Utc::now()) {
                warn!(key, "stored credential has expired");
            }
            println!("{}", serde_json::to_string_pretty(&credential)?);
        }
        None => println!("No credential stored under {key}"),
    }
    Ok(())
}

async fn run_store<S: CredentialStore>(store: &S, key: &str, credential: Credential) -> Result<()> {
    store.store_credential(key, &credential).await?;
    println!("Stored {key}");
    Ok(())
}

/// Store, read back and remove a probe credential.
async fn run_store_health<S: CredentialStore>(store: &S) -> Result<()> {
    let probe = Credential::new("health", "ok");
    store.store_credential(HEALTH_PROBE_KEY, &probe).await?;
    let round_trip = store.get_credential(HEALTH_PROBE_KEY).await?;
    store.remove_credential(HEALTH_PROBE_KEY).await?;

    if round_trip.as_ref() != Some(&probe) {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    if store.get_credential(HEALTH_PROBE_KEY).await?.is_some() {
        color_eyre::eyre::bail!("probe credential survived removal");
    }
    Ok(())
}
