//! Gatekeeper chat-bot entry point.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from environment variables
//! 3. Bootstrap `PostgreSQL`: connect and apply pending migrations
//! 4. Warm up the generator and print one masked message
//! 5. Read chat lines from stdin and log parsed commands until EOF
//!
//! A failed bootstrap is not fatal: the bot logs it, skips the warm-up, and
//! keeps accepting commands without a store.

mod config;
mod console;
mod error;

use anyhow::Context;
use gatekeeper_core::{StubGenerator, WarmUpPlan, warm_up};
use gatekeeper_db::{MigrationSource, PostgresPool};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{BotConfig, CONNECTION_VAR};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or reading stdin fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("gatekeeper starting");

    // 2. Load configuration.
    let config = BotConfig::from_env().context("failed to load configuration")?;
    info!(
        migrations_dir = %config.migrations_dir.display(),
        store_configured = config.postgres.is_some(),
        "Configuration loaded"
    );
    if config.postgres.is_none() {
        warn!("Could not find {CONNECTION_VAR} variable");
    }

    // 3. Bootstrap the store.
    let source = MigrationSource::directory(&config.migrations_dir);
    let store = match PostgresPool::bootstrap(config.postgres.as_ref(), &source).await {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, kind = ?e.kind(), "Running without a store");
            None
        }
    };

    // 4. Warm up the generator.
    if let Some(store) = &store {
        let generator = StubGenerator::new();
        match warm_up(&generator, store, &WarmUpPlan::default()).await {
            Ok(message) => println!("{message}"),
            Err(e) => warn!(error = %e, "Skipping warm-up message"),
        }
    }

    // 5. Take commands from stdin.
    let commands = console::run_console(BufReader::new(tokio::io::stdin()))
        .await
        .context("failed to read chat input")?;
    info!(commands, "Chat input closed");

    if let Some(store) = store {
        store.close().await;
    }

    Ok(())
}
