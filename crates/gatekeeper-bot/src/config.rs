//! Configuration for the bot binary.
//!
//! All configuration is loaded from environment variables. Only the store
//! connection matters to the core; without it the bot still starts, just
//! without a store.

use std::path::PathBuf;
use std::time::Duration;

use gatekeeper_db::PostgresConfig;

use crate::error::BotError;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const CONNECTION_VAR: &str = "GATEKEEPER_PGSQL_CONNECTION";

const MIGRATIONS_DIR_VAR: &str = "GATEKEEPER_MIGRATIONS_DIR";
const MAX_CONNECTIONS_VAR: &str = "GATEKEEPER_PG_MAX_CONNECTIONS";
const CONNECT_TIMEOUT_VAR: &str = "GATEKEEPER_PG_CONNECT_TIMEOUT_SECS";

const DEFAULT_MIGRATIONS_DIR: &str = "./sql";
const DEFAULT_MAX_CONNECTIONS: &str = "10";
const DEFAULT_CONNECT_TIMEOUT_SECS: &str = "5";

/// Complete bot configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Store connection settings. `None` when the connection URL is unset.
    pub postgres: Option<PostgresConfig>,
    /// Directory holding the `*.sql` migration scripts.
    pub migrations_dir: PathBuf,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `GATEKEEPER_PGSQL_CONNECTION` -- `PostgreSQL` URL; unset or blank
    ///   leaves the bot without a store
    /// - `GATEKEEPER_MIGRATIONS_DIR` -- migration scripts directory (default `./sql`)
    /// - `GATEKEEPER_PG_MAX_CONNECTIONS` -- pool size (default 10)
    /// - `GATEKEEPER_PG_CONNECT_TIMEOUT_SECS` -- connect timeout (default 5)
    pub fn from_env() -> Result<Self, BotError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BotError> {
        let max_connections: u32 = lookup(MAX_CONNECTIONS_VAR)
            .unwrap_or_else(|| DEFAULT_MAX_CONNECTIONS.to_owned())
            .parse()
            .map_err(|e| BotError::Config(format!("invalid {MAX_CONNECTIONS_VAR}: {e}")))?;
        if max_connections == 0 {
            return Err(BotError::Config(format!(
                "invalid {MAX_CONNECTIONS_VAR}: must be at least 1"
            )));
        }

        let connect_timeout_secs: u64 = lookup(CONNECT_TIMEOUT_VAR)
            .unwrap_or_else(|| DEFAULT_CONNECT_TIMEOUT_SECS.to_owned())
            .parse()
            .map_err(|e| BotError::Config(format!("invalid {CONNECT_TIMEOUT_VAR}: {e}")))?;

        let postgres = lookup(CONNECTION_VAR)
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                PostgresConfig::new(url.trim())
                    .with_max_connections(max_connections)
                    .with_connect_timeout(Duration::from_secs(connect_timeout_secs))
            });

        let migrations_dir = lookup(MIGRATIONS_DIR_VAR)
            .unwrap_or_else(|| DEFAULT_MIGRATIONS_DIR.to_owned())
            .into();

        Ok(Self {
            postgres,
            migrations_dir,
        })
    }
}
