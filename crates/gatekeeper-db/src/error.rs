//! Error types for the data layer.
//!
//! Every bootstrap failure surfaces as a [`DbError`]. Callers that need to
//! branch on the broad failure class use [`DbError::kind`].

/// Broad class of a data layer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Required configuration is missing or malformed.
    Configuration,
    /// The store is unreachable or a transaction primitive failed.
    Connectivity,
    /// A migration script or the migration bookkeeping failed.
    Migration,
}

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opening the `PostgreSQL` connection pool failed.
    #[error("PostgreSQL connection error: {0}")]
    Connect(#[source] sqlx::Error),

    /// Beginning or committing the migration transaction failed.
    #[error("PostgreSQL transaction error: {0}")]
    Transaction(#[source] sqlx::Error),

    /// A pending migration script failed to execute.
    #[error("Migration {script} failed: {source}")]
    Migration {
        /// Name of the script that failed.
        script: String,
        /// The underlying database error.
        source: sqlx::Error,
    },

    /// Reading or writing the migration tracking table failed.
    #[error("Migration tracking error: {0}")]
    Tracking(#[source] sqlx::Error),

    /// The migration scripts could not be loaded.
    #[error("Migration source error: {0}")]
    Source(String),
}

impl DbError {
    /// Classify this error.
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) => FailureKind::Configuration,
            Self::Connect(_) | Self::Transaction(_) => FailureKind::Connectivity,
            Self::Migration { .. } | Self::Tracking(_) | Self::Source(_) => FailureKind::Migration,
        }
    }
}
