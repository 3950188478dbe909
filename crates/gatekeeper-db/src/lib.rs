//! Data layer for the Gatekeeper bot (`PostgreSQL`).
//!
//! The store must be at a known schema version before any other component
//! touches it. [`PostgresPool::bootstrap`] is the single entry point that
//! produces a usable handle:
//!
//! ```text
//! bootstrap(config, source)
//!     |
//!     +-- no config ----------------> Err(Config)      (no connection attempted)
//!     +-- connect ------------------> Err(Connect)
//!     +-- BEGIN
//!     |     +-- apply_pending ------> ROLLBACK, close, Err(Migration | Tracking | Source)
//!     |     +-- COMMIT -------------> close, Err(Transaction) on failure
//!     |
//!     +-- Ok(PostgresPool)          (every pending script durably applied)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, and bootstrap
//! - [`migration`] -- ordered, run-once migration scripts
//! - [`error`] -- shared error types

pub mod error;
pub mod migration;
pub mod postgres;

// Re-export primary types for convenience.
pub use error::{DbError, FailureKind};
pub use migration::{
    AppliedMigration, MigrationReport, MigrationScript, MigrationSource, apply_pending,
};
pub use postgres::{PostgresConfig, PostgresPool};
