//! Ordered, run-once schema migrations.
//!
//! Migration scripts are plain SQL files identified by their file name.
//! They are applied in ascending name order, and each applied script is
//! recorded in the `migrations` tracking table so it never runs twice.
//!
//! [`apply_pending`] works entirely inside a transaction owned by the
//! caller. The caller commits only when it returns `Ok`, which makes a
//! migration pass all-or-nothing.
//!
//! ```text
//! sql/
//!   001_create_users.sql      <- applied in group 1
//!   002_add_index.sql         <- applied in group 1
//!   003_add_column.sql        <- added later, applied in group 2
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::error::DbError;

/// Advisory lock key held for the duration of a migration transaction.
///
/// Serializes concurrent bootstraps of several bot instances against the
/// same database.
const MIGRATION_LOCK_KEY: i64 = 0x6761_7465_6b65_6570;

/// File extension of migration scripts in a directory source.
const SCRIPT_EXTENSION: &str = "sql";

const CREATE_TRACKING_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    file_path  VARCHAR(255) UNIQUE NOT NULL,
    group_id   INTEGER NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// A single named schema change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    name: String,
    sql: String,
}

impl MigrationScript {
    /// Create a script from its identifier and SQL text.
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// The identifier that orders this script and is stored once applied.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The SQL statements of this script.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Where migration scripts come from.
#[derive(Debug, Clone)]
pub enum MigrationSource {
    /// Every `*.sql` file directly inside the directory.
    Directory(PathBuf),
    /// Scripts supplied in-process.
    Embedded(Vec<MigrationScript>),
}

impl MigrationSource {
    /// A source reading `*.sql` files from `path`.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }

    /// Load every script, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Source`] if the directory cannot be read, a file
    /// name is not valid UTF-8, or two scripts share a name.
    pub fn load(&self) -> Result<Vec<MigrationScript>, DbError> {
        let mut scripts = match self {
            Self::Directory(dir) => read_directory(dir)?,
            Self::Embedded(scripts) => scripts.clone(),
        };
        scripts.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some((duplicate, _)) = scripts
            .iter()
            .zip(scripts.iter().skip(1))
            .find(|(a, b)| a.name == b.name)
        {
            return Err(DbError::Source(format!(
                "duplicate migration script name: {}",
                duplicate.name
            )));
        }

        Ok(scripts)
    }
}

/// Read the `*.sql` files of a directory. Subdirectories and other files
/// are ignored.
fn read_directory(dir: &Path) -> Result<Vec<MigrationScript>, DbError> {
    let source_error =
        |e: std::io::Error| DbError::Source(format!("cannot read {}: {e}", dir.display()));

    let mut scripts = Vec::new();
    for entry in fs::read_dir(dir).map_err(source_error)? {
        let path = entry.map_err(source_error)?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != SCRIPT_EXTENSION) {
            continue;
        }

        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DbError::Source(format!(
                    "migration file name is not valid UTF-8: {}",
                    path.display()
                ))
            })?
            .to_owned();
        let sql = fs::read_to_string(&path)
            .map_err(|e| DbError::Source(format!("cannot read {}: {e}", path.display())))?;

        scripts.push(MigrationScript { name, sql });
    }
    Ok(scripts)
}

/// Outcome of one migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Group number shared by every script applied in this pass.
    ///
    /// `None` when there was nothing to apply.
    pub group_id: Option<i32>,
    /// Names of the scripts applied in this pass, in order.
    pub applied: Vec<String>,
    /// Number of scripts skipped because they were applied before.
    pub already_applied: usize,
}

impl MigrationReport {
    /// Whether this pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// A row of the `migrations` tracking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AppliedMigration {
    /// Name of the applied script.
    pub file_path: String,
    /// Migration pass that applied the script.
    pub group_id: i32,
    /// When the script was applied.
    pub applied_at: DateTime<Utc>,
}

/// Apply every script from `source` that has not been applied yet.
///
/// Runs inside `tx`: the tracking table is created if missing, pending
/// scripts are executed in name order, and each one is recorded. Nothing is
/// committed here. On `Err` the caller must roll `tx` back, which discards
/// every script of this pass.
///
/// Calling this again with no new scripts is a no-op that returns an empty
/// report.
///
/// # Errors
///
/// Returns [`DbError::Migration`] naming the first script that failed,
/// [`DbError::Tracking`] if the bookkeeping queries fail, or
/// [`DbError::Source`] if the scripts cannot be loaded.
pub async fn apply_pending(
    tx: &mut Transaction<'_, Postgres>,
    source: &MigrationSource,
) -> Result<MigrationReport, DbError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut **tx)
        .await
        .map_err(DbError::Tracking)?;

    sqlx::raw_sql(CREATE_TRACKING_TABLE)
        .execute(&mut **tx)
        .await
        .map_err(DbError::Tracking)?;

    let scripts = source.load()?;

    let applied: BTreeSet<String> = sqlx::query_scalar::<_, String>("SELECT file_path FROM migrations")
        .fetch_all(&mut **tx)
        .await
        .map_err(DbError::Tracking)?
        .into_iter()
        .collect();

    for orphan in untracked_names(&scripts, &applied) {
        warn!(file_path = orphan, "Applied migration has no matching script");
    }

    let pending = pending_scripts(&scripts, &applied);
    let already_applied = scripts.len().saturating_sub(pending.len());
    if pending.is_empty() {
        info!(already_applied, "No new migrations to apply");
        return Ok(MigrationReport {
            already_applied,
            ..MigrationReport::default()
        });
    }

    let last_group: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(group_id), 0) FROM migrations")
        .fetch_one(&mut **tx)
        .await
        .map_err(DbError::Tracking)?;
    let group_id = last_group.saturating_add(1);

    let mut applied_now = Vec::with_capacity(pending.len());
    for script in pending {
        info!(file_path = script.name(), group_id, "Applying migration");

        if script.sql().trim().is_empty() {
            debug!(file_path = script.name(), "Migration script is empty");
        } else {
            sqlx::raw_sql(script.sql())
                .execute(&mut **tx)
                .await
                .map_err(|source| DbError::Migration {
                    script: script.name().to_owned(),
                    source,
                })?;
        }

        sqlx::query("INSERT INTO migrations (file_path, group_id) VALUES ($1, $2)")
            .bind(script.name())
            .bind(group_id)
            .execute(&mut **tx)
            .await
            .map_err(DbError::Tracking)?;

        applied_now.push(script.name().to_owned());
    }

    Ok(MigrationReport {
        group_id: Some(group_id),
        applied: applied_now,
        already_applied,
    })
}

/// Scripts from `scripts` (already sorted) whose names are not in `applied`.
fn pending_scripts<'a>(
    scripts: &'a [MigrationScript],
    applied: &BTreeSet<String>,
) -> Vec<&'a MigrationScript> {
    scripts
        .iter()
        .filter(|script| !applied.contains(script.name()))
        .collect()
}

/// Tracked names that no longer have a script in the source.
fn untracked_names<'a>(
    scripts: &[MigrationScript],
    applied: &'a BTreeSet<String>,
) -> Vec<&'a str> {
    applied
        .iter()
        .filter(|name| !scripts.iter().any(|script| script.name() == name.as_str()))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(scripts: &[&MigrationScript]) -> Vec<String> {
        scripts.iter().map(|s| s.name().to_owned()).collect()
    }

    #[test]
    fn embedded_scripts_are_sorted_by_name() {
        let source = MigrationSource::Embedded(vec![
            MigrationScript::new("010_c.sql", "SELECT 3"),
            MigrationScript::new("002_b.sql", "SELECT 2"),
            MigrationScript::new("001_a.sql", "SELECT 1"),
        ]);
        let loaded = source.load().unwrap();
        let order: Vec<&str> = loaded.iter().map(MigrationScript::name).collect();
        assert_eq!(order, ["001_a.sql", "002_b.sql", "010_c.sql"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let source = MigrationSource::Embedded(vec![
            MigrationScript::new("001_a.sql", "SELECT 1"),
            MigrationScript::new("001_a.sql", "SELECT 2"),
        ]);
        let err = source.load().unwrap_err();
        assert!(matches!(err, DbError::Source(ref msg) if msg.contains("001_a.sql")));
    }

    #[test]
    fn directory_source_reads_only_sql_files() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("002_second.sql"), "CREATE TABLE b ();").unwrap();
        fs::write(dir.path().join("001_first.sql"), "CREATE TABLE a ();").unwrap();
        fs::write(dir.path().join("README.md"), "not a migration").unwrap();
        fs::write(dir.path().join("003_backup.sql.bak"), "ignored").unwrap();
        fs::create_dir(dir.path().join("004_nested.sql")).unwrap();

        let loaded = MigrationSource::directory(dir.path()).load().unwrap();
        assert_eq!(
            loaded,
            vec![
                MigrationScript::new("001_first.sql", "CREATE TABLE a ();"),
                MigrationScript::new("002_second.sql", "CREATE TABLE b ();"),
            ]
        );
    }

    #[test]
    fn missing_directory_is_a_source_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = MigrationSource::directory(dir.path().join("absent"))
            .load()
            .unwrap_err();
        assert!(matches!(err, DbError::Source(_)));
    }

    #[test]
    fn pending_skips_applied_scripts_and_keeps_order() {
        let scripts = vec![
            MigrationScript::new("001_a.sql", ""),
            MigrationScript::new("002_b.sql", ""),
            MigrationScript::new("003_c.sql", ""),
        ];
        let applied: BTreeSet<String> = ["002_b.sql".to_owned()].into_iter().collect();
        assert_eq!(
            names(&pending_scripts(&scripts, &applied)),
            ["001_a.sql", "003_c.sql"]
        );
    }

    #[test]
    fn nothing_pending_when_everything_applied() {
        let scripts = vec![
            MigrationScript::new("001_a.sql", ""),
            MigrationScript::new("002_b.sql", ""),
        ];
        let applied: BTreeSet<String> = scripts.iter().map(|s| s.name().to_owned()).collect();
        assert!(pending_scripts(&scripts, &applied).is_empty());
        assert!(untracked_names(&scripts, &applied).is_empty());
    }

    #[test]
    fn tracked_names_without_scripts_are_reported() {
        let scripts = vec![MigrationScript::new("001_a.sql", "")];
        let applied: BTreeSet<String> = ["000_removed.sql".to_owned(), "001_a.sql".to_owned()]
            .into_iter()
            .collect();
        assert_eq!(untracked_names(&scripts, &applied), ["000_removed.sql"]);
    }

    #[test]
    fn default_report_is_noop() {
        assert!(MigrationReport::default().is_noop());
    }
}
