//! SQL schema definitions and migrations.
//!
//! This module contains the database schema used by SQL backends. The only
//! dialect difference is how the node id sequence is declared.
//!
//! # Migration System
//!
//! The migration system uses code-based migrations rather than SQL files to handle
//! dialect differences between SQLite and PostgreSQL. Each migration is a function
//! that receives the backend and can execute database-specific SQL as needed.
//!
//! ## Adding a New Migration
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vN_to_vM` async function
//! 3. Dispatch to it from `run_migration` for its source version
//! 4. Document what the migration does

use crate::Result;
use crate::backend::errors::BackendError;

use super::{DbKind, SqlxBackend};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// Schema version tracking table.
const CREATE_SCHEMA_VERSION: &str = "CREATE TABLE IF NOT EXISTS schema_version (
    version BIGINT PRIMARY KEY
)";

/// Node table for SQLite; `INTEGER PRIMARY KEY` aliases the rowid.
const CREATE_NODES_SQLITE: &str = "CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tree_id BIGINT NOT NULL,
    lft BIGINT NOT NULL,
    rgt BIGINT NOT NULL,
    name TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT 'null'
)";

/// Node table for PostgreSQL.
const CREATE_NODES_POSTGRES: &str = "CREATE TABLE IF NOT EXISTS nodes (
    id BIGSERIAL PRIMARY KEY,
    tree_id BIGINT NOT NULL,
    lft BIGINT NOT NULL,
    rgt BIGINT NOT NULL,
    name TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT 'null'
)";

/// One row per tree ever locked. Mutations lock the row of every tree they
/// touch; the row is never deleted, so the lock target always exists.
const CREATE_TREE_LOCKS: &str = "CREATE TABLE IF NOT EXISTS tree_locks (
    tree_id BIGINT PRIMARY KEY
)";

/// SQL statements to create indexes.
///
/// Boundaries are deliberately not unique: mid-transaction states overlap.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_nodes_tree_lft ON nodes(tree_id, lft)",
    "CREATE INDEX IF NOT EXISTS idx_nodes_tree_rgt ON nodes(tree_id, rgt)",
];

/// Table creation statements for the given dialect.
pub fn create_tables(kind: DbKind) -> [&'static str; 3] {
    let nodes = match kind {
        DbKind::Sqlite => CREATE_NODES_SQLITE,
        DbKind::Postgres => CREATE_NODES_POSTGRES,
    };
    [CREATE_SCHEMA_VERSION, nodes, CREATE_TREE_LOCKS]
}

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist, and handles migrations
/// if the schema version has changed.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in create_tables(backend.kind()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    if row.is_none() {
        tracing::info!(version = SCHEMA_VERSION, "Initializing SQL schema");
        sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
            .bind(SCHEMA_VERSION)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to initialize schema version: {e}"),
                source: Some(e),
            })?;
    } else if let Some((current_version,)) = row
        && current_version < SCHEMA_VERSION
    {
        migrate(backend, current_version, SCHEMA_VERSION).await?;
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Index creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    Ok(())
}

/// Run migrations sequentially from one schema version to another.
///
/// Migrations are run one at a time, incrementing the version after each.
async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        tracing::info!(from = current, to = next, "Running migration");

        run_migration(backend, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to update schema version to {next}: {e}"),
                source: Some(e),
            })?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    tracing::info!(from, to, "All migrations completed successfully");
    Ok(())
}

/// Execute a single migration step.
///
/// There are no migrations yet, so any attempt to migrate is an error.
async fn run_migration(_backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    Err(BackendError::SqlxError {
        reason: format!(
            "Unknown migration path: v{from} to v{to}. \
             This likely means SCHEMA_VERSION was incremented without adding a migration."
        ),
        source: None,
    }
    .into())
}
