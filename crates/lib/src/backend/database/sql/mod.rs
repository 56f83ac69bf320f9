//! sqlx backend: every tree of the forest in one `nodes` table.
//!
//! Works against SQLite (feature `sqlite`) and PostgreSQL (feature
//! `postgres`) through a single `AnyPool`. Dialect differences are confined
//! to the schema ([`schema`]) and the tree locks taken by a transaction
//! ([`transaction`]).
//!
//! Reads run directly on the pool. Each engine mutation runs on one pooled
//! connection inside a single SQL transaction, serialized per tree through
//! rows of the `tree_locks` table.

mod storage;
mod transaction;
mod traversal;

/// Table definitions and the schema version check.
pub mod schema;

use std::any::Any;

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendImpl, BackendTx, DepthRow, NodeId, NodeRow, RowFilter};

/// Attach a context message to sqlx failures.
pub(crate) trait SqlxResultExt<T> {
    /// Wrap the error as `BackendError::SqlxError`, prefixed with `context`.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// SQL dialect of the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
}

/// Forest storage in a SQL database.
///
/// Construct it with [`open`](Self::open) or [`in_memory`](Self::in_memory)
/// for SQLite, or [`connect`](Self::connect) for PostgreSQL. The schema is
/// created on first connection.
#[derive(Debug)]
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
}

impl SqlxBackend {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    async fn with_schema(pool: AnyPool, kind: DbKind) -> Result<Self> {
        let backend = Self { pool, kind };
        schema::initialize(&backend).await?;
        Ok(backend)
    }
}

#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open (or create) the SQLite database file at `path`.
    ///
    /// ```ignore
    /// use arbor::{Forest, backend::database::Sqlite};
    ///
    /// let forest = Forest::new(Box::new(Sqlite::open("forest.db").await?));
    /// ```
    pub async fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to SQLite with a full connection URL.
    ///
    /// A `mode=memory` URL keeps one connection open at all times, since a
    /// shared in-memory database disappears with its last connection. File
    /// databases are switched to WAL journaling.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let in_memory = url.contains("mode=memory");
        let mut options = AnyPoolOptions::new().max_connections(5);
        if in_memory {
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options
            .connect(url)
            .await
            .sql_context("Failed to connect to SQLite")?;

        let pragmas = if in_memory {
            "PRAGMA busy_timeout = 5000;"
        } else {
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;"
        };
        sqlx::query(pragmas)
            .execute(&pool)
            .await
            .sql_context("Failed to configure SQLite")?;

        Self::with_schema(pool, DbKind::Sqlite).await
    }

    /// A private in-memory SQLite database, dropped with the backend.
    pub async fn in_memory() -> Result<Self> {
        let name = uuid::Uuid::new_v4();
        Self::connect_sqlite(&format!("sqlite:file:arbor_{name}?mode=memory&cache=shared")).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to PostgreSQL, using the server's default `search_path`.
    ///
    /// ```ignore
    /// use arbor::backend::database::Postgres;
    ///
    /// let backend = Postgres::connect("postgres://localhost/arbor").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_schema(url, None).await
    }

    /// Connect to PostgreSQL inside a freshly created, uniquely named schema.
    ///
    /// Each call gets its own empty forest, so parallel tests can share one
    /// database server.
    pub async fn connect_isolated(url: &str) -> Result<Self> {
        let schema = format!("arbor_{}", uuid::Uuid::new_v4().simple());
        Self::connect_with_schema(url, Some(schema)).await
    }

    async fn connect_with_schema(url: &str, schema: Option<String>) -> Result<Self> {
        use sqlx::Executor;

        sqlx::any::install_default_drivers();

        let mut options = AnyPoolOptions::new();
        if let Some(schema) = &schema {
            let setup = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
                .execute(&setup)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;
            setup.close().await;

            // Isolated pools stay small so many of them fit under the
            // server's connection limit.
            options = options
                .max_connections(2)
                .acquire_timeout(std::time::Duration::from_secs(30));
        } else {
            options = options.max_connections(5);
        }

        let pool = options
            .after_connect(move |conn, _meta| {
                let search_path = schema.as_ref().map(|s| format!("SET search_path TO {s}"));
                Box::pin(async move {
                    if let Some(statement) = search_path {
                        conn.execute(statement.as_str()).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        Self::with_schema(pool, DbKind::Postgres).await
    }
}

#[async_trait]
impl BackendImpl for SqlxBackend {
    async fn begin<'a>(&'a self) -> Result<Box<dyn BackendTx + 'a>> {
        Ok(Box::new(transaction::SqlxTx::begin(self).await?))
    }

    async fn get(&self, id: NodeId) -> Result<NodeRow> {
        storage::get(self, id).await
    }

    async fn select(&self, filter: RowFilter) -> Result<Vec<NodeRow>> {
        storage::select(self, filter).await
    }

    async fn roots(&self) -> Result<Vec<NodeRow>> {
        storage::roots(self).await
    }

    async fn descendants(&self, id: NodeId, depth_limit: Option<u32>) -> Result<Vec<DepthRow>> {
        traversal::descendants(self, id, depth_limit).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// SQLite flavour of [`SqlxBackend`].
#[cfg(feature = "sqlite")]
pub type Sqlite = SqlxBackend;

/// PostgreSQL flavour of [`SqlxBackend`].
#[cfg(feature = "postgres")]
pub type Postgres = SqlxBackend;
