//! SQL transactions issued by the engine.
//!
//! Tree locks are rows of `tree_locks`. On PostgreSQL the row is locked with
//! `SELECT ... FOR UPDATE`, which serializes writers per tree and leaves other
//! trees free. SQLite has a single writer per database, so the transaction takes
//! the write lock as its first statement and `lock_tree` only records the row.

use async_trait::async_trait;
use sqlx::{Any, Transaction};

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendTx, Column, NewNode, NodeId, NodeRow, RowFilter, TreeId};
use crate::constants::TREE_ALLOCATION_LOCK;

use super::storage::{NODE_COLUMNS, RawNode, decode, encode_data, filter_clause};
use super::{DbKind, SqlxBackend, SqlxResultExt};

/// One open SQL transaction.
pub(crate) struct SqlxTx {
    kind: DbKind,
    tx: Transaction<'static, Any>,
}

impl SqlxTx {
    /// Begin a transaction on a pooled connection.
    pub(crate) async fn begin(backend: &SqlxBackend) -> Result<Self> {
        let tx = backend
            .pool()
            .begin()
            .await
            .sql_context("Failed to begin transaction")?;

        let mut this = Self {
            kind: backend.kind(),
            tx,
        };

        if this.kind == DbKind::Sqlite {
            // Upgrading a read snapshot to a write fails under WAL once another
            // writer has committed, so write before the first read.
            this.record_lock(TreeId::new(TREE_ALLOCATION_LOCK)).await?;
        }

        Ok(this)
    }

    async fn record_lock(&mut self, tree_id: TreeId) -> Result<()> {
        let sql = match self.kind {
            DbKind::Sqlite => "INSERT OR IGNORE INTO tree_locks (tree_id) VALUES ($1)",
            DbKind::Postgres => {
                "INSERT INTO tree_locks (tree_id) VALUES ($1) ON CONFLICT (tree_id) DO NOTHING"
            }
        };
        sqlx::query(sql)
            .bind(tree_id.get())
            .execute(&mut *self.tx)
            .await
            .sql_context("Failed to record tree lock")?;
        Ok(())
    }
}

#[async_trait]
impl BackendTx for SqlxTx {
    async fn lock_tree(&mut self, tree_id: TreeId) -> Result<()> {
        self.record_lock(tree_id).await?;

        if self.kind == DbKind::Postgres {
            sqlx::query("SELECT tree_id FROM tree_locks WHERE tree_id = $1 FOR UPDATE")
                .bind(tree_id.get())
                .fetch_optional(&mut *self.tx)
                .await
                .sql_context("Failed to lock tree")?;
        }

        tracing::trace!(%tree_id, "Locked tree");
        Ok(())
    }

    async fn get(&mut self, id: NodeId) -> Result<NodeRow> {
        let row: Option<RawNode> =
            sqlx::query_as(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1"))
                .bind(id.get())
                .fetch_optional(&mut *self.tx)
                .await
                .sql_context("Failed to get node")?;

        match row {
            Some(raw) => decode(raw),
            None => Err(BackendError::NodeNotFound { id }.into()),
        }
    }

    async fn insert(&mut self, node: NewNode) -> Result<NodeRow> {
        let data = encode_data(&node.data)?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO nodes (tree_id, lft, rgt, name, data) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(node.tree_id.get())
        .bind(node.bounds.left)
        .bind(node.bounds.right)
        .bind(node.name.as_str())
        .bind(data)
        .fetch_one(&mut *self.tx)
        .await
        .sql_context("Failed to insert node")?;

        Ok(NodeRow {
            id: NodeId::new(id),
            tree_id: node.tree_id,
            bounds: node.bounds,
            name: node.name,
            data: node.data,
        })
    }

    async fn increment(
        &mut self,
        filter: RowFilter,
        columns: &[Column],
        delta: i64,
    ) -> Result<u64> {
        if columns.is_empty() {
            return Ok(0);
        }

        let assignments = columns
            .iter()
            .map(|column| format!("{0} = {0} + $1", column.name()))
            .collect::<Vec<_>>()
            .join(", ");
        let (clause, binds) = filter_clause(&filter, 2);
        let sql = format!("UPDATE nodes SET {assignments} WHERE {clause}");

        let mut query = sqlx::query(&sql).bind(delta);
        for value in binds {
            query = query.bind(value);
        }

        let result = query
            .execute(&mut *self.tx)
            .await
            .sql_context("Failed to shift boundaries")?;
        Ok(result.rows_affected())
    }

    async fn set_tree_id(&mut self, filter: RowFilter, tree_id: TreeId) -> Result<u64> {
        let (clause, binds) = filter_clause(&filter, 2);
        let sql = format!("UPDATE nodes SET tree_id = $1 WHERE {clause}");

        let mut query = sqlx::query(&sql).bind(tree_id.get());
        for value in binds {
            query = query.bind(value);
        }

        let result = query
            .execute(&mut *self.tx)
            .await
            .sql_context("Failed to move rows between trees")?;
        Ok(result.rows_affected())
    }

    async fn max_tree_id(&mut self) -> Result<Option<TreeId>> {
        let (max,): (Option<i64>,) = sqlx::query_as("SELECT MAX(tree_id) FROM nodes")
            .fetch_one(&mut *self.tx)
            .await
            .sql_context("Failed to read highest tree id")?;
        Ok(max.map(TreeId::new))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .sql_context("Failed to commit transaction")
    }
}
