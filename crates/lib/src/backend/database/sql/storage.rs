//! Node reads and row mapping for SQL backends.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{ColumnRange, NodeId, NodeRow, RowFilter, TreeId};
use crate::boundary::Bounds;

use super::{SqlxBackend, SqlxResultExt};

/// Column list matching [`RawNode`].
pub(super) const NODE_COLUMNS: &str = "id, tree_id, lft, rgt, name, data";

/// A node row as returned by sqlx: id, tree_id, lft, rgt, name, data.
pub(super) type RawNode = (i64, i64, i64, i64, String, String);

/// Decode a raw row, parsing the JSON payload.
pub(super) fn decode((id, tree_id, left, right, name, data): RawNode) -> Result<NodeRow> {
    let data = serde_json::from_str(&data)
        .map_err(|e| BackendError::DeserializationFailed { source: e })?;
    Ok(NodeRow {
        id: NodeId::new(id),
        tree_id: TreeId::new(tree_id),
        bounds: Bounds::new(left, right),
        name,
        data,
    })
}

/// Encode a JSON payload for the `data` column.
pub(super) fn encode_data(data: &serde_json::Value) -> Result<String> {
    serde_json::to_string(data)
        .map_err(|e| BackendError::SerializationFailed { source: e }.into())
}

/// Render `filter` as a WHERE clause whose placeholders start at `$first`.
///
/// Returns the clause and the values to bind, in placeholder order.
pub(super) fn filter_clause(filter: &RowFilter, first: usize) -> (String, Vec<i64>) {
    let mut clause = format!("tree_id = ${first}");
    let mut binds = vec![filter.tree_id.get()];

    if let Some((column, range)) = filter.range {
        let column = column.name();
        let next = first + 1;
        match range {
            ColumnRange::AtLeast(min) => {
                clause.push_str(&format!(" AND {column} >= ${next}"));
                binds.push(min);
            }
            ColumnRange::Between(low, high) => {
                clause.push_str(&format!(" AND {column} BETWEEN ${next} AND ${}", next + 1));
                binds.push(low);
                binds.push(high);
            }
        }
    }

    (clause, binds)
}

/// Get a node by id.
pub async fn get(backend: &SqlxBackend, id: NodeId) -> Result<NodeRow> {
    let row: Option<RawNode> =
        sqlx::query_as(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get node")?;

    match row {
        Some(raw) => decode(raw),
        None => Err(BackendError::NodeNotFound { id }.into()),
    }
}

/// Rows matching `filter`, ascending by left boundary.
pub async fn select(backend: &SqlxBackend, filter: RowFilter) -> Result<Vec<NodeRow>> {
    let (clause, binds) = filter_clause(&filter, 1);
    let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE {clause} ORDER BY lft, id");

    let mut query = sqlx::query_as::<_, RawNode>(&sql);
    for value in binds {
        query = query.bind(value);
    }

    let rows = query
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to select nodes")?;

    rows.into_iter().map(decode).collect()
}

/// Every root of the forest.
pub async fn roots(backend: &SqlxBackend) -> Result<Vec<NodeRow>> {
    let rows: Vec<RawNode> = sqlx::query_as(&format!(
        "SELECT {NODE_COLUMNS} FROM nodes WHERE lft = 1 ORDER BY tree_id, id"
    ))
    .fetch_all(backend.pool())
    .await
    .sql_context("Failed to list roots")?;

    rows.into_iter().map(decode).collect()
}
