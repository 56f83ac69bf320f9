//! Depth-annotated subtree reads for SQL backends.
//!
//! The descendants query is the reason for the nested-set encoding: one range
//! join returns a whole subtree in preorder, and counting the enclosing ranges
//! of each row gives its depth without recursive SQL.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{DepthRow, NodeId};

use super::storage::{RawNode, decode};
use super::{SqlxBackend, SqlxResultExt};

/// Strict descendants of node `$1`, with depth relative to it.
///
/// `depth` counts the rows `p` that enclose the candidate and start at or
/// after the subtree root, so the root itself is counted and immediate
/// children have depth 1. `$2` is the depth limit.
const DESCENDANTS_SQL: &str = "SELECT d.id, d.tree_id, d.lft, d.rgt, d.name, d.data, d.depth
FROM (
    SELECT n.id, n.tree_id, n.lft, n.rgt, n.name, n.data,
           (SELECT COUNT(*)
              FROM nodes p
             WHERE p.tree_id = n.tree_id
               AND p.lft >= s.lft
               AND p.lft < n.lft
               AND p.rgt > n.rgt) AS depth
      FROM nodes n
      JOIN nodes s
        ON s.tree_id = n.tree_id
       AND n.lft > s.lft
       AND n.rgt < s.rgt
     WHERE s.id = $1
) d
WHERE d.depth <= $2
ORDER BY d.lft, d.id";

/// Query the descendants of `id`.
pub async fn descendants(
    backend: &SqlxBackend,
    id: NodeId,
    depth_limit: Option<u32>,
) -> Result<Vec<DepthRow>> {
    let limit = depth_limit.map_or(i64::MAX, i64::from);

    let rows: Vec<(i64, i64, i64, i64, String, String, i64)> = sqlx::query_as(DESCENDANTS_SQL)
        .bind(id.get())
        .bind(limit)
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to query descendants")?;

    if rows.is_empty() {
        // Distinguish a leaf from a missing node.
        super::storage::get(backend, id).await?;
        return Ok(Vec::new());
    }

    rows.into_iter()
        .map(|(node_id, tree_id, left, right, name, data, depth)| {
            let raw: RawNode = (node_id, tree_id, left, right, name, data);
            let depth = u32::try_from(depth).map_err(|_| BackendError::StateInconsistency {
                reason: format!("invalid depth {depth} for node {node_id}"),
            })?;
            Ok(DepthRow {
                row: decode(raw)?,
                depth,
            })
        })
        .collect()
}
