//! Core storage operations for the InMemory backend

use async_trait::async_trait;
use tokio::sync::RwLockWriteGuard;

use super::Table;
use crate::{
    Result,
    backend::{
        BackendTx, Column, DepthRow, NewNode, NodeId, NodeRow, RowFilter, TreeId,
        errors::BackendError,
    },
};

/// Retrieves a node by id from the table.
pub(crate) fn get(table: &Table, id: NodeId) -> Result<NodeRow> {
    table
        .rows
        .get(&id)
        .cloned()
        .ok_or_else(|| BackendError::NodeNotFound { id }.into())
}

/// Rows matching `filter`, ascending by left boundary.
pub(crate) fn select(table: &Table, filter: RowFilter) -> Vec<NodeRow> {
    let mut rows: Vec<NodeRow> = table
        .rows
        .values()
        .filter(|row| filter.matches(row))
        .cloned()
        .collect();
    rows.sort_by_key(|row| (row.bounds.left, row.id));
    rows
}

/// Every node with `left == 1`, one per tree.
pub(crate) fn roots(table: &Table) -> Vec<NodeRow> {
    let mut rows: Vec<NodeRow> = table
        .rows
        .values()
        .filter(|row| row.bounds.is_root())
        .cloned()
        .collect();
    rows.sort_by_key(|row| (row.tree_id, row.id));
    rows
}

/// Strict descendants of the stored range of `id` with their relative depth.
///
/// Depth is computed the same way the SQL backend computes it: one plus the
/// number of rows of the subtree that strictly contain the candidate.
pub(crate) fn descendants(
    table: &Table,
    id: NodeId,
    depth_limit: Option<u32>,
) -> Result<Vec<DepthRow>> {
    let node = get(table, id)?;

    let subtree: Vec<&NodeRow> = table
        .rows
        .values()
        .filter(|row| row.tree_id == node.tree_id && node.bounds.contains(&row.bounds))
        .collect();

    let mut rows = Vec::with_capacity(subtree.len());
    for candidate in &subtree {
        let ancestors = subtree
            .iter()
            .filter(|other| other.bounds.contains(&candidate.bounds))
            .count();
        let depth = u32::try_from(ancestors + 1).map_err(|_| BackendError::StateInconsistency {
            reason: format!("depth of node {} does not fit in u32", candidate.id),
        })?;
        if depth_limit.is_none_or(|limit| depth <= limit) {
            rows.push(DepthRow {
                row: (*candidate).clone(),
                depth,
            });
        }
    }

    rows.sort_by_key(|d| (d.row.bounds.left, d.row.id));
    Ok(rows)
}

/// A transaction over the in-memory table.
///
/// Holds the table's write lock and mutates a private copy of it.
pub(crate) struct InMemoryTx<'a> {
    guard: RwLockWriteGuard<'a, Table>,
    working: Table,
}

impl<'a> InMemoryTx<'a> {
    pub(crate) fn new(guard: RwLockWriteGuard<'a, Table>) -> Self {
        let working = guard.clone();
        Self { guard, working }
    }
}

#[async_trait]
impl BackendTx for InMemoryTx<'_> {
    async fn lock_tree(&mut self, _tree_id: TreeId) -> Result<()> {
        // The table write lock is already held for the whole transaction.
        Ok(())
    }

    async fn get(&mut self, id: NodeId) -> Result<NodeRow> {
        get(&self.working, id)
    }

    async fn insert(&mut self, node: NewNode) -> Result<NodeRow> {
        self.working.last_id += 1;
        let row = NodeRow {
            id: NodeId::new(self.working.last_id),
            tree_id: node.tree_id,
            bounds: node.bounds,
            name: node.name,
            data: node.data,
        };
        self.working.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn increment(
        &mut self,
        filter: RowFilter,
        columns: &[Column],
        delta: i64,
    ) -> Result<u64> {
        let mut updated = 0;
        for row in self.working.rows.values_mut() {
            if !filter.matches(row) {
                continue;
            }
            for column in columns {
                match column {
                    Column::Left => row.bounds.left += delta,
                    Column::Right => row.bounds.right += delta,
                }
            }
            updated += 1;
        }
        Ok(updated)
    }

    async fn set_tree_id(&mut self, filter: RowFilter, tree_id: TreeId) -> Result<u64> {
        let mut updated = 0;
        for row in self.working.rows.values_mut() {
            if filter.matches(row) {
                row.tree_id = tree_id;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn max_tree_id(&mut self) -> Result<Option<TreeId>> {
        Ok(self.working.rows.values().map(|row| row.tree_id).max())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
