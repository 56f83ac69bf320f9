//! Placement Engine: root creation and relative placement.
//!
//! Each function here is one whole mutation: it begins a transaction, locks
//! every tree it touches, re-reads the rows it works on inside the
//! transaction, issues its statements and commits. Any error drops the
//! transaction, which rolls every statement back.

use std::collections::BTreeSet;

use crate::Result;
use crate::backend::{BackendImpl, BackendTx, NewNode, NodeId, NodeRow, TreeId};
use crate::boundary::{Bounds, LEAF_WIDTH, Placement};
use crate::constants::TREE_ALLOCATION_LOCK;
use crate::node::errors::NodeError;
use crate::{gap, relocation};

/// Rows produced by a relative placement.
#[derive(Debug, Clone)]
pub(crate) struct Placed {
    /// The placed node.
    pub node: NodeRow,
    /// The parent or sibling it was placed against, re-read after the move.
    pub reference: NodeRow,
}

/// Read `ids` and lock the tree of each of them.
///
/// A row may move to another tree between the read and the lock, so rows are
/// re-read until every tree they live in is locked.
async fn lock_rows(tx: &mut dyn BackendTx, ids: &[NodeId]) -> Result<Vec<NodeRow>> {
    let mut locked = BTreeSet::new();
    loop {
        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            rows.push(tx.get(*id).await?);
        }

        let pending: BTreeSet<TreeId> = rows
            .iter()
            .map(|row| row.tree_id)
            .filter(|tree_id| !locked.contains(tree_id))
            .collect();
        if pending.is_empty() {
            return Ok(rows);
        }
        for tree_id in pending {
            tx.lock_tree(tree_id).await?;
            locked.insert(tree_id);
        }
    }
}

/// Allocate `max(tree_id) + 1` and lock it.
async fn allocate_tree(tx: &mut dyn BackendTx) -> Result<TreeId> {
    tx.lock_tree(TreeId::new(TREE_ALLOCATION_LOCK)).await?;
    let tree_id = TreeId::next_after(tx.max_tree_id().await?);
    tx.lock_tree(tree_id).await?;
    Ok(tree_id)
}

fn reject_root_sibling(placement: Placement, reference: &NodeRow) -> Result<()> {
    if placement.is_sibling() && reference.bounds.is_root() {
        return Err(NodeError::InvalidHierarchy {
            reason: format!(
                "node {} is the root of tree {} and cannot have siblings",
                reference.id, reference.tree_id
            ),
        }
        .into());
    }
    Ok(())
}

/// Persist a new single-node tree.
pub(crate) async fn create_root(
    backend: &dyn BackendImpl,
    name: &str,
    data: &serde_json::Value,
) -> Result<NodeRow> {
    let mut tx = backend.begin().await?;

    let tree_id = allocate_tree(tx.as_mut()).await?;
    let row = tx
        .insert(NewNode {
            tree_id,
            bounds: Bounds::ROOT,
            name: name.to_string(),
            data: data.clone(),
        })
        .await?;

    tx.commit().await?;
    tracing::debug!(id = %row.id, %tree_id, "Created root");
    Ok(row)
}

/// Turn a stored node into the root of a brand-new tree, taking its
/// subtree along.
///
/// A node that is already a root is returned unchanged.
pub(crate) async fn make_root(backend: &dyn BackendImpl, id: NodeId) -> Result<NodeRow> {
    let mut tx = backend.begin().await?;

    let node = lock_rows(tx.as_mut(), &[id]).await?.remove(0);
    if node.bounds.is_root() {
        return Ok(node);
    }

    let parked = relocation::detach(tx.as_mut(), &node).await?;
    let tree_id = allocate_tree(tx.as_mut()).await?;
    let parked = relocation::move_to_tree(tx.as_mut(), &parked, tree_id).await?;
    let row = relocation::reinsert(tx.as_mut(), &parked, Bounds::ROOT.left).await?;

    tx.commit().await?;
    tracing::debug!(%id, from = %node.tree_id, to = %tree_id, "Promoted subtree to root");
    Ok(row)
}

/// Persist a new leaf relative to `reference`.
pub(crate) async fn place_new(
    backend: &dyn BackendImpl,
    reference: NodeId,
    placement: Placement,
    name: &str,
    data: &serde_json::Value,
) -> Result<Placed> {
    let mut tx = backend.begin().await?;

    let target = lock_rows(tx.as_mut(), &[reference]).await?.remove(0);
    reject_root_sibling(placement, &target)?;

    let left = placement.left_for(&target.bounds);
    gap::open(tx.as_mut(), target.tree_id, left, LEAF_WIDTH).await?;
    let node = tx
        .insert(NewNode {
            tree_id: target.tree_id,
            bounds: Bounds::leaf_at(left),
            name: name.to_string(),
            data: data.clone(),
        })
        .await?;
    let reference = tx.get(reference).await?;

    tx.commit().await?;
    tracing::debug!(id = %node.id, %placement, reference = %reference.id, "Placed new node");
    Ok(Placed { node, reference })
}

/// Move a stored node and its subtree relative to `reference`.
pub(crate) async fn place_existing(
    backend: &dyn BackendImpl,
    id: NodeId,
    reference: NodeId,
    placement: Placement,
) -> Result<Placed> {
    let mut tx = backend.begin().await?;

    let mut rows = lock_rows(tx.as_mut(), &[id, reference]).await?;
    let target = rows.remove(1);
    let node = rows.remove(0);

    if node.id == target.id {
        return Err(NodeError::InvalidHierarchy {
            reason: format!("cannot place node {id} as its own {placement}"),
        }
        .into());
    }
    if node.tree_id == target.tree_id && node.bounds.contains(&target.bounds) {
        return Err(NodeError::InvalidHierarchy {
            reason: format!("node {} is a descendant of node {id}", target.id),
        }
        .into());
    }
    reject_root_sibling(placement, &target)?;

    let mut parked = relocation::detach(tx.as_mut(), &node).await?;
    let target = tx.get(reference).await?;
    if parked.tree_id != target.tree_id {
        parked = relocation::move_to_tree(tx.as_mut(), &parked, target.tree_id).await?;
    }

    let left = placement.left_for(&target.bounds);
    let node = relocation::reinsert(tx.as_mut(), &parked, left).await?;
    let reference = tx.get(reference).await?;

    tx.commit().await?;
    tracing::debug!(%id, %placement, reference = %reference.id, bounds = %node.bounds, "Moved node");
    Ok(Placed { node, reference })
}
