//! Relocation Engine: moving a stored subtree as one unit.
//!
//! A relocation is always the sequence [`detach`], optionally [`move_to_tree`],
//! then [`reinsert`], issued on one transaction. Between the steps the subtree
//! is parked at `[-size, 0]` of its tree, outside every range the gap
//! statements touch.

use crate::Result;
use crate::backend::{BackendTx, Column, NodeRow, RowFilter, TreeId};
use crate::boundary::{park_delta, unpark_delta};
use crate::gap;

/// Park the subtree rooted at `node` and close the hole it leaves.
///
/// Returns the parked row.
pub(crate) async fn detach(tx: &mut dyn BackendTx, node: &NodeRow) -> Result<NodeRow> {
    let bounds = node.bounds;
    let delta = park_delta(&bounds);

    let moved = tx
        .increment(
            RowFilter::tree(node.tree_id).left_between(bounds.left, bounds.right),
            Column::BOTH,
            delta,
        )
        .await?;
    gap::close(tx, node.tree_id, bounds.left, bounds.width()).await?;

    tracing::debug!(id = %node.id, tree_id = %node.tree_id, %bounds, moved, "Detached subtree");
    tx.get(node.id).await
}

/// Move a parked subtree to `tree_id`.
pub(crate) async fn move_to_tree(
    tx: &mut dyn BackendTx,
    parked: &NodeRow,
    tree_id: TreeId,
) -> Result<NodeRow> {
    let bounds = parked.bounds;
    let moved = tx
        .set_tree_id(
            RowFilter::tree(parked.tree_id).left_between(bounds.left, bounds.right),
            tree_id,
        )
        .await?;

    tracing::debug!(id = %parked.id, from = %parked.tree_id, to = %tree_id, moved, "Moved subtree");
    tx.get(parked.id).await
}

/// Put a parked subtree back into its tree with its root at `left`.
pub(crate) async fn reinsert(tx: &mut dyn BackendTx, parked: &NodeRow, left: i64) -> Result<NodeRow> {
    let size = parked.bounds.size();

    gap::open(tx, parked.tree_id, left, parked.bounds.width()).await?;
    let moved = tx
        .increment(
            RowFilter::tree(parked.tree_id).left_between(-size, 0),
            Column::BOTH,
            unpark_delta(size, left),
        )
        .await?;

    tracing::debug!(id = %parked.id, tree_id = %parked.tree_id, left, moved, "Reinserted subtree");
    tx.get(parked.id).await
}

