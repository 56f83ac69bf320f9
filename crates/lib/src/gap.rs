//! Gap Manager: opening and closing runs of boundary values inside one tree.

use crate::Result;
use crate::backend::{BackendTx, Column, RowFilter, TreeId};

/// Make room for `width` boundary values starting at `start`.
///
/// Every `left >= start` and every `right >= start` of the tree moves up by
/// `width`. Each statement is keyed on its own column, so a row whose range
/// straddles `start` (an ancestor of the insertion point) only has its right
/// boundary moved.
pub(crate) async fn open(
    tx: &mut dyn BackendTx,
    tree_id: TreeId,
    start: i64,
    width: i64,
) -> Result<()> {
    let lefts = tx
        .increment(
            RowFilter::tree(tree_id).left_at_least(start),
            &[Column::Left],
            width,
        )
        .await?;
    let rights = tx
        .increment(
            RowFilter::tree(tree_id).right_at_least(start),
            &[Column::Right],
            width,
        )
        .await?;

    tracing::debug!(%tree_id, start, width, lefts, rights, "Shifted boundaries");
    Ok(())
}

/// Remove the `width` boundary values starting at `start`.
///
/// The values must already be unused in the tree, either because the subtree
/// owning them has been parked or because they were never allocated.
pub(crate) async fn close(
    tx: &mut dyn BackendTx,
    tree_id: TreeId,
    start: i64,
    width: i64,
) -> Result<()> {
    open(tx, tree_id, start, -width).await
}
