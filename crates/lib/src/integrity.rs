//! Invariant verifier for stored trees.

use crate::backend::{NodeRow, TreeId};
use crate::node::errors::NodeError;

/// Check the rows of one tree against the nested-set invariants.
///
/// - every range is well formed and none is left parked
/// - exactly one root starts at 1 and encloses every other row
/// - two ranges are either disjoint or strictly nested
/// - the boundary values are exactly `1..=2n`
pub(crate) fn verify_rows(tree_id: TreeId, rows: &[NodeRow]) -> Result<(), NodeError> {
    let violation = |reason: String| NodeError::IntegrityViolation { tree_id, reason };

    let mut sorted: Vec<&NodeRow> = rows.iter().collect();
    sorted.sort_by_key(|row| (row.bounds.left, row.id));

    for row in &sorted {
        if row.tree_id != tree_id {
            return Err(violation(format!("node {} belongs to tree {}", row.id, row.tree_id)));
        }
        if row.bounds.left >= row.bounds.right {
            return Err(violation(format!("node {} has range {}", row.id, row.bounds)));
        }
        if row.bounds.left < 1 {
            return Err(violation(format!(
                "node {} is parked at {}",
                row.id, row.bounds
            )));
        }
    }

    let Some(root) = sorted.first() else {
        return Ok(());
    };
    let expected_right = 2 * sorted.len() as i64;
    if root.bounds.left != 1 || root.bounds.right != expected_right {
        return Err(violation(format!(
            "root {} has range {}, expected [1, {expected_right}]",
            root.id, root.bounds
        )));
    }
    if let Some(second) = sorted.iter().skip(1).find(|row| row.bounds.is_root()) {
        return Err(violation(format!("second root {}", second.id)));
    }

    let mut open: Vec<&NodeRow> = Vec::new();
    for row in &sorted {
        while open.last().is_some_and(|top| top.bounds.right < row.bounds.left) {
            open.pop();
        }
        if let Some(top) = open.last()
            && !top.bounds.contains(&row.bounds)
        {
            return Err(violation(format!(
                "node {} {} overlaps node {} {}",
                row.id, row.bounds, top.id, top.bounds
            )));
        }
        open.push(row);
    }

    let mut values: Vec<i64> = sorted
        .iter()
        .flat_map(|row| [row.bounds.left, row.bounds.right])
        .collect();
    values.sort_unstable();
    if let Some((position, value)) = values
        .iter()
        .enumerate()
        .find(|&(position, &value)| value != position as i64 + 1)
    {
        return Err(violation(format!(
            "boundary value {value} found where {} was expected",
            position + 1
        )));
    }

    Ok(())
}
