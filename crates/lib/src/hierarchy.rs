//! Hierarchy Reader: rebuilding nested nodes from a flat subtree read.
//!
//! The descendants query returns rows in preorder, each with its depth below
//! the queried node. [`rebuild`] walks that sequence once, keeping the chain
//! of currently open ancestors on a stack of arena indices, and then turns
//! the arena into owned [`Node`]s from the leaves up.

use crate::Result;
use crate::backend::{DepthRow, NodeRow};
use crate::forest::Forest;
use crate::node::errors::NodeError;
use crate::node::{Children, Node};

struct Slot {
    row: NodeRow,
    children: Vec<usize>,
}

/// Arena form of a rebuilt subtree.
#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    top: Vec<usize>,
}

/// Link each row to its parent, validating the depth sequence.
fn link(rows: Vec<DepthRow>) -> Result<Arena> {
    let mut arena = Arena::default();
    let mut open: Vec<usize> = Vec::new();

    for DepthRow { row, depth } in rows {
        let depth = depth as usize;
        let violation = |reason: String| NodeError::IntegrityViolation {
            tree_id: row.tree_id,
            reason,
        };

        if depth == 0 || depth > open.len() + 1 {
            return Err(violation(format!(
                "node {} at depth {depth} follows depth {}",
                row.id,
                open.len()
            ))
            .into());
        }
        open.truncate(depth - 1);

        let index = arena.slots.len();
        match open.last() {
            Some(&parent) => {
                let parent_bounds = arena.slots[parent].row.bounds;
                if !parent_bounds.contains(&row.bounds) {
                    return Err(violation(format!(
                        "node {} {} is not inside its parent {} {}",
                        row.id, row.bounds, arena.slots[parent].row.id, parent_bounds
                    ))
                    .into());
                }
                arena.slots[parent].children.push(index);
            }
            None => arena.top.push(index),
        }

        arena.slots.push(Slot {
            row,
            children: Vec::new(),
        });
        open.push(index);
    }

    Ok(arena)
}

/// Rebuild the children of the queried node from its descendant rows.
///
/// Returns the nodes at depth 1 in sibling order. A rebuilt node with no
/// rows below it is [`Children::Empty`] when its range proves it is a leaf
/// and [`Children::Unloaded`] otherwise, which is what a depth limit leaves
/// behind.
pub(crate) fn rebuild(forest: &Forest, rows: Vec<DepthRow>) -> Result<Vec<Node>> {
    let Arena { slots, top } = link(rows)?;

    // Children always come after their parent, so walking backwards finishes
    // every child before its parent needs it.
    let mut built: Vec<Option<Node>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);

    for (index, slot) in slots.into_iter().enumerate().rev() {
        let children = if slot.children.is_empty() {
            if slot.row.bounds.is_leaf() {
                Children::Empty
            } else {
                Children::Unloaded
            }
        } else {
            Children::Loaded(
                slot.children
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect(),
            )
        };
        built[index] = Some(Node::with_children(forest.clone(), slot.row, children));
    }

    Ok(top.into_iter().filter_map(|index| built[index].take()).collect())
}
