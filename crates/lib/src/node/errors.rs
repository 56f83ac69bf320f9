//! Engine error types for node placement and tree reconstruction.

use thiserror::Error;

use crate::backend::TreeId;

/// Errors raised by the nested-set engine itself.
///
/// Storage failures are not represented here; they surface unchanged as
/// [`crate::Error::Backend`].
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Field additions/changes require a major version bump
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeError {
    /// The node has never been placed, so it has no id or boundaries.
    #[error("Node has not been persisted")]
    NotPersisted,

    /// The requested parent has not been placed.
    #[error("Parent node has not been persisted")]
    InvalidParent,

    /// The requested sibling has not been placed.
    #[error("Sibling node has not been persisted")]
    InvalidSibling,

    /// A position string outside the accepted set.
    #[error("Invalid position '{position}', expected one of: {expected}")]
    InvalidPosition {
        /// The rejected input
        position: String,
        /// The accepted values
        expected: &'static str,
    },

    /// The placement would break the tree shape.
    #[error("Invalid hierarchy: {reason}")]
    InvalidHierarchy {
        /// Description of the rejected placement
        reason: String,
    },

    /// Bulk input nested deeper than the configured bound.
    #[error("Hierarchy exceeds the maximum depth of {limit}")]
    HierarchyTooDeep {
        /// The configured depth bound
        limit: usize,
    },

    /// Stored boundaries violate the nested-set invariants.
    #[error("Integrity violation in tree {tree_id}: {reason}")]
    IntegrityViolation {
        /// The tree that failed verification
        tree_id: TreeId,
        /// Description of the violation
        reason: String,
    },
}

impl NodeError {
    /// Check if this error is a precondition on an unplaced node.
    pub fn is_not_persisted(&self) -> bool {
        matches!(
            self,
            NodeError::NotPersisted | NodeError::InvalidParent | NodeError::InvalidSibling
        )
    }

    /// Check if this error rejected a placement or its input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            NodeError::InvalidPosition { .. }
                | NodeError::InvalidHierarchy { .. }
                | NodeError::HierarchyTooDeep { .. }
        )
    }

    /// Check if this error reports corrupted boundaries.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, NodeError::IntegrityViolation { .. })
    }

    /// Get the tree ID if this error is about a specific tree.
    pub fn tree_id(&self) -> Option<TreeId> {
        match self {
            NodeError::IntegrityViolation { tree_id, .. } => Some(*tree_id),
            _ => None,
        }
    }
}

// Conversion from NodeError to the main Error type
impl From<NodeError> for crate::Error {
    fn from(err: NodeError) -> Self {
        crate::Error::Node(err)
    }
}
