//!
//! Arbor: hierarchical data stored in a flat table with the nested-set encoding.
//!
//! Every node stores a `left` and a `right` boundary. The descendants of a
//! node are exactly the rows whose boundaries fall strictly inside its own,
//! and sorting a tree on `left` yields its preorder traversal. Any number of
//! trees share one table and are told apart by a tree identifier.
//!
//! ## Core Concepts
//!
//! * **Forest (`forest::Forest`)**: The handle on a storage backend. Creates and looks up nodes.
//! * **Nodes (`node::Node`)**: Transient until placed. Placing a stored node moves its whole subtree.
//! * **Backends (`backend::BackendImpl`)**: A pluggable storage layer executing filtered reads,
//!   ranged boundary shifts and grouped transactional statements:
//!     * **InMemory (`backend::database::InMemory`)**: A table behind a lock, with JSON save/load.
//!     * **SQL (`backend::database::SqlxBackend`)**: SQLite or PostgreSQL through sqlx.
//! * **Bulk Loader (`loader`)**: Materializes a nested description as one new tree.

pub mod backend;
pub mod boundary;
pub mod constants;
pub mod forest;
mod gap;
mod hierarchy;
mod integrity;
pub mod loader;
pub mod node;
mod placement;
mod relocation;

pub use backend::{NodeId, NodeRow, TreeId};
pub use boundary::{Bounds, Placement};
pub use forest::Forest;
pub use loader::{Item, LoadOptions, LoadPolicy, LoadSummary};
pub use node::{ChildPosition, Children, Node, NodeState, SiblingPosition};

/// Result type used throughout the Arbor library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Arbor library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured engine errors from the node module
    #[error(transparent)]
    Node(node::NodeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Node(_) => "node",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a storage failure.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is about a node that has not been placed.
    pub fn is_not_persisted(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_not_persisted(),
            _ => false,
        }
    }

    /// Check if this error rejected a placement or its input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Node(node_err) => node_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            Error::Node(node_err) => node_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
