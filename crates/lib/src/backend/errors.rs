//! Storage error types for the Arbor backends.
//!
//! This module defines structured error types for storage operations,
//! providing better error context and type safety compared to string-based errors.

use thiserror::Error;

use super::{NodeId, TreeId};

/// Errors that can occur during storage operations.
///
/// Every variant is a storage failure from the engine's point of view: the
/// engine propagates them unchanged and never retries or compensates.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Field additions/changes require a major version bump
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Node not found by ID.
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// The ID of the node that was not found
        id: NodeId,
    },

    /// Tree has no nodes.
    #[error("Tree not found: {tree_id}")]
    TreeNotFound {
        /// The tree that was not found
        tree_id: TreeId,
    },

    /// A SQL statement or connection failed.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context describing the failed operation
        reason: String,
        /// The underlying sqlx error, if there was one
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored data does not have the shape the backend expects.
    #[error("Storage state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the state inconsistency
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::NodeNotFound { .. } | BackendError::TreeNotFound { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error came from the SQL layer.
    pub fn is_sql_error(&self) -> bool {
        #[cfg(any(feature = "sqlite", feature = "postgres"))]
        {
            matches!(self, BackendError::SqlxError { .. })
        }
        #[cfg(not(any(feature = "sqlite", feature = "postgres")))]
        {
            false
        }
    }

    /// Check if this error indicates stored data is malformed.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::StateInconsistency { .. })
    }

    /// Get the node ID if this error is about a specific node.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            BackendError::NodeNotFound { id } => Some(*id),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
