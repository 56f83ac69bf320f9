//! Constants used throughout the Arbor library.
//!
//! This module provides central definitions for column names and
//! other constants shared between the engine and the storage backends.

/// Left boundary column. `left` is a reserved word in most SQL dialects.
pub const LEFT_COLUMN: &str = "lft";

/// Right boundary column. `right` is a reserved word in most SQL dialects.
pub const RIGHT_COLUMN: &str = "rgt";

/// Reserved lock key taken while allocating a fresh tree identifier.
///
/// Tree identifiers start at 1, so key 0 never collides with a real tree.
pub const TREE_ALLOCATION_LOCK: i64 = 0;

/// Default bound on the nesting depth accepted by the bulk loader.
pub const MAX_HIERARCHY_DEPTH: usize = 256;

/// Label given to the synthetic root created by the bulk loader.
pub const DEFAULT_ROOT_NAME: &str = "Root Item";
