//! Backend implementations for Arbor storage
//!
//! This module provides the storage contract consumed by the nested-set engine
//! and the backends that implement it.
//!
//! The engine never talks to a database directly. Everything it needs is
//! expressed through two traits:
//!
//! - [`BackendImpl`] owns the storage and answers reads that do not need to
//!   be isolated from writers (lookups, ranged selects, the depth-annotated
//!   descendants query).
//! - [`BackendTx`] is one open transaction. Every mutation the engine performs
//!   is a group of statements issued on a single `BackendTx` and made visible
//!   by [`BackendTx::commit`]. Dropping a transaction without committing it
//!   rolls the whole group back.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::boundary::Bounds;
use crate::constants::{LEFT_COLUMN, RIGHT_COLUMN};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage-assigned node identifier. Stable across every move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of one tree of the forest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TreeId(i64);

impl TreeId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// The identifier allocated after `current`, or the first one when the
    /// table is empty.
    pub fn next_after(current: Option<TreeId>) -> TreeId {
        TreeId(current.map_or(0, |t| t.0) + 1)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TreeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A stored node as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub tree_id: TreeId,
    pub bounds: Bounds,
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A node about to be inserted; the backend assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub tree_id: TreeId,
    pub bounds: Bounds,
    pub name: String,
    pub data: serde_json::Value,
}

/// One row of the descendants query.
///
/// `depth` counts the strict ancestors of the row inside the queried subtree,
/// the subtree root included, so immediate children have depth 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthRow {
    pub row: NodeRow,
    pub depth: u32,
}

/// A boundary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Left,
    Right,
}

impl Column {
    /// Both boundary columns, for statements shifting whole ranges.
    pub const BOTH: &'static [Column] = &[Column::Left, Column::Right];

    /// SQL column name.
    pub const fn name(&self) -> &'static str {
        match self {
            Column::Left => LEFT_COLUMN,
            Column::Right => RIGHT_COLUMN,
        }
    }

    /// Read this column from a set of bounds.
    pub const fn of(&self, bounds: &Bounds) -> i64 {
        match self {
            Column::Left => bounds.left,
            Column::Right => bounds.right,
        }
    }
}

/// A predicate on a single boundary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRange {
    /// `column >= value`
    AtLeast(i64),
    /// `low <= column <= high`
    Between(i64, i64),
}

impl ColumnRange {
    /// Evaluate the predicate against a value.
    pub const fn contains(&self, value: i64) -> bool {
        match *self {
            ColumnRange::AtLeast(min) => value >= min,
            ColumnRange::Between(low, high) => low <= value && value <= high,
        }
    }
}

/// Row selection used by every ranged read and bulk statement.
///
/// Equality on the tree identifier, optionally combined with one range
/// predicate on a boundary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFilter {
    pub tree_id: TreeId,
    pub range: Option<(Column, ColumnRange)>,
}

impl RowFilter {
    /// Every row of `tree_id`.
    pub const fn tree(tree_id: TreeId) -> Self {
        Self {
            tree_id,
            range: None,
        }
    }

    /// Rows of the tree with `left >= value`.
    pub const fn left_at_least(self, value: i64) -> Self {
        self.with(Column::Left, ColumnRange::AtLeast(value))
    }

    /// Rows of the tree with `right >= value`.
    pub const fn right_at_least(self, value: i64) -> Self {
        self.with(Column::Right, ColumnRange::AtLeast(value))
    }

    /// Rows of the tree with `low <= left <= high`.
    pub const fn left_between(self, low: i64, high: i64) -> Self {
        self.with(Column::Left, ColumnRange::Between(low, high))
    }

    /// Restrict the filter by a column range.
    pub const fn with(self, column: Column, range: ColumnRange) -> Self {
        Self {
            tree_id: self.tree_id,
            range: Some((column, range)),
        }
    }

    /// Evaluate the filter against a stored row.
    pub fn matches(&self, row: &NodeRow) -> bool {
        row.tree_id == self.tree_id
            && self
                .range
                .is_none_or(|(column, range)| range.contains(column.of(&row.bounds)))
    }
}

/// Storage backend trait for nested-set forests.
///
/// Implementations must be `Send` and `Sync` so a [`Forest`](crate::Forest)
/// can be shared across tasks, and implement `Any` to allow downcasting to
/// the concrete backend (for example to save an [`InMemory`](database::InMemory)
/// backend to disk).
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    /// Begin a transaction.
    ///
    /// All statements of one engine operation are issued on the returned
    /// transaction. It is rolled back when dropped without
    /// [`commit`](BackendTx::commit).
    async fn begin<'a>(&'a self) -> Result<Box<dyn BackendTx + 'a>>;

    /// Retrieves a node by its id.
    ///
    /// # Returns
    /// The stored row, or `BackendError::NodeNotFound`.
    async fn get(&self, id: NodeId) -> Result<NodeRow>;

    /// Rows matching `filter`, ascending by `left`.
    async fn select(&self, filter: RowFilter) -> Result<Vec<NodeRow>>;

    /// All roots (`left == 1`) of the forest, ascending by tree id.
    async fn roots(&self) -> Result<Vec<NodeRow>>;

    /// Strict descendants of the stored range of node `id`, ascending by
    /// `left`, each annotated with its depth below `id`.
    ///
    /// With a `depth_limit`, only rows with `depth <= depth_limit` are returned.
    async fn descendants(&self, id: NodeId, depth_limit: Option<u32>) -> Result<Vec<DepthRow>>;

    /// Returns a reference to the backend instance as a dynamic `Any` type.
    fn as_any(&self) -> &dyn Any;
}

/// One open storage transaction.
///
/// Statements are applied in the order they are issued and each one is
/// evaluated against the state left by the previous one.
#[async_trait]
pub trait BackendTx: Send {
    /// Serialize against every other transaction that locks the same tree.
    ///
    /// The lock is held until the transaction ends.
    async fn lock_tree(&mut self, tree_id: TreeId) -> Result<()>;

    /// Read a node inside the transaction.
    async fn get(&mut self, id: NodeId) -> Result<NodeRow>;

    /// Insert a node and return it with its assigned id.
    async fn insert(&mut self, node: NewNode) -> Result<NodeRow>;

    /// Add `delta` to each of `columns` for every row matching `filter`.
    ///
    /// The filter is evaluated once, against the values before the update,
    /// so a row is selected or not regardless of how the update moves it.
    ///
    /// # Returns
    /// The number of rows updated.
    async fn increment(&mut self, filter: RowFilter, columns: &[Column], delta: i64)
    -> Result<u64>;

    /// Set `tree_id` for every row matching `filter`.
    ///
    /// # Returns
    /// The number of rows updated.
    async fn set_tree_id(&mut self, filter: RowFilter, tree_id: TreeId) -> Result<u64>;

    /// Highest tree identifier in use, `None` when the table is empty.
    async fn max_tree_id(&mut self) -> Result<Option<TreeId>>;

    /// Make every statement of the transaction visible atomically.
    async fn commit(self: Box<Self>) -> Result<()>;
}
