//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the backend traits,
//! suitable for testing, development, or scenarios where data persistence
//! is not strictly required or is handled externally.

mod persistence;
mod storage;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{BackendImpl, BackendTx, DepthRow, NodeId, NodeRow, RowFilter};

/// The node table: rows keyed by id plus the id sequence.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    /// Last id handed out; ids are never reused.
    pub(crate) last_id: i64,
    pub(crate) rows: BTreeMap<NodeId, NodeRow>,
}

/// A simple in-memory backend holding the node table behind a `RwLock`.
///
/// Transactions take the write lock for their whole lifetime and work on a
/// private copy of the table, which replaces the shared table on commit. A
/// transaction that is dropped without committing leaves the table untouched.
/// Holding the write lock serializes all writers, which covers the per-tree
/// serialization the engine asks for through [`BackendTx::lock_tree`].
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the table to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) table: RwLock<Table>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of all nodes currently stored, parked ones included.
    pub async fn all_ids(&self) -> Vec<NodeId> {
        let table = self.table.read().await;
        table.rows.keys().copied().collect()
    }

    /// Saves the whole table to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the table from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` database or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl BackendImpl for InMemory {
    async fn begin<'a>(&'a self) -> Result<Box<dyn BackendTx + 'a>> {
        let guard = self.table.write().await;
        Ok(Box::new(storage::InMemoryTx::new(guard)))
    }

    async fn get(&self, id: NodeId) -> Result<NodeRow> {
        let table = self.table.read().await;
        storage::get(&table, id)
    }

    async fn select(&self, filter: RowFilter) -> Result<Vec<NodeRow>> {
        let table = self.table.read().await;
        Ok(storage::select(&table, filter))
    }

    async fn roots(&self) -> Result<Vec<NodeRow>> {
        let table = self.table.read().await;
        Ok(storage::roots(&table))
    }

    async fn descendants(&self, id: NodeId, depth_limit: Option<u32>) -> Result<Vec<DepthRow>> {
        let table = self.table.read().await;
        storage::descendants(&table, id, depth_limit)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
