//! The entry point of the library: a handle on one stored forest.
//!
//! A [`Forest`] owns the storage backend and hands out [`Node`]s. Cloning it
//! is cheap and every clone shares the same backend.

use std::fmt;
use std::sync::Arc;

use crate::Result;
use crate::backend::errors::BackendError;
use crate::backend::{BackendImpl, NodeId, NodeRow, RowFilter, TreeId};
use crate::integrity;
use crate::loader::{self, Item, LoadOptions, LoadSummary};
use crate::node::Node;

/// Handle on a forest stored in a backend.
///
/// # Example
///
/// ```ignore
/// use arbor::{Forest, backend::database::InMemory};
///
/// let forest = Forest::new(Box::new(InMemory::new()));
/// let mut root = forest.new_node("root");
/// root.make_root().await?;
///
/// let mut child = forest.new_node("child");
/// child.place_as_last_child(&mut root).await?;
/// assert_eq!(root.size(), Some(3));
/// ```
#[derive(Clone)]
pub struct Forest {
    backend: Arc<dyn BackendImpl>,
}

impl fmt::Debug for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest").finish_non_exhaustive()
    }
}

impl Forest {
    /// Creates a new forest over the given backend.
    pub fn new(backend: Box<dyn BackendImpl>) -> Self {
        Self {
            backend: Arc::from(backend),
        }
    }

    /// Get a reference to the backend.
    pub fn backend(&self) -> &dyn BackendImpl {
        &*self.backend
    }

    /// A new transient node. Nothing is stored until it is placed.
    pub fn new_node(&self, name: impl Into<String>) -> Node {
        Node::transient(self.clone(), name.into())
    }

    /// Read a stored node.
    pub async fn node(&self, id: NodeId) -> Result<Node> {
        let row = self.backend.get(id).await?;
        Ok(Node::from_row(self.clone(), row))
    }

    /// The root of every tree, ascending by tree id.
    pub async fn roots(&self) -> Result<Vec<Node>> {
        let rows = self.backend.roots().await?;
        Ok(rows
            .into_iter()
            .map(|row| Node::from_row(self.clone(), row))
            .collect())
    }

    /// Every row of `tree_id` in preorder.
    pub async fn tree_nodes(&self, tree_id: TreeId) -> Result<Vec<NodeRow>> {
        self.backend.select(RowFilter::tree(tree_id)).await
    }

    /// Check the stored boundaries of one tree.
    pub async fn verify(&self, tree_id: TreeId) -> Result<()> {
        let rows = self.tree_nodes(tree_id).await?;
        if rows.is_empty() {
            return Err(BackendError::TreeNotFound { tree_id }.into());
        }
        integrity::verify_rows(tree_id, &rows)?;
        Ok(())
    }

    /// Check every tree that has a root.
    ///
    /// # Returns
    /// The number of trees checked.
    pub async fn verify_all(&self) -> Result<usize> {
        let roots = self.backend.roots().await?;
        for root in &roots {
            self.verify(root.tree_id).await?;
        }
        Ok(roots.len())
    }

    /// Store `items` as a new tree below a synthetic root.
    pub async fn build_forest(&self, items: &[Item], options: &LoadOptions) -> Result<LoadSummary> {
        loader::build_forest(self, items, options).await
    }
}
