//! Nodes of the forest and their lazily loaded children.
//!
//! A [`Node`] starts [`Transient`](NodeState::Transient): it has a name and a
//! payload but no id and no boundaries. Placing it (as a root, a child or a
//! sibling) persists it and moves it to [`Placed`](NodeState::Placed), which
//! it never leaves. Placing an already placed node moves it, together with
//! its whole subtree.
//!
//! Boundaries cached on a `Node` are refreshed by every operation issued
//! through it and by [`Node::reload`]. Mutations always work from the stored
//! rows, never from the cached values.

pub mod errors;

use std::fmt;
use std::str::FromStr;

use crate::Result;
use crate::backend::{NodeId, NodeRow, TreeId};
use crate::boundary::{Bounds, Placement};
use crate::forest::Forest;
use crate::{hierarchy, placement};

pub use errors::NodeError;

/// Persistence state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Not stored yet.
    Transient,
    /// Stored, with the boundaries last seen for it.
    Placed {
        id: NodeId,
        tree_id: TreeId,
        bounds: Bounds,
    },
}

/// Children of a node as known to this instance.
#[derive(Debug, Clone, Default)]
pub enum Children {
    /// Not loaded yet, or invalidated by a mutation.
    #[default]
    Unloaded,
    /// Known to have no children.
    Empty,
    /// Loaded children in sibling order.
    Loaded(Vec<Node>),
}

impl Children {
    pub fn is_unloaded(&self) -> bool {
        matches!(self, Children::Unloaded)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Children::Empty)
    }

    /// The loaded children, or an empty slice when nothing is loaded.
    pub fn as_slice(&self) -> &[Node] {
        match self {
            Children::Loaded(nodes) => nodes,
            Children::Unloaded | Children::Empty => &[],
        }
    }
}

/// Where to put a node among the children of a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildPosition {
    First,
    Last,
}

impl FromStr for ChildPosition {
    type Err = NodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(ChildPosition::First),
            "last" => Ok(ChildPosition::Last),
            other => Err(NodeError::InvalidPosition {
                position: other.to_string(),
                expected: "first, last",
            }),
        }
    }
}

impl From<ChildPosition> for Placement {
    fn from(position: ChildPosition) -> Self {
        match position {
            ChildPosition::First => Placement::FirstChild,
            ChildPosition::Last => Placement::LastChild,
        }
    }
}

/// Where to put a node relative to a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiblingPosition {
    Previous,
    Next,
}

impl FromStr for SiblingPosition {
    type Err = NodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "previous" => Ok(SiblingPosition::Previous),
            "next" => Ok(SiblingPosition::Next),
            other => Err(NodeError::InvalidPosition {
                position: other.to_string(),
                expected: "previous, next",
            }),
        }
    }
}

impl From<SiblingPosition> for Placement {
    fn from(position: SiblingPosition) -> Self {
        match position {
            SiblingPosition::Previous => Placement::PreviousSibling,
            SiblingPosition::Next => Placement::NextSibling,
        }
    }
}

/// A node of the forest.
///
/// Created by [`Forest::new_node`] (transient) or read back from storage with
/// [`Forest::node`], [`Forest::roots`] or [`Node::load_children`].
#[derive(Clone)]
pub struct Node {
    forest: Forest,
    state: NodeState,
    name: String,
    data: serde_json::Value,
    children: Children,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("state", &self.state)
            .field("name", &self.name)
            .field("data", &self.data)
            .field("children", &self.children)
            .finish()
    }
}

impl Node {
    pub(crate) fn transient(forest: Forest, name: String) -> Self {
        Self {
            forest,
            state: NodeState::Transient,
            name,
            data: serde_json::Value::Null,
            children: Children::Unloaded,
        }
    }

    pub(crate) fn from_row(forest: Forest, row: NodeRow) -> Self {
        Self::with_children(forest, row, Children::Unloaded)
    }

    pub(crate) fn with_children(forest: Forest, row: NodeRow, children: Children) -> Self {
        Self {
            forest,
            state: NodeState::Placed {
                id: row.id,
                tree_id: row.tree_id,
                bounds: row.bounds,
            },
            name: row.name,
            data: row.data,
            children,
        }
    }

    /// Replace the payload. Only stored when the node is first placed.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn id(&self) -> Option<NodeId> {
        match self.state {
            NodeState::Placed { id, .. } => Some(id),
            NodeState::Transient => None,
        }
    }

    pub fn tree_id(&self) -> Option<TreeId> {
        match self.state {
            NodeState::Placed { tree_id, .. } => Some(tree_id),
            NodeState::Transient => None,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self.state {
            NodeState::Placed { bounds, .. } => Some(bounds),
            NodeState::Transient => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Children as currently cached, without touching storage.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Whether the node is the root of its tree, per its cached boundaries.
    pub fn is_root(&self) -> bool {
        self.bounds().is_some_and(|b| b.is_root())
    }

    /// `right - left` per the cached boundaries: 1 for a leaf.
    pub fn size(&self) -> Option<i64> {
        self.bounds().map(|b| b.size())
    }

    fn placed_id(&self) -> Result<NodeId> {
        self.id().ok_or_else(|| NodeError::NotPersisted.into())
    }

    fn apply(&mut self, row: NodeRow) {
        self.state = NodeState::Placed {
            id: row.id,
            tree_id: row.tree_id,
            bounds: row.bounds,
        };
        self.name = row.name;
        self.data = row.data;
    }

    /// Re-read the node from storage and drop its cached children.
    pub async fn reload(&mut self) -> Result<()> {
        let id = self.placed_id()?;
        let row = self.forest.backend().get(id).await?;
        self.apply(row);
        self.children = Children::Unloaded;
        Ok(())
    }

    /// Make this node the root of a tree.
    ///
    /// A transient node becomes the only node of a new tree. A placed node
    /// that is not a root is moved, with its subtree, into a new tree. A node
    /// whose cached boundaries already say it is a root is left alone without
    /// any storage access.
    pub async fn make_root(&mut self) -> Result<()> {
        match self.state {
            NodeState::Transient => {
                let row =
                    placement::create_root(self.forest.backend(), &self.name, &self.data).await?;
                self.apply(row);
            }
            NodeState::Placed { bounds, .. } if bounds.is_root() => {}
            NodeState::Placed { id, .. } => {
                let row = placement::make_root(self.forest.backend(), id).await?;
                self.apply(row);
                self.children = Children::Unloaded;
            }
        }
        Ok(())
    }

    /// Place this node as the first or last child of `parent`.
    pub async fn place_as_child(&mut self, parent: &mut Node, position: ChildPosition) -> Result<()> {
        let Some(reference) = parent.id() else {
            return Err(NodeError::InvalidParent.into());
        };
        self.place(parent, reference, position.into()).await
    }

    /// Place this node immediately before or after `sibling`.
    pub async fn place_as_sibling(
        &mut self,
        sibling: &mut Node,
        position: SiblingPosition,
    ) -> Result<()> {
        let Some(reference) = sibling.id() else {
            return Err(NodeError::InvalidSibling.into());
        };
        self.place(sibling, reference, position.into()).await
    }

    pub async fn place_as_first_child(&mut self, parent: &mut Node) -> Result<()> {
        self.place_as_child(parent, ChildPosition::First).await
    }

    pub async fn place_as_last_child(&mut self, parent: &mut Node) -> Result<()> {
        self.place_as_child(parent, ChildPosition::Last).await
    }

    pub async fn place_as_previous_sibling(&mut self, sibling: &mut Node) -> Result<()> {
        self.place_as_sibling(sibling, SiblingPosition::Previous).await
    }

    pub async fn place_as_next_sibling(&mut self, sibling: &mut Node) -> Result<()> {
        self.place_as_sibling(sibling, SiblingPosition::Next).await
    }

    async fn place(
        &mut self,
        reference: &mut Node,
        reference_id: NodeId,
        to: Placement,
    ) -> Result<()> {
        reference.children = Children::Unloaded;

        let placed = match self.state {
            NodeState::Transient => {
                placement::place_new(
                    self.forest.backend(),
                    reference_id,
                    to,
                    &self.name,
                    &self.data,
                )
                .await?
            }
            NodeState::Placed { id, .. } => {
                let placed =
                    placement::place_existing(self.forest.backend(), id, reference_id, to)
                        .await?;
                self.children = Children::Unloaded;
                placed
            }
        };

        self.apply(placed.node);
        reference.apply(placed.reference);
        Ok(())
    }

    /// Load the children of this node.
    ///
    /// Served from the cache when the children are already known. Otherwise
    /// one descendants query is issued and the whole returned subtree is
    /// rebuilt; with `depth_limit`, nodes at the limit keep unloaded children.
    /// A limit of 0 returns no children and leaves them unloaded.
    pub async fn load_children(&mut self, depth_limit: Option<u32>) -> Result<&[Node]> {
        let id = self.placed_id()?;

        if self.children.is_unloaded() {
            // A zero limit cuts off every child, so nothing is known yet.
            if depth_limit == Some(0) {
                return Ok(&[]);
            }
            let rows = self.forest.backend().descendants(id, depth_limit).await?;
            let nodes = hierarchy::rebuild(&self.forest, rows)?;
            self.children = if nodes.is_empty() {
                Children::Empty
            } else {
                Children::Loaded(nodes)
            };
        }

        Ok(self.children.as_slice())
    }
}
