//! Bulk Loader: materializing a nested description as one new tree.
//!
//! Every item is created as the last child of its parent through the regular
//! placement path, so each insertion is its own transaction. A failed load
//! leaves the items created before the failure in place.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::constants::{DEFAULT_ROOT_NAME, MAX_HIERARCHY_DEPTH};
use crate::forest::Forest;
use crate::node::Node;
use crate::node::errors::NodeError;

/// One entry of a nested description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    #[serde(default)]
    pub children: Vec<Item>,
}

impl Item {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Item>) -> Self {
        self.children = children;
        self
    }

    /// Levels of nesting, counting this item: 1 for an item without children.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((item, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(item.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// This item and all of its descendants.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Item::count).sum::<usize>()
    }
}

/// What to do when a top-level item cannot be loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Stop at the first failure and return it.
    #[default]
    FailFast,
    /// Log the failure, abandon that item's subtree, continue with the next
    /// top-level item.
    SkipFailedItems,
}

/// Options for [`Forest::build_forest`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub policy: LoadPolicy,
    /// Deepest nesting accepted below the synthetic root.
    pub max_depth: usize,
    /// Name of the synthetic root.
    pub root_name: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            policy: LoadPolicy::default(),
            max_depth: MAX_HIERARCHY_DEPTH,
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

impl LoadOptions {
    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }
}

/// Result of a bulk load.
#[derive(Debug)]
pub struct LoadSummary {
    /// The synthetic root, reloaded after the last insertion.
    pub root: Node,
    /// Nodes created, the root included.
    pub created: usize,
    /// Top-level items abandoned under [`LoadPolicy::SkipFailedItems`].
    pub skipped: usize,
}

struct Frame<'a> {
    node: Node,
    items: &'a [Item],
    next: usize,
}

/// Create `item` and its whole subtree as the last child of `parent`.
///
/// `created` counts every node stored, also when a later insertion fails.
async fn load_item(
    forest: &Forest,
    parent: &mut Node,
    item: &Item,
    created: &mut usize,
) -> Result<()> {
    let mut node = forest.new_node(item.label.as_str());
    node.place_as_last_child(parent).await?;
    *created += 1;

    let mut stack = vec![Frame {
        node,
        items: &item.children,
        next: 0,
    }];
    while let Some(frame) = stack.last_mut() {
        let items = frame.items;
        let Some(child) = items.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let mut node = forest.new_node(child.label.as_str());
        node.place_as_last_child(&mut frame.node).await?;
        *created += 1;

        stack.push(Frame {
            node,
            items: &child.children,
            next: 0,
        });
    }
    Ok(())
}

pub(crate) async fn build_forest(
    forest: &Forest,
    items: &[Item],
    options: &LoadOptions,
) -> Result<LoadSummary> {
    let mut accepted = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        if item.depth() <= options.max_depth {
            accepted.push(item);
            continue;
        }
        let err = NodeError::HierarchyTooDeep {
            limit: options.max_depth,
        };
        match options.policy {
            LoadPolicy::FailFast => return Err(err.into()),
            LoadPolicy::SkipFailedItems => {
                tracing::warn!(label = %item.label, error = %err, "Skipping item");
                skipped += 1;
            }
        }
    }

    let mut root = forest.new_node(options.root_name.as_str());
    root.make_root().await?;
    let mut created = 1;

    for item in accepted {
        let before = created;
        if let Err(err) = load_item(forest, &mut root, item, &mut created).await {
            match options.policy {
                LoadPolicy::FailFast => return Err(err),
                LoadPolicy::SkipFailedItems => {
                    tracing::warn!(
                        label = %item.label,
                        partial = created - before,
                        error = %err,
                        "Skipping item"
                    );
                    skipped += 1;
                }
            }
        }
    }

    root.reload().await?;
    tracing::info!(tree_id = ?root.tree_id(), created, skipped, "Loaded forest");
    Ok(LoadSummary {
        root,
        created,
        skipped,
    })
}
