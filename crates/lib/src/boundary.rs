//! Boundary arithmetic for the nested-set encoding.
//!
//! Every node owns the closed range `[left, right]`. A leaf occupies two
//! boundary values, a subtree of size `s` occupies `s + 1`. The functions here
//! are pure; all storage traffic lives in the gap and relocation modules.

use serde::{Deserialize, Serialize};

/// Number of boundary values taken by a freshly inserted leaf.
pub const LEAF_WIDTH: i64 = 2;

/// The `[left, right]` range of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Left boundary (preorder entry).
    pub left: i64,
    /// Right boundary (preorder exit).
    pub right: i64,
}

impl Bounds {
    /// Bounds of a root that has no children.
    pub const ROOT: Bounds = Bounds { left: 1, right: 2 };

    /// Create bounds from raw values.
    pub const fn new(left: i64, right: i64) -> Self {
        Self { left, right }
    }

    /// Bounds of a leaf whose left boundary is `left`.
    pub const fn leaf_at(left: i64) -> Self {
        Self {
            left,
            right: left + 1,
        }
    }

    /// `right - left`. 1 for a leaf.
    pub const fn size(&self) -> i64 {
        self.right - self.left
    }

    /// Number of boundary values the range occupies, `size + 1`.
    ///
    /// This is the gap that has to be opened to make room for the range, and
    /// the gap that is left behind when it is removed.
    pub const fn width(&self) -> i64 {
        self.size() + 1
    }

    /// Roots always start at 1.
    pub const fn is_root(&self) -> bool {
        self.left == 1
    }

    /// A range of size 1 cannot hold any descendant.
    pub const fn is_leaf(&self) -> bool {
        self.size() == 1
    }

    /// Detached subtrees live at or below zero until they are reinserted.
    pub const fn is_parked(&self) -> bool {
        self.right <= 0
    }

    /// Strict containment: `other` is a descendant range of `self`.
    pub const fn contains(&self, other: &Bounds) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// `self` is `other` or one of its ancestors.
    pub const fn encloses(&self, other: &Bounds) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    /// The two ranges share no boundary value.
    pub const fn is_disjoint(&self, other: &Bounds) -> bool {
        self.right < other.left || other.right < self.left
    }

    /// The bounds after shifting both boundaries by `delta`.
    pub const fn shifted(&self, delta: i64) -> Self {
        Self {
            left: self.left + delta,
            right: self.right + delta,
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

/// Where a node goes relative to a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// First child of the reference.
    FirstChild,
    /// Last child of the reference.
    LastChild,
    /// Sibling immediately before the reference.
    PreviousSibling,
    /// Sibling immediately after the reference.
    NextSibling,
}

impl Placement {
    /// Sibling placements put the node on the reference's own level.
    pub const fn is_sibling(&self) -> bool {
        matches!(self, Placement::PreviousSibling | Placement::NextSibling)
    }

    /// The left boundary a node receives when placed relative to `reference`.
    pub const fn left_for(&self, reference: &Bounds) -> i64 {
        match self {
            Placement::FirstChild => reference.left + 1,
            Placement::LastChild => reference.right,
            Placement::PreviousSibling => reference.left,
            Placement::NextSibling => reference.right + 1,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Placement::FirstChild => "first child",
            Placement::LastChild => "last child",
            Placement::PreviousSibling => "previous sibling",
            Placement::NextSibling => "next sibling",
        };
        f.write_str(s)
    }
}

/// Delta that parks a subtree so that its right boundary lands on 0.
pub const fn park_delta(bounds: &Bounds) -> i64 {
    -bounds.right
}

/// Delta that moves a parked subtree of `size` so that it starts at `left`.
pub const fn unpark_delta(size: i64, left: i64) -> i64 {
    left + size
}
