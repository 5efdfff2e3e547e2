//! Boundary points for traversal.
//!
//! A [`Point`] is either "before node N" or "at the end of element E's
//! contents". Text nodes are atomic: a point never sits inside one. Walking
//! forward from a point visits every opening position, every text node and
//! every closing position in document order, which is what the line-boundary
//! code needs to see the tags it crosses.
//!
//! Points are plain values. Stepping returns a new point and leaves the
//! original alone, so a failed walk never has to be undone.

use crate::range::Boundary;
use crate::tree::{NodeId, Tree};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    node: NodeId,
    at_end: bool,
}

impl Point {
    /// The position immediately before `node`.
    pub fn before(node: NodeId) -> Self {
        Self {
            node,
            at_end: false,
        }
    }

    /// The position after the last child of `node`.
    pub fn end_of(node: NodeId) -> Self {
        Self { node, at_end: true }
    }

    /// The node at this position.
    pub fn node(self) -> NodeId {
        self.node
    }

    /// Whether the point sits at the end of its node's contents.
    pub fn is_at_end(self) -> bool {
        self.at_end
    }

    /// Advance by one position in document order.
    ///
    /// Enters containers, steps over text nodes, and climbs out of a node after
    /// its last child. Returns `None` once the root is exhausted.
    pub fn step_forward(self, tree: &Tree) -> Option<Self> {
        if !self.at_end && !tree.is_text(self.node) {
            return Some(match tree.first_child(self.node) {
                Some(child) => Self::before(child),
                None => Self::end_of(self.node),
            });
        }
        self.skip_forward(tree)
    }

    /// Retreat by one position in document order.
    ///
    /// The inverse of [`Point::step_forward`]: entering a container from the
    /// right lands at its end position.
    pub fn step_backward(self, tree: &Tree) -> Option<Self> {
        if self.at_end {
            return Some(match tree.last_child(self.node) {
                Some(child) => Self::entering_from_right(tree, child),
                None => Self::before(self.node),
            });
        }
        match tree.prev_sibling(self.node) {
            Some(prev) => Some(Self::entering_from_right(tree, prev)),
            None => tree.parent(self.node).map(Self::before),
        }
    }

    fn entering_from_right(tree: &Tree, node: NodeId) -> Self {
        Self {
            node,
            at_end: !tree.is_text(node),
        }
    }

    /// Jump past the node at this position without entering it.
    pub fn skip_forward(self, tree: &Tree) -> Option<Self> {
        match tree.next_sibling(self.node) {
            Some(next) => Some(Self::before(next)),
            None => tree.parent(self.node).map(Self::end_of),
        }
    }

    /// Jump back over the previous sibling-level node without entering it.
    pub fn skip_backward(self, tree: &Tree) -> Option<Self> {
        if self.at_end {
            return Some(match tree.last_child(self.node) {
                Some(child) => Self::before(child),
                None => Self::before(self.node),
            });
        }
        match tree.prev_sibling(self.node) {
            Some(prev) => Some(Self::before(prev)),
            None => tree.parent(self.node).map(Self::before),
        }
    }

    /// Step forward while `pred` holds for the current position.
    ///
    /// Stops at the first position failing `pred`, or where stepping is no
    /// longer possible.
    pub fn step_forward_while(self, tree: &Tree, mut pred: impl FnMut(Self) -> bool) -> Self {
        let mut point = self;
        while pred(point) {
            match point.step_forward(tree) {
                Some(next) => point = next,
                None => break,
            }
        }
        point
    }

    /// Step backward while `pred` holds for the current position.
    pub fn step_backward_while(self, tree: &Tree, mut pred: impl FnMut(Self) -> bool) -> Self {
        let mut point = self;
        while pred(point) {
            match point.step_backward(tree) {
                Some(prev) => point = prev,
                None => break,
            }
        }
        point
    }

    /// Point for a range boundary.
    ///
    /// Returns `None` for a boundary strictly inside a text node, which has no
    /// node-level equivalent.
    pub fn from_boundary(tree: &Tree, boundary: Boundary) -> Option<Self> {
        let Boundary { container, offset } = boundary;
        if tree.is_text(container) {
            let len = tree.text_len(container);
            return match offset {
                0 => Some(Self::before(container)),
                o if o >= len => Self::before(container).skip_forward(tree),
                _ => None,
            };
        }
        Some(match tree.child_at(container, offset) {
            Some(child) => Self::before(child),
            None => Self::end_of(container),
        })
    }

    /// Range boundary for this point. `None` for a parentless node.
    pub fn to_boundary(self, tree: &Tree) -> Option<Boundary> {
        if self.at_end {
            return Some(Boundary::new(self.node, tree.node_length(self.node)));
        }
        let parent = tree.parent(self.node)?;
        Some(Boundary::new(parent, tree.node_index(self.node)))
    }
}
