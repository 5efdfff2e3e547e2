//! Selection range and the range-preserving mutation primitives.
//!
//! A [`SelectionRange`] is plain data: nothing updates it behind the caller's
//! back. Every structural edit that may invalidate it goes through one of the
//! `*_preserving_range` functions here, which take the range explicitly and
//! remap both boundaries so they keep designating the same position.

use crate::error::DomError;
use crate::tree::{NodeId, Tree};

/// A `(container, offset)` boundary.
///
/// For text containers the offset counts chars; for everything else it
/// counts children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary {
    pub container: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(container: NodeId, offset: usize) -> Self {
        Self { container, offset }
    }
}

/// A live selection range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: Boundary,
    pub end: Boundary,
}

impl SelectionRange {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// A collapsed range (caret).
    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub(crate) fn boundaries_mut(&mut self) -> [&mut Boundary; 2] {
        [&mut self.start, &mut self.end]
    }
}

/// Detach `node`, moving any boundary inside it to where it used to be.
pub fn remove_preserving_range(tree: &mut Tree, node: NodeId, range: &mut SelectionRange) {
    let Some(parent) = tree.parent(node) else {
        return;
    };
    let index = tree.node_index(node);
    for boundary in range.boundaries_mut() {
        if tree.contains(node, boundary.container) {
            *boundary = Boundary::new(parent, index);
        } else if boundary.container == parent && boundary.offset > index {
            boundary.offset -= 1;
        }
    }
    tracing::debug!(target: "weaver::dom", %node, %parent, index, "removing node");
    tree.remove(node);
}

/// Insert `child` into `parent` before `reference` (or at the end),
/// shifting boundaries in `parent` that sit after the insertion point.
pub fn insert_preserving_range(
    tree: &mut Tree,
    parent: NodeId,
    child: NodeId,
    reference: Option<NodeId>,
    range: &mut SelectionRange,
) -> Result<(), DomError> {
    if tree.parent(child).is_some() {
        remove_preserving_range(tree, child, range);
    }
    tree.insert_before(parent, child, reference)?;
    let index = tree.node_index(child);
    for boundary in range.boundaries_mut() {
        if boundary.container == parent && boundary.offset > index {
            boundary.offset += 1;
        }
    }
    tracing::debug!(target: "weaver::dom", %child, %parent, index, "inserted node");
    Ok(())
}

/// Replace `node` with its children while keeping the range in place.
///
/// Boundaries in the parent after the node shift by the child count minus
/// one; boundaries directly inside the node move up into the parent.
/// Boundaries deeper down are untouched since the children are moved, not
/// recreated.
pub fn unwrap_preserving_range(
    tree: &mut Tree,
    node: NodeId,
    range: &mut SelectionRange,
) -> Result<(), DomError> {
    let Some(parent) = tree.parent(node) else {
        return Ok(());
    };
    let index = tree.node_index(node);
    let child_count = tree.child_count(node);
    for boundary in range.boundaries_mut() {
        if boundary.container == parent && boundary.offset > index {
            // offset > index >= 0, so this never underflows
            boundary.offset = boundary.offset + child_count - 1;
        } else if boundary.container == node {
            *boundary = Boundary::new(parent, index + boundary.offset);
        }
    }
    tracing::debug!(target: "weaver::dom", %node, %parent, index, child_count, "unwrapping node");
    tree.replace_with_children(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<div>a<b>x</b>c</div>` attached to the document.
    fn sample() -> (Tree, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let doc = tree.document();
        let div = tree.create_element("div");
        let a = tree.create_text("a");
        let b = tree.create_element("b");
        let x = tree.create_text("x");
        let c = tree.create_text("c");
        tree.append_child(doc, div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        tree.append_child(b, x).unwrap();
        tree.append_child(div, c).unwrap();
        (tree, div, a, b, x, c)
    }

    #[test]
    fn test_remove_moves_inner_boundary_to_node_position() {
        let (mut tree, div, _a, b, x, _c) = sample();
        let mut range = SelectionRange::new(Boundary::new(x, 1), Boundary::new(div, 3));
        remove_preserving_range(&mut tree, b, &mut range);
        assert_eq!(range.start, Boundary::new(div, 1));
        assert_eq!(range.end, Boundary::new(div, 2));
    }

    #[test]
    fn test_remove_keeps_boundary_before_node() {
        let (mut tree, div, a, b, _x, _c) = sample();
        let mut range = SelectionRange::new(Boundary::new(div, 1), Boundary::new(a, 1));
        remove_preserving_range(&mut tree, b, &mut range);
        assert_eq!(range.start, Boundary::new(div, 1));
        assert_eq!(range.end, Boundary::new(a, 1));
    }

    #[test]
    fn test_insert_shifts_later_boundaries() {
        let (mut tree, div, _a, b, _x, _c) = sample();
        let mut range = SelectionRange::new(Boundary::new(div, 1), Boundary::new(div, 3));
        let br = tree.create_element("br");
        insert_preserving_range(&mut tree, div, br, Some(b), &mut range).unwrap();
        assert_eq!(tree.node_index(br), 1);
        // A boundary exactly at the insertion index stays before the new node.
        assert_eq!(range.start, Boundary::new(div, 1));
        assert_eq!(range.end, Boundary::new(div, 4));
    }

    #[test]
    fn test_unwrap_remaps_parent_and_wrapper_boundaries() {
        let (mut tree, div, _a, b, x, c) = sample();
        let y = tree.create_text("y");
        tree.append_child(b, y).unwrap();
        // <div>a<b>xy</b>c</div>, selection from inside <b> to after it
        let mut range = SelectionRange::new(Boundary::new(b, 1), Boundary::new(div, 2));
        unwrap_preserving_range(&mut tree, b, &mut range).unwrap();
        assert_eq!(tree.children(div).count(), 4);
        assert_eq!(tree.child_at(div, 1), Some(x));
        assert_eq!(tree.child_at(div, 3), Some(c));
        // Between x and y.
        assert_eq!(range.start, Boundary::new(div, 2));
        // Just after y, before c.
        assert_eq!(range.end, Boundary::new(div, 3));
    }

    #[test]
    fn test_unwrap_empty_wrapper_shifts_back() {
        let (mut tree, div, _a, b, x, _c) = sample();
        tree.remove(x);
        let mut range = SelectionRange::collapsed(Boundary::new(div, 3));
        unwrap_preserving_range(&mut tree, b, &mut range).unwrap();
        assert_eq!(range.start, Boundary::new(div, 2));
        assert!(range.is_collapsed());
    }
}
