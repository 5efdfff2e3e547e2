//! Deciding whether a node contributes anything to the rendered page.
//!
//! There are three strengths of "unrendered":
//!
//! - [`RenderView::is_unrendered_whitespace_local`] looks at a text node and
//!   its white-space mode only. It gives false positives (whitespace between
//!   two words collapses to a space but still renders) and never false
//!   negatives.
//! - [`RenderView::is_unrendered_at_point`] extends that to inline elements,
//!   which are transparent to line walking unless they are `img` or `br`.
//! - [`RenderView::is_fully_unrendered`] confirms the local answer with the
//!   node's position: first or last child, next to a block, or at a line edge.
//!   This is the one to ask before deleting something.

use crate::classify::{
    RenderView, is_block_context, is_block_type, is_break, is_collapsible_whitespace,
    is_propped_block, is_rendered_empty_inline,
};
use crate::point::Point;
use crate::style::{StyleResolver, WhiteSpace};
use crate::tree::{NodeId, Tree};

/// First or last child of its parent.
pub fn is_terminal_sibling(tree: &Tree, node: NodeId) -> bool {
    tree.parent(node).is_some_and(|parent| {
        tree.first_child(parent) == Some(node) || tree.last_child(parent) == Some(node)
    })
}

/// Whether either neighbouring sibling is a block-type element.
pub fn is_adjacent_to_block(tree: &Tree, node: NodeId) -> bool {
    let is_block = |sibling: Option<NodeId>| sibling.is_some_and(|n| is_block_type(tree, n));
    is_block(tree.prev_sibling(node)) || is_block(tree.next_sibling(node))
}

impl<S: StyleResolver + ?Sized> RenderView<'_, S> {
    /// Empty text, or collapsible whitespace under a collapsing white-space
    /// mode. `pre-line` keeps line terminators, so text holding one renders.
    pub fn is_unrendered_whitespace_local(&self, node: NodeId) -> bool {
        let Some(data) = self.tree.text(node) else {
            return false;
        };
        if data.is_empty() {
            return true;
        }
        if !data.chars().all(is_collapsible_whitespace) {
            return false;
        }
        match self.white_space(node) {
            WhiteSpace::Pre | WhiteSpace::PreWrap => false,
            WhiteSpace::PreLine => !data.contains(['\r', '\n']),
            WhiteSpace::Normal | WhiteSpace::NoWrap => true,
        }
    }

    /// Whether the node at `point` can be walked over without crossing
    /// rendered content, ignoring its siblings.
    pub fn is_unrendered_at_point(&self, point: Point) -> bool {
        let node = point.node();
        self.is_unrendered_whitespace_local(node)
            || (self.tree.is_element(node)
                && self.is_inline_node(node)
                && !is_rendered_empty_inline(self.tree, node))
    }

    /// Whether `node` can be removed without changing what is displayed.
    ///
    /// A `br` that closes a block-type parent is unrendered too, except when
    /// it is the break propping that block open.
    pub fn is_fully_unrendered(&self, node: NodeId) -> bool {
        let tree = self.tree;
        let Some(parent) = tree.parent(node) else {
            return false;
        };

        if !self.is_unrendered_whitespace_local(node) {
            return is_break(tree, node)
                && tree.last_child(parent) == Some(node)
                && is_block_context(tree, parent)
                && !is_propped_block(tree, parent);
        }

        let unrendered = is_terminal_sibling(tree, node)
            || is_adjacent_to_block(tree, node)
            || self.skip_to_end_of_line(Point::before(node)).is_some()
            || self.skip_to_start_of_line(Point::before(node)).is_some();
        tracing::trace!(target: "weaver::dom", %node, unrendered, "confirmed whitespace");
        unrendered
    }

    /// Whether `element` has no rendered element or text child.
    pub fn is_empty(&self, element: NodeId) -> bool {
        self.tree.children(element).all(|child| {
            !(self.tree.is_element(child) || self.tree.is_text(child))
                || self.is_unrendered_whitespace(child)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;
    use crate::style::UserAgentStyles;

    fn texts(tree: &Tree) -> Vec<NodeId> {
        tree.descendants(tree.document())
            .filter(|&n| tree.is_text(n))
            .collect()
    }

    fn element(tree: &Tree, tag: &str) -> NodeId {
        tree.descendants(tree.document())
            .find(|&n| tree.has_tag(n, tag))
            .expect("fixture element")
    }

    #[test]
    fn test_local_whitespace_depends_on_white_space_mode() {
        let tree = parse_document(
            "<p> </p><pre> </pre><div style=\"white-space: pre-line\">\n</div>\
             <div style=\"white-space: pre-line\"> \t</div><p>a </p>",
        )
        .unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        let verdicts: Vec<_> = texts(&tree)
            .into_iter()
            .map(|n| view.is_unrendered_whitespace_local(n))
            .collect();
        assert_eq!(verdicts, vec![true, false, false, true, false]);
    }

    #[test]
    fn test_empty_text_is_unrendered_everywhere() {
        let mut tree = parse_document("<pre></pre>").unwrap();
        let pre = element(&tree, "pre");
        let empty = tree.create_text("");
        tree.append_child(pre, empty).unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        assert!(view.is_unrendered_whitespace_local(empty));
    }

    #[test]
    fn test_nbsp_is_rendered() {
        let tree = parse_document("<p>&nbsp;</p>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_unrendered_whitespace_local(texts(&tree)[0]));
    }

    #[test]
    fn test_unrendered_at_point() {
        let tree = parse_document("<p><b></b><img><br>x</p>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        assert!(view.is_unrendered_at_point(Point::before(element(&tree, "b"))));
        assert!(view.is_unrendered_at_point(Point::end_of(element(&tree, "b"))));
        assert!(!view.is_unrendered_at_point(Point::before(element(&tree, "img"))));
        assert!(!view.is_unrendered_at_point(Point::before(element(&tree, "br"))));
        assert!(!view.is_unrendered_at_point(Point::before(element(&tree, "p"))));
        assert!(!view.is_unrendered_at_point(Point::before(texts(&tree)[0])));
    }

    #[test]
    fn test_whitespace_between_words_is_not_fully_unrendered() {
        let tree = parse_document("<p><b>a</b> <i>b</i></p>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        let space = tree.child_at(element(&tree, "p"), 1).unwrap();
        assert!(view.is_unrendered_whitespace_local(space));
        assert!(!view.is_fully_unrendered(space));
    }

    #[test]
    fn test_whitespace_next_to_block_is_fully_unrendered() {
        let tree = parse_document("<div>a<b> </b><p>x</p> <i>y</i></div>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        let div = element(&tree, "div");
        let in_b = tree.first_child(element(&tree, "b")).unwrap();
        let after_p = tree.child_at(div, 3).unwrap();
        // Sole child of <b>.
        assert!(view.is_fully_unrendered(in_b));
        // Sibling of a block.
        assert!(view.is_fully_unrendered(after_p));
    }

    #[test]
    fn test_whitespace_before_line_break_is_fully_unrendered() {
        let tree = parse_document("<p>a<b>x</b> <br>b</p>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        let space = tree.child_at(element(&tree, "p"), 2).unwrap();
        assert!(!is_terminal_sibling(&tree, space));
        assert!(view.is_fully_unrendered(space));
    }

    #[test]
    fn test_trailing_break() {
        let styles = UserAgentStyles::default();

        let tree = parse_document("<p>foo<br></p>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(view.is_fully_unrendered(element(&tree, "br")));

        let tree = parse_document("<p>foo<br>bar</p>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_fully_unrendered(element(&tree, "br")));

        let tree = parse_document("<span>foo<br></span>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_fully_unrendered(element(&tree, "br")));
    }

    #[test]
    fn test_propping_break_is_rendered() {
        let tree = parse_document("<p><br></p>").unwrap();
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_fully_unrendered(element(&tree, "br")));
    }

    #[test]
    fn test_detached_nodes_are_never_confirmed() {
        let mut tree = Tree::new();
        let space = tree.create_text(" ");
        let styles = UserAgentStyles::default();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_fully_unrendered(space));
    }

    #[test]
    fn test_is_empty() {
        let styles = UserAgentStyles::default();

        let tree = parse_document("<p>\n  </p>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(view.is_empty(element(&tree, "p")));

        let tree = parse_document("<p> foo </p>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_empty(element(&tree, "p")));

        let tree = parse_document("<p> <br> </p>").unwrap();
        let view = RenderView::new(&tree, &styles);
        assert!(!view.is_empty(element(&tree, "p")));
    }
}
