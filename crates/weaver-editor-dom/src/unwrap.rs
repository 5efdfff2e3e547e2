//! Unwrapping elements without disturbing the rendered page.
//!
//! Replacing a wrapper with its children is trivial in an inline context.
//! Inside a block it is not: the wrapper may have been a paragraph giving its
//! content its own line, and the whitespace around it, harmless between two
//! blocks, would suddenly render once the block is gone. [`unwrap_node`]
//! handles both cases and keeps the selection range on the same text
//! throughout.
//!
//! ```text
//!  (prune)    (unwrap)  (prune)             (prune)
//!    |           |         |                   |
//!   <p><wsp><span><wsp>foo<br></span><zwsp></p>
//!        ^                   ^
//!     (prune)             (prune)
//! ```

use crate::classify::{RenderView, is_block_context, is_editing_host, is_zero_width_characters};
use crate::error::DomError;
use crate::range::{
    SelectionRange, insert_preserving_range, remove_preserving_range, unwrap_preserving_range,
};
use crate::style::StyleResolver;
use crate::trim::{adjust_range_after_trim, trim_leading, trim_trailing};
use crate::tree::{NodeId, Tree};

/// Replace `node` with its children, keeping `range` on the same content.
///
/// - Anything but an element, a node without a parent, or one directly under
///   an editing host is left alone.
/// - Under a block (or a document or fragment) the parent's unrendered
///   edges and the whitespace runs beside `node` are pruned first, and a
///   `br` is inserted after `node` so the content that followed it still
///   starts a new line.
/// - Under an inline parent the node is simply replaced by its children.
pub fn unwrap_node<S: StyleResolver + ?Sized>(
    tree: &mut Tree,
    styles: &S,
    node: NodeId,
    range: &mut SelectionRange,
) -> Result<(), DomError> {
    if !tree.is_element(node) {
        tracing::trace!(target: "weaver::dom", %node, "unwrap skipped: not an element");
        return Ok(());
    }
    let Some(parent) = tree.parent(node) else {
        tracing::trace!(target: "weaver::dom", %node, "unwrap skipped: detached");
        return Ok(());
    };
    if is_editing_host(tree, parent) {
        tracing::trace!(target: "weaver::dom", %node, %parent, "unwrap skipped: editing host");
        return Ok(());
    }
    if is_block_context(tree, parent) {
        unwrap_block_child(tree, styles, node, parent, range)
    } else {
        unwrap_preserving_range(tree, node, range)
    }
}

/// [`unwrap_node`] for each node in order.
///
/// Each unwrap sees the tree the previous one left behind, so the order
/// matters for nested or adjacent nodes.
pub fn unwrap_nodes<S: StyleResolver + ?Sized>(
    tree: &mut Tree,
    styles: &S,
    nodes: &[NodeId],
    range: &mut SelectionRange,
) -> Result<(), DomError> {
    for &node in nodes {
        unwrap_node(tree, styles, node, range)?;
    }
    Ok(())
}

fn unwrap_block_child<S: StyleResolver + ?Sized>(
    tree: &mut Tree,
    styles: &S,
    node: NodeId,
    parent: NodeId,
    range: &mut SelectionRange,
) -> Result<(), DomError> {
    remove_unrendered_terminal_children(tree, styles, parent, range);
    remove_unrendered_adjacent_siblings(tree, styles, node, range);

    // The node may itself have been pruned above; the break still goes in,
    // at the end of the parent, where it trails the block unrendered.
    let attached = tree.parent(node) == Some(parent);
    let reference = if attached { tree.next_sibling(node) } else { None };
    let br = tree.create_element("br");
    insert_preserving_range(tree, parent, br, reference, range)?;

    if attached {
        unwrap_preserving_range(tree, node, range)?;
    }
    Ok(())
}

/// Trim and prune the first and last child of `parent` where they render
/// nothing.
///
/// Text is only trimmed when the parent collapses newlines; under the `pre`
/// family the whitespace is content.
pub fn remove_unrendered_terminal_children<S: StyleResolver + ?Sized>(
    tree: &mut Tree,
    styles: &S,
    parent: NodeId,
    range: &mut SelectionRange,
) {
    let trims = !RenderView::new(tree, styles)
        .white_space(parent)
        .preserves_newlines();

    if let Some(first) = tree.first_child(parent) {
        if trims && tree.is_text(first) {
            let deletion = trim_leading(tree, first);
            adjust_range_after_trim(range, &deletion);
        }
        if RenderView::new(tree, styles).is_fully_unrendered(first) {
            remove_preserving_range(tree, first, range);
        }
    }

    if let Some(last) = tree.last_child(parent) {
        if trims && tree.is_text(last) {
            let deletion = trim_trailing(tree, last);
            adjust_range_after_trim(range, &deletion);
        }
        if RenderView::new(tree, styles).is_fully_unrendered(last) {
            remove_preserving_range(tree, last, range);
        }
    }
}

/// Remove the runs of whitespace-only and zero-width-only text directly
/// before and after `node`.
pub fn remove_unrendered_adjacent_siblings<S: StyleResolver + ?Sized>(
    tree: &mut Tree,
    styles: &S,
    node: NodeId,
    range: &mut SelectionRange,
) {
    let doomed: Vec<NodeId> = {
        let view = RenderView::new(tree, styles);
        let tree = view.tree();
        let unrendered = |n: NodeId| {
            tree.is_text(n)
                && (view.is_unrendered_whitespace_local(n) || is_zero_width_characters(tree, n))
        };
        let mut doomed = collect_siblings_while(tree, node, Tree::prev_sibling, unrendered);
        doomed.extend(collect_siblings_while(tree, node, Tree::next_sibling, unrendered));
        doomed
    };
    for sibling in doomed {
        remove_preserving_range(tree, sibling, range);
    }
}

fn collect_siblings_while(
    tree: &Tree,
    node: NodeId,
    step: fn(&Tree, NodeId) -> Option<NodeId>,
    mut pred: impl FnMut(NodeId) -> bool,
) -> Vec<NodeId> {
    std::iter::successors(step(tree, node), |&n| step(tree, n))
        .take_while(|&n| pred(n))
        .collect()
}
