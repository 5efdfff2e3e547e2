//! Line-edge skipping and boundary normalization.
//!
//! A line ends at a `br` or at any block node. Walking from a point over
//! nothing but unrendered content (collapsible whitespace, transparent inline
//! tags) either reaches such an edge, in which case the point was visually at
//! that edge all along, or runs into rendered content, in which case it was
//! not. All functions here are read-only and hand back new points; the input
//! is never touched, so a failed walk needs no undo.

use crate::classify::{RenderView, is_break};
use crate::point::Point;
use crate::range::SelectionRange;
use crate::style::StyleResolver;
use crate::tree::NodeId;

impl<S: StyleResolver + ?Sized> RenderView<'_, S> {
    /// Walk forward over unrendered content to the end of the line.
    ///
    /// Returns the position of the line-breaking node that ends the line, or
    /// `None` if rendered content comes first.
    pub fn skip_to_end_of_line(&self, point: Point) -> Option<Point> {
        let cursor = point.step_forward_while(self.tree, |p| self.is_unrendered_at_point(p));
        self.is_line_breaking_node(cursor.node()).then_some(cursor)
    }

    /// Walk backward over unrendered content to the start of the line.
    ///
    /// Returns the position just after the line-breaking node that starts
    /// the line, or `None` if rendered content comes first. A `br` that only
    /// trails the last line of its block does not start a line; the search
    /// continues past it.
    pub fn skip_to_start_of_line(&self, point: Point) -> Option<Point> {
        let tree = self.tree;
        let unrendered = |p: Point| self.is_unrendered_at_point(p);

        let cursor = point
            .step_backward(tree)
            .unwrap_or(point)
            .step_backward_while(tree, unrendered);
        if !self.is_line_breaking_node(cursor.node()) {
            return None;
        }

        if is_break(tree, cursor.node())
            && self
                .skip_to_end_of_line(point)
                .is_some_and(|end| self.closes_block(end))
        {
            let before_break = cursor.skip_backward(tree)?;
            let cursor = before_break
                .step_backward(tree)
                .unwrap_or(before_break)
                .step_backward_while(tree, unrendered);
            if !self.is_line_breaking_node(cursor.node()) {
                return None;
            }
            tracing::trace!(target: "weaver::dom", node = %cursor.node(), "skipped trailing break");
            return cursor.step_forward(tree);
        }

        cursor.step_forward(tree)
    }

    /// Canonical position for a boundary.
    ///
    /// Prefers the start of the line. Otherwise moves to the end of the line;
    /// when that lands on a `br` it steps past it, and if nothing rendered
    /// follows before the block closes, all the way to the end of the block.
    /// `None` if neither edge is reachable.
    pub fn normalize_boundary(&self, point: Point) -> Option<Point> {
        if let Some(start) = self.skip_to_start_of_line(point) {
            return Some(start);
        }
        let end = self.skip_to_end_of_line(point)?;
        if !is_break(self.tree, end.node()) {
            return Some(end);
        }
        let Some(after_break) = end.skip_forward(self.tree) else {
            return Some(end);
        };
        Some(
            self.skip_to_end_of_line(after_break)
                .filter(|&end_of_block| self.closes_block(end_of_block))
                .unwrap_or(after_break),
        )
    }

    fn closes_block(&self, point: Point) -> bool {
        point.is_at_end() && self.is_block_node(point.node())
    }

    /// Whether `node` is whitespace that the renderer drops entirely.
    ///
    /// Unlike the local check, this confirms that the node sits between real
    /// line edges rather than between two words.
    pub fn is_unrendered_whitespace(&self, node: NodeId) -> bool {
        if !self.is_unrendered_whitespace_local(node) {
            return false;
        }
        let at = Point::before(node);
        self.skip_to_end_of_line(at).is_some() || self.skip_to_start_of_line(at).is_some()
    }

    /// Normalize both boundaries of `range` in place.
    ///
    /// Boundaries strictly inside a text node, or that cannot reach a line
    /// edge, are left alone. Returns whether either boundary moved.
    pub fn normalize_range(&self, range: &mut SelectionRange) -> bool {
        let mut changed = false;
        for boundary in range.boundaries_mut() {
            let normalized = Point::from_boundary(self.tree, *boundary)
                .and_then(|point| self.normalize_boundary(point))
                .and_then(|point| point.to_boundary(self.tree));
            if let Some(normalized) = normalized {
                if normalized != *boundary {
                    tracing::trace!(
                        target: "weaver::dom",
                        from = ?*boundary,
                        to = ?normalized,
                        "normalized boundary"
                    );
                    *boundary = normalized;
                    changed = true;
                }
            }
        }
        changed
    }
}
