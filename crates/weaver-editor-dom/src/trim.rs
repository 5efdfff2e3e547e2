//! Whitespace trimming for text nodes, with range re-alignment.

use crate::classify::is_collapsible_whitespace;
use crate::range::SelectionRange;
use crate::tree::{NodeId, Tree};

/// Which end of the text a trim removed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimDirection {
    Left,
    Right,
}

/// What a trim removed: `delta` chars starting at `position` of the old text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deletion {
    pub node: NodeId,
    pub position: usize,
    pub delta: usize,
    pub direction: TrimDirection,
}

/// Remove leading collapsible whitespace from a text node.
pub fn trim_leading(tree: &mut Tree, node: NodeId) -> Deletion {
    let (delta, trimmed) = match tree.text(node) {
        Some(data) => {
            let rest = data.trim_start_matches(is_collapsible_whitespace);
            (data[..data.len() - rest.len()].chars().count(), rest.to_owned())
        }
        None => (0, String::new()),
    };
    if delta > 0 {
        tree.set_text(node, trimmed);
    }
    Deletion {
        node,
        position: 0,
        delta,
        direction: TrimDirection::Left,
    }
}

/// Remove trailing collapsible whitespace from a text node.
pub fn trim_trailing(tree: &mut Tree, node: NodeId) -> Deletion {
    let (delta, trimmed) = match tree.text(node) {
        Some(data) => {
            let rest = data.trim_end_matches(is_collapsible_whitespace);
            (data[rest.len()..].chars().count(), rest.to_owned())
        }
        None => (0, String::new()),
    };
    let position = trimmed.chars().count();
    if delta > 0 {
        tree.set_text(node, trimmed);
    }
    Deletion {
        node,
        position,
        delta,
        direction: TrimDirection::Right,
    }
}

/// Map an offset into the text before a trim onto the text after it.
///
/// Offsets before the removed run stay put, offsets after it shift back by
/// `delta`, and offsets inside it collapse onto `position`.
pub fn adjust_offset_after_trim(
    offset: usize,
    direction: TrimDirection,
    delta: usize,
    position: usize,
) -> usize {
    match direction {
        TrimDirection::Left if offset <= position => offset,
        TrimDirection::Left => offset.saturating_sub(delta).max(position),
        // The run reaches the end of the text, so nothing comes after it.
        TrimDirection::Right => offset.min(position),
    }
}

/// Re-align the endpoints of `range` that sit in the trimmed node.
pub fn adjust_range_after_trim(range: &mut SelectionRange, deletion: &Deletion) {
    if deletion.delta == 0 {
        return;
    }
    for boundary in range.boundaries_mut() {
        if boundary.container == deletion.node {
            boundary.offset = adjust_offset_after_trim(
                boundary.offset,
                deletion.direction,
                deletion.delta,
                deletion.position,
            );
        }
    }
    tracing::debug!(
        target: "weaver::dom",
        node = %deletion.node,
        delta = deletion.delta,
        direction = ?deletion.direction,
        "trimmed text"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Boundary;

    fn text(tree: &mut Tree, data: &str) -> NodeId {
        let node = tree.create_text(data);
        tree.append_child(tree.document(), node).unwrap();
        node
    }

    #[test]
    fn test_trim_leading() {
        let mut tree = Tree::new();
        let node = text(&mut tree, "\n\t foo ");
        let deletion = trim_leading(&mut tree, node);
        assert_eq!(tree.text(node), Some("foo "));
        assert_eq!(
            deletion,
            Deletion {
                node,
                position: 0,
                delta: 3,
                direction: TrimDirection::Left,
            }
        );
    }

    #[test]
    fn test_trim_trailing() {
        let mut tree = Tree::new();
        let node = text(&mut tree, " foo\u{200B} \r\n");
        let deletion = trim_trailing(&mut tree, node);
        assert_eq!(tree.text(node), Some(" foo"));
        assert_eq!(deletion.position, 4);
        assert_eq!(deletion.delta, 4);
        assert_eq!(deletion.direction, TrimDirection::Right);
    }

    #[test]
    fn test_trim_keeps_non_breaking_space() {
        let mut tree = Tree::new();
        let node = text(&mut tree, "\u{A0} x \u{A0}");
        assert_eq!(trim_leading(&mut tree, node).delta, 0);
        assert_eq!(trim_trailing(&mut tree, node).delta, 0);
        assert_eq!(tree.text(node), Some("\u{A0} x \u{A0}"));
    }

    #[test]
    fn test_trim_counts_chars_not_bytes() {
        let mut tree = Tree::new();
        let node = text(&mut tree, "\u{200B}\u{200B}é");
        let deletion = trim_leading(&mut tree, node);
        assert_eq!(deletion.delta, 2);
        assert_eq!(tree.text_len(node), 1);
    }

    #[test]
    fn test_trim_non_text_is_noop() {
        let mut tree = Tree::new();
        let p = tree.create_element("p");
        let deletion = trim_leading(&mut tree, p);
        assert_eq!(deletion.delta, 0);
        let deletion = trim_trailing(&mut tree, p);
        assert_eq!(deletion.delta, 0);
    }

    #[test]
    fn test_adjust_left() {
        // "   foo" -> "foo"
        let left = |o| adjust_offset_after_trim(o, TrimDirection::Left, 3, 0);
        assert_eq!(left(0), 0);
        assert_eq!(left(2), 0);
        assert_eq!(left(3), 0);
        assert_eq!(left(5), 2);
        assert_eq!(left(6), 3);
    }

    #[test]
    fn test_adjust_right() {
        // "foo   " -> "foo"
        let right = |o| adjust_offset_after_trim(o, TrimDirection::Right, 3, 3);
        assert_eq!(right(0), 0);
        assert_eq!(right(3), 3);
        assert_eq!(right(5), 3);
        assert_eq!(right(6), 3);
    }

    #[test]
    fn test_adjust_reverses_outside_trimmed_run() {
        let delta = 4;
        for offset in delta..=10 {
            let adjusted = adjust_offset_after_trim(offset, TrimDirection::Left, delta, 0);
            assert_eq!(adjusted + delta, offset);
        }
        for offset in 0..=6 {
            assert_eq!(adjust_offset_after_trim(offset, TrimDirection::Right, delta, 6), offset);
        }
    }

    #[test]
    fn test_fully_consumed_node_maps_to_zero() {
        let mut tree = Tree::new();
        let node = text(&mut tree, " \n ");
        let other = text(&mut tree, "x");
        let mut range = SelectionRange::new(Boundary::new(node, 2), Boundary::new(other, 1));
        let deletion = trim_leading(&mut tree, node);
        adjust_range_after_trim(&mut range, &deletion);
        assert_eq!(tree.text(node), Some(""));
        assert_eq!(range.start, Boundary::new(node, 0));
        assert_eq!(range.end, Boundary::new(other, 1));
    }
}
