//! Single-node classification.
//!
//! Two families of predicates live here. The static ones look only at node
//! type, tag name and character data, so they work on detached trees. The
//! [`RenderView`] ones consult resolved style and therefore only give
//! meaningful answers for attached nodes; for anything else they degrade to
//! "inline, not line-breaking".

use smol_str::SmolStr;

use crate::style::{StyleProperty, StyleResolver, WhiteSpace, is_non_block_display};
use crate::tree::{NodeId, NodeType, Tree};

/// Block-level elements by tag name.
///
/// "Block-level" is not technically defined for elements that are new in
/// HTML5; they are listed where browsers render them as blocks.
pub const BLOCK_LEVEL_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "tfoot",
    "ul",
    "video",
];

/// Whitespace the renderer collapses: HTML 4 white space plus ZWSP.
pub fn is_collapsible_whitespace(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\u{0C}' | '\r' | ' ' | '\u{200B}')
}

/// Zero-width characters.
pub fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

/// C0 and C1 control codes, plus DEL.
///
/// Tab and line feeds count; space (0x20) and NBSP (0xA0) do not.
pub fn is_control_character(ch: char) -> bool {
    matches!(ch, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

pub fn is_block_type_by_tag_name(tag: &str) -> bool {
    BLOCK_LEVEL_ELEMENTS
        .iter()
        .any(|block| block.eq_ignore_ascii_case(tag))
}

pub fn is_inline_type_by_tag_name(tag: &str) -> bool {
    !is_block_type_by_tag_name(tag)
}

/// Block-level element by tag name. Works on detached nodes.
pub fn is_block_type(tree: &Tree, node: NodeId) -> bool {
    tree.tag_name(node).is_some_and(is_block_type_by_tag_name)
}

pub fn is_inline_type(tree: &Tree, node: NodeId) -> bool {
    !is_block_type(tree, node)
}

/// A block-type element, a document or a fragment.
///
/// Used where content is laid out in lines regardless of attachment.
pub fn is_block_context(tree: &Tree, node: NodeId) -> bool {
    match tree.node_type(node) {
        NodeType::Document | NodeType::Fragment => true,
        NodeType::Element => is_block_type(tree, node),
        NodeType::Text => false,
    }
}

/// An element with `contenteditable="true"`.
pub fn is_editing_host(tree: &Tree, node: NodeId) -> bool {
    tree.is_element(node)
        && tree
            .attribute(node, "contenteditable")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// An explicit `<br>`.
pub fn is_break(tree: &Tree, node: NodeId) -> bool {
    tree.has_tag(node, "br")
}

/// Empty inline elements that still render: images and breaks.
pub fn is_rendered_empty_inline(tree: &Tree, node: NodeId) -> bool {
    tree.has_tag(node, "img") || tree.has_tag(node, "br")
}

/// Text made only of collapsible whitespace. Empty text does not count.
pub fn is_whitespaces(tree: &Tree, node: NodeId) -> bool {
    tree.text(node)
        .is_some_and(|data| !data.is_empty() && data.chars().all(is_collapsible_whitespace))
}

/// Text made only of zero-width characters. Empty text does not count.
pub fn is_zero_width_characters(tree: &Tree, node: NodeId) -> bool {
    tree.text(node)
        .is_some_and(|data| !data.is_empty() && data.chars().all(is_zero_width))
}

/// Text that can never produce visible output in a normal flow: empty, or
/// only collapsible and zero-width characters.
pub fn is_ignorable_whitespace(tree: &Tree, node: NodeId) -> bool {
    tree.text(node).is_some_and(|data| {
        data.chars()
            .all(|ch| is_collapsible_whitespace(ch) || is_zero_width(ch))
    })
}

/// A block whose only content is a single `<br>` keeping it visible.
///
/// Ignorable whitespace may surround the break; anything else, including a
/// second break, disqualifies the block.
pub fn is_propped_block(tree: &Tree, node: NodeId) -> bool {
    if !is_block_type(tree, node) {
        return false;
    }
    let mut found = false;
    for child in tree.children(node) {
        if !found && is_break(tree, child) {
            found = true;
        } else if !is_ignorable_whitespace(tree, child) {
            return false;
        }
    }
    found
}

/// Whether a style property inherits. Only `background-color` is known not to.
pub fn is_style_inherited(property: &str) -> bool {
    !property.eq_ignore_ascii_case("background-color")
}

/// Whether an editing host with this tag may contain paragraphs.
pub fn allows_nested_paragraph(host_tag: &str) -> bool {
    !(host_tag.eq_ignore_ascii_case("span") || host_tag.eq_ignore_ascii_case("p"))
}

/// Walk from `node` through its previous siblings to the first one matching
/// `pred` (including `node` itself).
pub fn find_node_right(
    tree: &Tree,
    node: NodeId,
    mut pred: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if pred(candidate) {
            return Some(candidate);
        }
        current = tree.prev_sibling(candidate);
    }
    None
}

/// A tree paired with a style resolver.
///
/// Style-dependent predicates hang off this type; see also the impls in
/// `unrendered` and `line`.
pub struct RenderView<'a, S: ?Sized> {
    pub(crate) tree: &'a Tree,
    pub(crate) styles: &'a S,
}

impl<S: ?Sized> Clone for RenderView<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for RenderView<'_, S> {}

impl<'a, S: StyleResolver + ?Sized> RenderView<'a, S> {
    pub fn new(tree: &'a Tree, styles: &'a S) -> Self {
        Self { tree, styles }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn styles(&self) -> &'a S {
        self.styles
    }

    pub fn resolved_style(&self, node: NodeId, property: StyleProperty) -> Option<SmolStr> {
        self.styles.resolved_style(self.tree, node, property)
    }

    /// Effective `white-space` mode; for text nodes, the parent's.
    pub fn white_space(&self, node: NodeId) -> WhiteSpace {
        self.resolved_style(node, StyleProperty::WhiteSpace)
            .map(|value| WhiteSpace::parse(&value))
            .unwrap_or_default()
    }

    /// Documents, fragments, and elements whose resolved display is not
    /// inline-level or `none`.
    pub fn is_block_node(&self, node: NodeId) -> bool {
        match self.tree.node_type(node) {
            NodeType::Document | NodeType::Fragment => true,
            NodeType::Element => self
                .resolved_style(node, StyleProperty::Display)
                .is_some_and(|display| !is_non_block_display(&display)),
            NodeType::Text => false,
        }
    }

    pub fn is_inline_node(&self, node: NodeId) -> bool {
        !self.is_block_node(node)
    }

    /// A `<br>` or any block node; both end a line.
    pub fn is_line_breaking_node(&self, node: NodeId) -> bool {
        is_break(self.tree, node) || self.is_block_node(node)
    }
}
