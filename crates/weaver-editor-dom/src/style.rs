//! Style resolution seam.
//!
//! The engine never computes CSS. It asks a [`StyleResolver`] for the resolved
//! `display` and `white-space` of a node, the way a browser host would call
//! `getComputedStyle`. Hosts with a real rendering context implement the trait
//! over it; everything else (tests, detached trees, servers) can use
//! [`UserAgentStyles`], which resolves from the default user-agent sheet plus
//! inline `style` attributes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::classify::BLOCK_LEVEL_ELEMENTS;
use crate::tree::{NodeId, NodeType, Tree};

/// The style properties the engine looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Display,
    WhiteSpace,
}

impl StyleProperty {
    /// CSS property name.
    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::Display => "display",
            StyleProperty::WhiteSpace => "white-space",
        }
    }
}

/// Resolves computed style values for nodes in a tree.
pub trait StyleResolver {
    /// Resolved value of `property` for `node`.
    ///
    /// Returns `None` when the node has no resolved style, e.g. because it is
    /// not attached to a rendering context. For text nodes `white-space` is
    /// the value inherited from the parent element.
    fn resolved_style(&self, tree: &Tree, node: NodeId, property: StyleProperty)
    -> Option<SmolStr>;
}

impl<T: StyleResolver + ?Sized> StyleResolver for &T {
    fn resolved_style(
        &self,
        tree: &Tree,
        node: NodeId,
        property: StyleProperty,
    ) -> Option<SmolStr> {
        (**self).resolved_style(tree, node, property)
    }
}

/// Parsed `white-space` mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Parse a resolved value. Unknown values fall back to `normal`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pre" => WhiteSpace::Pre,
            "pre-wrap" | "-moz-pre-wrap" => WhiteSpace::PreWrap,
            "pre-line" => WhiteSpace::PreLine,
            "nowrap" => WhiteSpace::NoWrap,
            _ => WhiteSpace::Normal,
        }
    }

    /// Whether all whitespace, newlines included, renders literally.
    pub fn preserves_whitespace(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap)
    }

    /// Whether newlines render as line breaks.
    pub fn preserves_newlines(self) -> bool {
        self.preserves_whitespace() || self == WhiteSpace::PreLine
    }
}

/// `pre`, `pre-wrap` and `-moz-pre-wrap`.
pub fn is_white_space_preserve_style(value: &str) -> bool {
    WhiteSpace::parse(value).preserves_whitespace()
}

/// Display values that do not make an element a block node.
pub fn is_non_block_display(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "inline" | "inline-block" | "inline-table" | "none"
    )
}

/// Default style resolver driven by a user-agent sheet.
///
/// Resolution order for an element is: inline `style` attribute (if
/// enabled), then the per-tag table, then the fallback. `white-space` is
/// inherited, so it walks up the ancestors until something declares it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAgentStyles {
    /// Tag name (lowercase) to `display` value.
    pub display: BTreeMap<SmolStr, SmolStr>,
    /// Tag name (lowercase) to `white-space` value.
    pub white_space: BTreeMap<SmolStr, SmolStr>,
    /// `display` for elements missing from the table.
    pub default_display: SmolStr,
    /// Whether inline `style` attributes override the tables.
    pub inline_styles: bool,
}

impl Default for UserAgentStyles {
    fn default() -> Self {
        let mut display: BTreeMap<SmolStr, SmolStr> = BLOCK_LEVEL_ELEMENTS
            .iter()
            .map(|tag| (SmolStr::new(tag), SmolStr::new_static("block")))
            .collect();
        let extra = [
            ("html", "block"),
            ("body", "block"),
            ("main", "block"),
            ("nav", "block"),
            ("dt", "block"),
            ("li", "list-item"),
            ("table", "table"),
            ("caption", "table-caption"),
            ("thead", "table-header-group"),
            ("tbody", "table-row-group"),
            ("tfoot", "table-footer-group"),
            ("tr", "table-row"),
            ("td", "table-cell"),
            ("th", "table-cell"),
            ("head", "none"),
            ("link", "none"),
            ("meta", "none"),
            ("script", "none"),
            ("style", "none"),
            ("template", "none"),
            ("title", "none"),
        ];
        display.extend(
            extra
                .into_iter()
                .map(|(tag, value)| (SmolStr::new_static(tag), SmolStr::new_static(value))),
        );

        let white_space = [
            ("pre", "pre"),
            ("listing", "pre"),
            ("xmp", "pre"),
            ("textarea", "pre-wrap"),
            ("nobr", "nowrap"),
        ]
        .into_iter()
        .map(|(tag, value)| (SmolStr::new_static(tag), SmolStr::new_static(value)))
        .collect();

        Self {
            display,
            white_space,
            default_display: SmolStr::new_static("inline"),
            inline_styles: true,
        }
    }
}

impl UserAgentStyles {
    pub fn new() -> Self {
        Self::default()
    }

    fn inline_declaration(
        &self,
        tree: &Tree,
        node: NodeId,
        property: StyleProperty,
    ) -> Option<SmolStr> {
        if !self.inline_styles {
            return None;
        }
        let style = tree.attribute(node, "style")?;
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property.name()))
            .map(|(_, value)| SmolStr::new(value.trim().to_ascii_lowercase()))
            .last()
    }

    fn table_value<'a>(
        table: &'a BTreeMap<SmolStr, SmolStr>,
        tree: &Tree,
        node: NodeId,
    ) -> Option<&'a SmolStr> {
        let tag = tree.tag_name(node)?;
        table.get(tag.to_ascii_lowercase().as_str())
    }

    fn element_display(&self, tree: &Tree, node: NodeId) -> SmolStr {
        self.inline_declaration(tree, node, StyleProperty::Display)
            .or_else(|| Self::table_value(&self.display, tree, node).cloned())
            .unwrap_or_else(|| self.default_display.clone())
    }

    fn inherited_white_space(&self, tree: &Tree, node: NodeId) -> SmolStr {
        std::iter::once(node)
            .chain(tree.ancestors(node))
            .filter(|&n| tree.is_element(n))
            .find_map(|n| {
                self.inline_declaration(tree, n, StyleProperty::WhiteSpace)
                    .or_else(|| Self::table_value(&self.white_space, tree, n).cloned())
            })
            .unwrap_or_else(|| SmolStr::new_static("normal"))
    }
}

impl StyleResolver for UserAgentStyles {
    fn resolved_style(
        &self,
        tree: &Tree,
        node: NodeId,
        property: StyleProperty,
    ) -> Option<SmolStr> {
        if !tree.is_attached(node) {
            return None;
        }
        match (property, tree.node_type(node)) {
            (StyleProperty::Display, NodeType::Element) => Some(self.element_display(tree, node)),
            (StyleProperty::Display, _) => None,
            (StyleProperty::WhiteSpace, NodeType::Text) => {
                let parent = tree.parent(node)?;
                Some(self.inherited_white_space(tree, parent))
            }
            (StyleProperty::WhiteSpace, _) => Some(self.inherited_white_space(tree, node)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_document;

    fn first_tag(tree: &Tree, tag: &str) -> NodeId {
        tree.descendants(tree.document())
            .find(|&n| tree.has_tag(n, tag))
            .expect("fixture element")
    }

    #[test]
    fn test_default_display_table() {
        let tree = parse_document("<div><p>a<span>b</span></p></div>").unwrap();
        let styles = UserAgentStyles::default();
        let p = first_tag(&tree, "p");
        let span = first_tag(&tree, "span");
        assert_eq!(
            styles.resolved_style(&tree, p, StyleProperty::Display).as_deref(),
            Some("block")
        );
        assert_eq!(
            styles.resolved_style(&tree, span, StyleProperty::Display).as_deref(),
            Some("inline")
        );
    }

    #[test]
    fn test_inline_style_overrides_table() {
        let tree = parse_document(r#"<div style="display: inline-block">x</div>"#).unwrap();
        let div = first_tag(&tree, "div");
        let styles = UserAgentStyles::default();
        assert_eq!(
            styles.resolved_style(&tree, div, StyleProperty::Display).as_deref(),
            Some("inline-block")
        );

        let styles = UserAgentStyles {
            inline_styles: false,
            ..UserAgentStyles::default()
        };
        assert_eq!(
            styles.resolved_style(&tree, div, StyleProperty::Display).as_deref(),
            Some("block")
        );
    }

    #[test]
    fn test_white_space_is_inherited() {
        let tree = parse_document("<pre><b> </b></pre><p><b> </b></p>").unwrap();
        let styles = UserAgentStyles::default();
        let mut texts = tree.descendants(tree.document()).filter(|&n| tree.is_text(n));
        let in_pre = texts.next().unwrap();
        let in_p = texts.next().unwrap();
        assert_eq!(
            styles.resolved_style(&tree, in_pre, StyleProperty::WhiteSpace).as_deref(),
            Some("pre")
        );
        assert_eq!(
            styles.resolved_style(&tree, in_p, StyleProperty::WhiteSpace).as_deref(),
            Some("normal")
        );
    }

    #[test]
    fn test_detached_nodes_resolve_nothing() {
        let mut tree = Tree::new();
        let p = tree.create_element("p");
        let styles = UserAgentStyles::default();
        assert_eq!(styles.resolved_style(&tree, p, StyleProperty::Display), None);
        assert_eq!(styles.resolved_style(&tree, p, StyleProperty::WhiteSpace), None);
    }

    #[test]
    fn test_white_space_parse() {
        assert_eq!(WhiteSpace::parse("-moz-pre-wrap"), WhiteSpace::PreWrap);
        assert_eq!(WhiteSpace::parse("PRE"), WhiteSpace::Pre);
        assert_eq!(WhiteSpace::parse("inherit"), WhiteSpace::Normal);
        assert!(is_white_space_preserve_style("pre-wrap"));
        assert!(!is_white_space_preserve_style("pre-line"));
        assert!(WhiteSpace::PreLine.preserves_newlines());
        assert!(is_non_block_display("inline-table"));
        assert!(!is_non_block_display("list-item"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let styles: UserAgentStyles =
            serde_json::from_str(r#"{ "inline_styles": false }"#).unwrap();
        assert!(!styles.inline_styles);
        assert_eq!(styles.display.get("p").map(SmolStr::as_str), Some("block"));
        assert_eq!(styles.default_display, "inline");

        let custom: UserAgentStyles =
            serde_json::from_str(r#"{ "display": { "x-card": "block" } }"#).unwrap();
        assert_eq!(custom.display.len(), 1);
        assert_eq!(custom.white_space, UserAgentStyles::default().white_space);
    }
}
