//! weaver-editor-dom: Rendering-aware boundary and whitespace handling over a
//! document tree.
//!
//! The renderer silently drops a lot of what is physically in the tree:
//! whitespace between blocks, empty inline tags, a `br` right before a block
//! closes. This crate answers "is this node visible", "where does this line
//! start or end", and performs trim and unwrap edits without the page or the
//! selection visibly moving.
//!
//! This crate provides:
//! - `Tree` - arena-backed node tree with range-preserving mutation helpers
//! - `Point` - copyable traversal position, `SelectionRange` - explicit live range
//! - `StyleResolver` trait for resolved style, `UserAgentStyles` default impl
//! - `RenderView` - classification, unrendered checks, line-edge skipping
//! - Trim and unwrap engines that keep a `SelectionRange` in place
//! - HTML fragment reading (html5ever) and serialization for building and
//!   inspecting trees

pub mod classify;
pub mod error;
pub mod line;
pub mod markup;
pub mod point;
pub mod range;
pub mod style;
pub mod tree;
pub mod trim;
pub mod unrendered;
pub mod unwrap;

pub use classify::{
    BLOCK_LEVEL_ELEMENTS, RenderView, is_block_type, is_block_type_by_tag_name, is_break,
    is_control_character, is_editing_host, is_inline_type, is_inline_type_by_tag_name,
    is_propped_block,
};
pub use error::{DomError, MarkupError};
pub use markup::{inner_html, outer_html, parse_document, parse_into, write_html_fmt};
pub use point::Point;
pub use range::{
    Boundary, SelectionRange, insert_preserving_range, remove_preserving_range,
    unwrap_preserving_range,
};
pub use smol_str::SmolStr;
pub use style::{StyleProperty, StyleResolver, UserAgentStyles, WhiteSpace};
pub use tree::{Attribute, NodeId, NodeKind, NodeType, Tree};
pub use trim::{
    Deletion, TrimDirection, adjust_offset_after_trim, adjust_range_after_trim, trim_leading,
    trim_trailing,
};
pub use unwrap::{unwrap_node, unwrap_nodes};
