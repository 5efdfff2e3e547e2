//! Arena-backed document tree.
//!
//! Nodes live in a [`Tree`] and are addressed by [`NodeId`]. Detaching a node
//! never frees its slot, so ids held by points and ranges stay valid across
//! structural edits; a detached node simply stops being attached.
//!
//! Text lengths and offsets are counted in chars (Unicode scalar values), the
//! same unit the rest of the editor uses.

use std::fmt;

use smol_str::SmolStr;

use crate::error::DomError;

/// Handle to a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The DOM node type, without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Document,
    Fragment,
}

/// A single element attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: SmolStr,
    pub value: SmolStr,
}

impl Attribute {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Fragment,
    Element { tag: SmolStr, attrs: Vec<Attribute> },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
        }
    }
}

/// An owned document tree.
///
/// Slot 0 is always the document node; everything reachable from it is
/// attached and takes part in style resolution.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only a document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
        }
    }

    /// The document node.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// If every `u32` id is already taken.
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let Some(id) = NodeId::from_index(self.nodes.len()) else {
            panic!("tree is full: every u32 node id is taken");
        };
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    // === Construction ===
    //
    // Slots are never reused, so a tree hands out at most 2^32 ids over its
    // lifetime; creating one more panics.

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<SmolStr>) -> NodeId {
        self.create_element_with_attrs(tag, Vec::new())
    }

    /// Create a detached element with attributes.
    pub fn create_element_with_attrs(
        &mut self,
        tag: impl Into<SmolStr>,
        attrs: Vec<Attribute>,
    ) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.into(),
            attrs,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(data.into()))
    }

    /// Create a detached document fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    // === Node inspection ===

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        match self.kind(id) {
            NodeKind::Document => NodeType::Document,
            NodeKind::Fragment => NodeType::Fragment,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element { .. })
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Tag name as written, for elements.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Check an element's tag, ignoring ASCII case.
    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    /// Look up an attribute value (name compared ignoring ASCII case).
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|attr| attr.name.eq_ignore_ascii_case(name))
                .map(|attr| attr.value.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Set or replace an attribute. Ignored for non-elements.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<SmolStr>) {
        if let NodeKind::Element { attrs, .. } = &mut self.data_mut(id).kind {
            let value = value.into();
            match attrs
                .iter_mut()
                .find(|attr| attr.name.eq_ignore_ascii_case(name))
            {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute::new(name, value)),
            }
        }
    }

    /// Character data, for text nodes.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(data) => Some(data.as_str()),
            _ => None,
        }
    }

    /// Replace a text node's data. Ignored for non-text nodes.
    pub fn set_text(&mut self, id: NodeId, data: impl Into<String>) {
        if let NodeKind::Text(current) = &mut self.data_mut(id).kind {
            *current = data.into();
        }
    }

    /// Length in chars of a text node, 0 otherwise.
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |data| data.chars().count())
    }

    /// DOM node length: chars for text, child count for everything else.
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(data) => data.chars().count(),
            _ => self.child_count(id),
        }
    }

    // === Navigation ===

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).prev
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).next
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).last_child
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index)
    }

    /// Position of a node among its siblings.
    pub fn node_index(&self, id: NodeId) -> usize {
        let mut index = 0;
        let mut current = self.prev_sibling(id);
        while let Some(prev) = current {
            index += 1;
            current = self.prev_sibling(prev);
        }
        index
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Inclusive containment check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node hangs off the document node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.document(), id)
    }

    /// Descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.first_child(id),
        }
    }

    // === Mutation ===

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end.
    ///
    /// The child is detached from its current position first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if self.is_text(parent) {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "text nodes cannot have children",
            });
        }
        if self.node_type(child) == NodeType::Document {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "a document cannot be inserted",
            });
        }
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy {
                parent,
                child,
                reason: "a node cannot be inserted into itself or its descendant",
            });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, reference });
            }
        }

        let reference = match reference {
            Some(r) if r == child => self.next_sibling(child),
            other => other,
        };

        self.detach(child);

        let prev = match reference {
            Some(r) => self.prev_sibling(r),
            None => self.last_child(parent),
        };

        {
            let data = self.data_mut(child);
            data.parent = Some(parent);
            data.prev = prev;
            data.next = reference;
        }
        match prev {
            Some(p) => self.data_mut(p).next = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        match reference {
            Some(r) => self.data_mut(r).prev = Some(child),
            None => self.data_mut(parent).last_child = Some(child),
        }
        Ok(())
    }

    /// Detach a node from its parent. No-op for parentless nodes.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Replace a node with its own children, in order.
    ///
    /// No-op for parentless nodes.
    pub fn replace_with_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };
        while let Some(child) = self.first_child(id) {
            self.insert_before(parent, child, Some(id))?;
        }
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let prev = self.prev_sibling(id);
        let next = self.next_sibling(id);
        match prev {
            Some(p) => self.data_mut(p).next = next,
            None => self.data_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.data_mut(n).prev = prev,
            None => self.data_mut(parent).last_child = prev,
        }
        let data = self.data_mut(id);
        data.parent = None;
        data.prev = None;
        data.next = None;
    }
}

/// Iterator over a node's children.
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Iterator over a node's ancestors, nearest first.
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree, excluding its root.
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(next) = self.tree.next_sibling(node) {
                        break Some(next);
                    }
                    match self.tree.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}
