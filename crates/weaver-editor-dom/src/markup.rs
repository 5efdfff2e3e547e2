//! HTML fragments in and out of a [`Tree`].
//!
//! Reading goes through html5ever's tree builder, so a fragment gets the
//! shape a browser would give it: an open `<p>` is closed by the next one,
//! the newline right after `<pre>` is dropped, character references are
//! decoded. Comments, processing instructions and doctypes are dropped.
//! Unlike a browser, the first parse error fails the read, so a literal
//! never quietly turns into a different tree.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use html5ever::interface::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    Attribute as HtmlAttribute, ExpandedName, ParseOpts, QualName, expanded_name, local_name, namespace_url, ns,
};
use markdown_weaver_escape::{FmtWriter, StrWrite, escape_html, escape_html_body_text};

use crate::error::{DomError, MarkupError};
use crate::tree::{Attribute, NodeId, NodeKind, Tree};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Parse `src` into a fresh tree, under the document node.
pub fn parse_document(src: &str) -> Result<Tree, DomError> {
    let mut tree = Tree::new();
    let document = tree.document();
    parse_into(&mut tree, document, src)?;
    Ok(tree)
}

/// Parse `src` as the contents of a `<body>` and append the resulting nodes
/// to `parent`.
///
/// Returns the top-level nodes in order.
pub fn parse_into(tree: &mut Tree, parent: NodeId, src: &str) -> Result<Vec<NodeId>, DomError> {
    let sink = html5ever::parse_fragment(
        FragmentSink::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("body")),
        Vec::new(),
    )
    .one(src);

    if let Some((message, line)) = sink.error.take() {
        tracing::debug!(target: "weaver::dom", line, %message, "markup rejected");
        let line = usize::try_from(line).unwrap_or(usize::MAX);
        return Err(MarkupError::new(message, src, line).into());
    }

    // Fragment parsing hangs everything off a synthetic <html> root.
    let root = sink
        .document
        .children
        .borrow()
        .iter()
        .find(|child| matches!(child.data, ParsedData::Element { .. }))
        .cloned();
    let Some(root) = root else {
        return Ok(Vec::new());
    };

    let mut top_level = Vec::new();
    for child in root.children.borrow().iter() {
        if let Some(node) = build(tree, child)? {
            tree.append_child(parent, node)?;
            top_level.push(node);
        }
    }
    Ok(top_level)
}

/// Copy a parsed subtree into `tree` as a detached node.
fn build(tree: &mut Tree, parsed: &ParsedNode) -> Result<Option<NodeId>, DomError> {
    let node = match &parsed.data {
        ParsedData::Element { name, attrs } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute::new(&*attr.name.local, &*attr.value))
                .collect();
            tree.create_element_with_attrs(&*name.local, attrs)
        }
        ParsedData::Text(contents) => return Ok(Some(tree.create_text(&**contents.borrow()))),
        ParsedData::Document | ParsedData::Ignored => return Ok(None),
    };
    for child in parsed.children.borrow().iter() {
        if let Some(child) = build(tree, child)? {
            tree.append_child(node, child)?;
        }
    }
    Ok(Some(node))
}

type Handle = Rc<ParsedNode>;

/// Stand-in name for the (never expected) lookup of a non-element's name.
static UNNAMED: ExpandedName = expanded_name!("", "span");

#[derive(Debug)]
struct ParsedNode {
    data: ParsedData,
    parent: RefCell<Weak<ParsedNode>>,
    children: RefCell<Vec<Handle>>,
}

#[derive(Debug)]
enum ParsedData {
    Document,
    Element {
        name: QualName,
        attrs: RefCell<Vec<HtmlAttribute>>,
    },
    Text(RefCell<StrTendril>),
    /// Comments, processing instructions. Never attached.
    Ignored,
}

impl ParsedNode {
    fn new(data: ParsedData) -> Handle {
        Rc::new(Self {
            data,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    fn parent(&self) -> Option<Handle> {
        self.parent.borrow().upgrade()
    }
}

fn detach(node: &Handle) {
    if let Some(parent) = node.parent() {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    *node.parent.borrow_mut() = Weak::new();
}

fn position(parent: &Handle, before: Option<&Handle>) -> usize {
    let children = parent.children.borrow();
    before
        .and_then(|before| children.iter().position(|child| Rc::ptr_eq(child, before)))
        .unwrap_or(children.len())
}

/// Insert `child` into `parent` before `before`, or at the end.
///
/// Text joins a text node directly in front of the insertion point.
fn insert(parent: &Handle, child: NodeOrText<Handle>, before: Option<&Handle>) {
    let node = match child {
        NodeOrText::AppendNode(node) => {
            if matches!(node.data, ParsedData::Ignored) {
                return;
            }
            detach(&node);
            node
        }
        NodeOrText::AppendText(text) => {
            let index = position(parent, before);
            let previous = index
                .checked_sub(1)
                .and_then(|i| parent.children.borrow().get(i).cloned());
            if let Some(previous) = previous {
                if let ParsedData::Text(contents) = &previous.data {
                    contents.borrow_mut().push_tendril(&text);
                    return;
                }
            }
            ParsedNode::new(ParsedData::Text(RefCell::new(text)))
        }
    };
    let index = position(parent, before);
    *node.parent.borrow_mut() = Rc::downgrade(parent);
    parent.children.borrow_mut().insert(index, node);
}

/// Tree builder target for fragment parsing.
///
/// Records the first parse error along with the line it was reported on.
struct FragmentSink {
    document: Handle,
    line: Cell<u64>,
    error: RefCell<Option<(Cow<'static, str>, u64)>>,
}

impl Default for FragmentSink {
    fn default() -> Self {
        Self {
            document: ParsedNode::new(ParsedData::Document),
            line: Cell::new(1),
            error: RefCell::new(None),
        }
    }
}

impl TreeSink for FragmentSink {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = ExpandedName<'a>
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        let mut error = self.error.borrow_mut();
        if error.is_none() {
            *error = Some((msg, self.line.get()));
        }
    }

    fn set_current_line(&self, line_number: u64) {
        self.line.set(line_number);
    }

    fn get_document(&self) -> Handle {
        Rc::clone(&self.document)
    }

    fn elem_name<'a>(&self, target: &'a Handle) -> ExpandedName<'a> {
        match &target.data {
            ParsedData::Element { name, .. } => name.expanded(),
            _ => UNNAMED,
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<HtmlAttribute>, _: ElementFlags) -> Handle {
        ParsedNode::new(ParsedData::Element {
            name,
            attrs: RefCell::new(attrs),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        ParsedNode::new(ParsedData::Ignored)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        ParsedNode::new(ParsedData::Ignored)
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        insert(parent, child, None);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        if element.parent().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, _: StrTendril, _: StrTendril, _: StrTendril) {}

    // Template contents are kept as ordinary children.
    fn get_template_contents(&self, target: &Handle) -> Handle {
        Rc::clone(target)
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
        if let Some(parent) = sibling.parent() {
            insert(&parent, child, Some(sibling));
        }
    }

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<HtmlAttribute>) {
        if let ParsedData::Element { attrs: existing, .. } = &target.data {
            let mut existing = existing.borrow_mut();
            for attr in attrs {
                if !existing.iter().any(|e| e.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Handle) {
        detach(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let children = std::mem::take(&mut *node.children.borrow_mut());
        for child in children {
            *child.parent.borrow_mut() = Rc::downgrade(new_parent);
            new_parent.children.borrow_mut().push(child);
        }
    }

    fn is_mathml_annotation_xml_integration_point(&self, _handle: &Handle) -> bool {
        false
    }
}

/// Serialize the children of `node`.
pub fn inner_html(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = MarkupWriter::new(tree, FmtWriter(&mut out)).write_children(node);
    out
}

/// Serialize `node` itself. For documents and fragments this is the same as
/// [`inner_html`].
pub fn outer_html(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    let _ = write_html_fmt(&mut out, tree, node);
    out
}

/// Serialize `node` into any `fmt::Write` sink.
pub fn write_html_fmt<W: fmt::Write>(writer: W, tree: &Tree, node: NodeId) -> fmt::Result {
    MarkupWriter::new(tree, FmtWriter(writer)).write_node(node)
}

struct MarkupWriter<'t, W> {
    tree: &'t Tree,
    writer: W,
}

impl<'t, W: StrWrite> MarkupWriter<'t, W> {
    fn new(tree: &'t Tree, writer: W) -> Self {
        Self { tree, writer }
    }

    fn write_children(&mut self, node: NodeId) -> Result<(), W::Error> {
        let tree = self.tree;
        for child in tree.children(node) {
            self.write_node(child)?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: NodeId) -> Result<(), W::Error> {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Document | NodeKind::Fragment => self.write_children(node),
            NodeKind::Text(data) => escape_html_body_text(&mut self.writer, data),
            NodeKind::Element { tag, attrs } => {
                self.writer.write_str("<")?;
                self.writer.write_str(tag)?;
                for attr in attrs {
                    self.writer.write_str(" ")?;
                    self.writer.write_str(&attr.name)?;
                    self.writer.write_str("=\"")?;
                    escape_html(&mut self.writer, &attr.value)?;
                    self.writer.write_str("\"")?;
                }
                self.writer.write_str(">")?;
                if is_void(tag) {
                    return Ok(());
                }
                self.write_children(node)?;
                self.writer.write_str("</")?;
                self.writer.write_str(tag)?;
                self.writer.write_str(">")
            }
        }
    }
}
