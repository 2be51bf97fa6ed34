//! Arena-backed SCL element tree.
//!
//! Parsing follows the event loop used by the XML importers: a `quick-xml`
//! reader is driven to the end of input and every start, empty, text, CDATA
//! and comment event becomes a node. Nodes live in one arena and are addressed
//! by [`NodeId`]; detaching a node keeps its slot so hosts can undo removals.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{EditError, SclError, SclResult};

use super::fragment::{Fragment, FragmentNode};

/// Address of a node inside one [`SclDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a node id from an arena index (used by hosts and tests)
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single attribute with its unescaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name
    pub name: String,
    /// Unescaped value
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    /// Escaped character data
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A parsed SCL (or any XML) document.
#[derive(Debug, Clone)]
pub struct SclDocument {
    nodes: Vec<Node>,
    root: NodeId,
}

/// Returns the part of a qualified name after the namespace prefix.
pub(crate) fn local_part(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

impl SclDocument {
    /// Parses markup into a document.
    ///
    /// Whitespace-only text between elements is dropped; other text is kept
    /// verbatim (still escaped). A leading UTF-8 byte order mark is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is not well formed, has no root element,
    /// has content outside the root element, or ends inside an element.
    pub fn parse(text: &str) -> SclResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(text);

        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|err| SclError::Malformed {
                position: reader.buffer_position() as u64,
                reason: err.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    builder.flush_text(position, false)?;
                    let id = builder.push_element(element_kind(&start)?, position)?;
                    builder.open.push(id);
                }
                Event::Empty(start) => {
                    builder.flush_text(position, false)?;
                    builder.push_element(element_kind(&start)?, position)?;
                }
                Event::End(_) => {
                    builder.flush_text(position, true)?;
                    if builder.open.pop().is_none() {
                        return Err(SclError::Malformed {
                            position,
                            reason: "closing tag without matching opening tag".to_string(),
                        });
                    }
                }
                Event::Text(chars) => builder.pending.push_str(&String::from_utf8_lossy(&chars)),
                Event::GeneralRef(reference) => {
                    builder.pending.push('&');
                    builder
                        .pending
                        .push_str(&String::from_utf8_lossy(&reference));
                    builder.pending.push(';');
                }
                Event::CData(data) => {
                    builder.flush_text(position, false)?;
                    let content = String::from_utf8_lossy(&data).into_owned();
                    builder.push_leaf(NodeKind::CData(content), position)?;
                }
                Event::Comment(comment) => {
                    builder.flush_text(position, false)?;
                    let content = String::from_utf8_lossy(&comment).into_owned();
                    // Comments outside the root element are not kept
                    if !builder.open.is_empty() {
                        builder.push_leaf(NodeKind::Comment(content), position)?;
                    }
                }
                Event::Eof => break,
                _ => {} // Skip Decl, PI, DocType
            }
        }

        builder.finish(reader.buffer_position() as u64)
    }

    /// Id of the root element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// View of the root element
    #[must_use]
    pub fn root_element(&self) -> ElementRef<'_> {
        self.view(self.root)
            .unwrap_or_else(|| unreachable!("root is always an element"))
    }

    /// Returns a view of the element with the given id
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.view(id)
    }

    /// Returns true if the id addresses a node of this document
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Returns true if the node is reachable from the root element
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(current.0).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Parent of a node, if attached to one
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// All child node ids (elements, text, comments) of a node
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Index of a node within its parent's children
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Returns the escaped text of a text node
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Text(text) | NodeKind::CData(text) => Some(text),
            _ => None,
        }
    }

    /// Finds the first child element of `scope` named `tag` whose attribute
    /// `attribute` equals `value` (`None` matches a missing attribute).
    #[must_use]
    pub fn find_child(
        &self,
        scope: NodeId,
        tag: &str,
        attribute: &str,
        value: Option<&str>,
    ) -> Option<ElementRef<'_>> {
        self.element(scope)?
            .child_elements()
            .find(|child| child.local_name() == tag && child.attribute(attribute) == value)
    }

    /// Finds every descendant element of `scope` named `tag` whose attribute
    /// `attribute` equals `value` (`None` matches a missing attribute).
    #[must_use]
    pub fn find_by_tag_and_attribute(
        &self,
        scope: NodeId,
        tag: &str,
        attribute: &str,
        value: Option<&str>,
    ) -> Vec<ElementRef<'_>> {
        self.find_descendants(scope, tag)
            .into_iter()
            .filter(|element| element.attribute(attribute) == value)
            .collect()
    }

    /// Finds every descendant element of `scope` named `tag`, in document order
    #[must_use]
    pub fn find_descendants(&self, scope: NodeId, tag: &str) -> Vec<ElementRef<'_>> {
        self.element(scope)
            .map(|element| {
                element
                    .descendants()
                    .into_iter()
                    .filter(|d| d.local_name() == tag)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Builds a fragment from `fragment` and attaches it to `parent` at `index`
    /// (clamped to the number of children). Returns the id of the new element.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or not an element.
    pub fn attach(
        &mut self,
        parent: NodeId,
        index: usize,
        fragment: &Fragment,
    ) -> Result<NodeId, EditError> {
        self.ensure_element(parent)?;
        let node = self.build(fragment, None);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
        Ok(node)
    }

    /// Detaches a node from its parent, returning the parent and the index the
    /// node occupied. The node and its subtree keep their ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown, is the root, or has no parent.
    pub fn detach(&mut self, node: NodeId) -> Result<(NodeId, usize), EditError> {
        if !self.contains(node) {
            return Err(EditError::UnknownNode(node));
        }
        if node == self.root {
            return Err(EditError::RemoveRoot);
        }
        let parent = self.nodes[node.0]
            .parent
            .ok_or(EditError::Detached(node))?;
        let children = &mut self.nodes[parent.0].children;
        let index = children
            .iter()
            .position(|child| *child == node)
            .ok_or(EditError::Detached(node))?;
        children.remove(index);
        self.nodes[node.0].parent = None;
        Ok((parent, index))
    }

    /// Re-attaches a previously detached node to `parent` at `index`
    /// (clamped to the number of children).
    ///
    /// # Errors
    ///
    /// Returns an error if either node is unknown, the node is still attached,
    /// `parent` is not an element, or `parent` lies inside the node's subtree.
    pub fn reattach(&mut self, node: NodeId, parent: NodeId, index: usize) -> Result<(), EditError> {
        if !self.contains(node) {
            return Err(EditError::UnknownNode(node));
        }
        self.ensure_element(parent)?;
        if self.nodes[node.0].parent.is_some() || node == self.root {
            return Err(EditError::AlreadyAttached(node));
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == node {
                return Err(EditError::Cycle(node));
            }
            ancestor = self.nodes[current.0].parent;
        }

        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
        Ok(())
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn ensure_element(&self, id: NodeId) -> Result<(), EditError> {
        match self.nodes.get(id.0) {
            None => Err(EditError::UnknownNode(id)),
            Some(Node {
                kind: NodeKind::Element { .. },
                ..
            }) => Ok(()),
            Some(_) => Err(EditError::NotAnElement(id)),
        }
    }

    fn build(&mut self, fragment: &Fragment, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Element {
                name: fragment.name().to_string(),
                attributes: fragment.attributes().to_vec(),
            },
            parent,
            children: Vec::new(),
        });

        for child in fragment.children() {
            let child_id = match child {
                FragmentNode::Element(element) => self.build(element, Some(id)),
                FragmentNode::Text(text) => self.push_leaf(NodeKind::Text(text.clone()), id),
                FragmentNode::CData(data) => self.push_leaf(NodeKind::CData(data.clone()), id),
                FragmentNode::Comment(text) => {
                    self.push_leaf(NodeKind::Comment(text.clone()), id)
                }
            };
            self.nodes[id.0].children.push(child_id);
        }

        id
    }

    fn push_leaf(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        id
    }

    fn view(&self, id: NodeId) -> Option<ElementRef<'_>> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { name, attributes } => Some(ElementRef {
                doc: self,
                id,
                name,
                attributes,
            }),
            _ => None,
        }
    }
}

/// Collects reader events into an arena.
#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
    pending: String,
}

impl TreeBuilder {
    fn push_element(&mut self, kind: NodeKind, position: u64) -> SclResult<NodeId> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(SclError::TrailingContent { position });
        }
        let id = self.push_node(kind);
        if self.root.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }

    fn push_leaf(&mut self, kind: NodeKind, position: u64) -> SclResult<NodeId> {
        if self.open.is_empty() {
            return Err(SclError::TrailingContent { position });
        }
        Ok(self.push_node(kind))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.open.last().copied();
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Turns accumulated text into a node. A whitespace-only run is kept
    /// only when `closing` and it is the sole content of the open element.
    fn flush_text(&mut self, position: u64, closing: bool) -> SclResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending);
        if text.trim().is_empty() {
            let sole_content = closing
                && self
                    .open
                    .last()
                    .is_some_and(|open| self.nodes[open.0].children.is_empty());
            if !sole_content {
                return Ok(());
            }
        }
        self.push_leaf(NodeKind::Text(text), position)?;
        Ok(())
    }

    fn finish(mut self, position: u64) -> SclResult<SclDocument> {
        self.flush_text(position, false)?;

        if let Some(open) = self.open.last() {
            let name = match &self.nodes[open.0].kind {
                NodeKind::Element { name, .. } => name.clone(),
                _ => String::new(),
            };
            return Err(SclError::UnclosedElement(name));
        }

        let root = self.root.ok_or(SclError::MissingRoot)?;
        Ok(SclDocument {
            nodes: self.nodes,
            root,
        })
    }
}

fn element_kind(start: &BytesStart<'_>) -> SclResult<NodeKind> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|err| SclError::InvalidAttribute {
            attribute: name.clone(),
            reason: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|err| SclError::InvalidAttribute {
                attribute: key.clone(),
                reason: err.to_string(),
            })?
            .into_owned();
        attributes.push(Attribute { name: key, value });
    }

    Ok(NodeKind::Element { name, attributes })
}

/// Borrowed view of one element of a [`SclDocument`]
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a SclDocument,
    id: NodeId,
    name: &'a str,
    attributes: &'a [Attribute],
}

impl<'a> ElementRef<'a> {
    /// Node id of this element
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Owning document
    #[must_use]
    pub const fn document(&self) -> &'a SclDocument {
        self.doc
    }

    /// Qualified element name
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Element name without namespace prefix
    #[must_use]
    pub fn local_name(&self) -> &'a str {
        local_part(self.name)
    }

    /// Unescaped attribute value, `None` when absent
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All attributes in document order
    #[must_use]
    pub const fn attributes(&self) -> &'a [Attribute] {
        self.attributes
    }

    /// Parent element
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.doc.parent(self.id).and_then(|p| self.doc.element(p))
    }

    /// Returns true if the element is reachable from the root
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.doc.is_attached(self.id)
    }

    /// Child elements in document order
    pub fn child_elements(self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id)
            .iter()
            .filter_map(move |child| doc.element(*child))
    }

    /// Child elements with the given local name
    pub fn children_named<'t>(self, tag: &'t str) -> impl Iterator<Item = ElementRef<'a>> + 't
    where
        'a: 't,
    {
        self.child_elements()
            .filter(move |child| child.local_name() == tag)
    }

    /// All descendant elements in document order, excluding `self`
    #[must_use]
    pub fn descendants(&self) -> Vec<ElementRef<'a>> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.doc.children(self.id).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            if let Some(element) = self.doc.element(id) {
                found.push(element);
                stack.extend(self.doc.children(id).iter().rev().copied());
            }
        }

        found
    }

    /// Concatenated escaped text of the direct text children
    #[must_use]
    pub fn text(&self) -> String {
        self.doc
            .children(self.id)
            .iter()
            .filter_map(|child| self.doc.text(*child))
            .collect()
    }

    /// Deep copy of this element as a detached fragment
    #[must_use]
    pub fn to_fragment(&self) -> Fragment {
        let children = self
            .doc
            .children(self.id)
            .iter()
            .filter_map(|child| {
                let node = self.doc.node(*child)?;
                Some(match &node.kind {
                    NodeKind::Element { .. } => {
                        FragmentNode::Element(self.doc.element(*child)?.to_fragment())
                    }
                    NodeKind::Text(text) => FragmentNode::Text(text.clone()),
                    NodeKind::CData(data) => FragmentNode::CData(data.clone()),
                    NodeKind::Comment(text) => FragmentNode::Comment(text.clone()),
                })
            })
            .collect();

        Fragment::from_parts(self.name.to_string(), self.attributes.to_vec(), children)
    }
}
