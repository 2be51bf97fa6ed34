//! Owned element subtrees used as insert payloads.

use super::document::Attribute;

/// A detached, owned element with its subtree.
///
/// Fragments carry the content of insert edits. They are either copied out of
/// a parsed document with [`ElementRef::to_fragment`](super::ElementRef::to_fragment)
/// or built directly:
///
/// ```
/// use iedimport_core::scl::Fragment;
///
/// let subnetwork = Fragment::new("SubNetwork")
///     .with_attribute("name", "StationBus")
///     .with_child(Fragment::new("ConnectedAP").with_attribute("iedName", "IED1"));
/// assert_eq!(subnetwork.child_elements().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<FragmentNode>,
}

/// A child of a [`Fragment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentNode {
    /// Nested element
    Element(Fragment),
    /// Character data, stored escaped
    Text(String),
    /// CDATA section content
    CData(String),
    /// Comment content
    Comment(String),
}

impl Fragment {
    /// Creates an element without attributes or children
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        attributes: Vec<Attribute>,
        children: Vec<FragmentNode>,
    ) -> Self {
        Self {
            name,
            attributes,
            children,
        }
    }

    /// Sets an attribute, replacing an existing value
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child element
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(FragmentNode::Element(child));
        self
    }

    /// Appends an escaped text node
    #[must_use]
    pub fn with_text(mut self, escaped: impl Into<String>) -> Self {
        self.children.push(FragmentNode::Text(escaped.into()));
        self
    }

    /// Sets an attribute, replacing an existing value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|a| a.name == name) {
            existing.value = value;
        } else {
            self.attributes.push(Attribute { name, value });
        }
    }

    /// Appends a child element
    pub fn push_child(&mut self, child: Self) {
        self.children.push(FragmentNode::Element(child));
    }

    /// Qualified element name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without namespace prefix
    pub fn local_name(&self) -> &str {
        super::document::local_part(&self.name)
    }

    /// Returns the (unescaped) value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// All child nodes
    pub fn children(&self) -> &[FragmentNode] {
        &self.children
    }

    /// Child elements only
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            FragmentNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Counts this element and all nested elements
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self
            .child_elements()
            .map(Self::element_count)
            .sum::<usize>()
    }
}
