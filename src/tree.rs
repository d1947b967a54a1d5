use indexmap::IndexMap;
use thiserror::Error;

use crate::value::Value;

/// Violations of the text/children exclusivity of an element.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("can't add a child to an element whose text is set")]
    ChildWithText,
    #[error("can't set text on an element with children")]
    TextWithChildren,
    #[error("text is already set")]
    TextAlreadySet,
}

/// Index of an element inside its [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single XML element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, Value>,
    /// Per-attribute diagnostics (the `Raw:` literal of the dump). Never rendered.
    pub attribute_annotations: IndexMap<String, Option<String>>,
    /// Prefix to URI, rendered as `xmlns:<prefix>="<uri>"`.
    pub namespaces: IndexMap<String, String>,
    pub text: Option<String>,
    pub metadata: IndexMap<String, Value>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            attribute_annotations: IndexMap::new(),
            namespaces: IndexMap::new(),
            text: None,
            metadata: IndexMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

/// Arena holding every element of a document.
///
/// Elements own their children through index lists; the parent link is a
/// plain index used for traversal only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlTree {
    nodes: Vec<Element>,
    root: Option<NodeId>,
}

impl XmlTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag));
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn get(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0]
    }

    /// The root element, if the document has one.
    pub fn root_element(&self) -> Option<&Element> {
        self.root.map(|id| self.get(id))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Element> {
        self.get(id).children.iter().map(|child| self.get(*child))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.get(parent).text.is_some() {
            return Err(TreeError::ChildWithText);
        }
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
        Ok(())
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        let element = self.get_mut(id);
        if !element.children.is_empty() {
            return Err(TreeError::TextWithChildren);
        }
        if element.has_text() {
            return Err(TreeError::TextAlreadySet);
        }
        element.text = Some(text.to_string());
        Ok(())
    }

    /// Sets an attribute; writing an existing key replaces its value in place.
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: impl Into<Value>) {
        self.get_mut(id).attributes.insert(key.to_string(), value.into());
    }

    pub fn set_attribute_annotation(&mut self, id: NodeId, key: &str, annotation: Option<String>) {
        self.get_mut(id)
            .attribute_annotations
            .insert(key.to_string(), annotation);
    }

    pub fn add_namespace(&mut self, id: NodeId, prefix: &str, uri: &str) {
        self.get_mut(id)
            .namespaces
            .insert(prefix.to_string(), uri.to_string());
    }

    pub fn set_metadata(&mut self, id: NodeId, key: &str, value: impl Into<Value>) {
        self.get_mut(id).metadata.insert(key.to_string(), value.into());
    }

    /// Serializes the subtree rooted at `id`.
    pub fn render(&self, id: NodeId, depth: usize, indent: usize) -> String {
        let mut out = String::new();
        self.write_element(&mut out, id, depth, indent);
        out
    }

    /// Serializes the whole document, or returns an empty string when it has no root.
    pub fn to_xml(&self, indent: usize) -> String {
        self.root
            .map(|root| self.render(root, 0, indent))
            .unwrap_or_default()
    }

    fn write_element(&self, out: &mut String, id: NodeId, depth: usize, indent: usize) {
        let element = self.get(id);
        let padding = " ".repeat(depth * indent);

        out.push_str(&padding);
        out.push('<');
        out.push_str(&element.tag);
        // Values are written verbatim, without entity escaping.
        for (prefix, uri) in &element.namespaces {
            out.push_str(&format!(" xmlns:{prefix}=\"{uri}\""));
        }
        for (key, value) in &element.attributes {
            out.push_str(&format!(" {key}=\"{value}\""));
        }

        if element.has_text() {
            let text = element.text.as_deref().unwrap_or_default();
            out.push_str(&format!(">{text}</{}>", element.tag));
        } else if element.children.is_empty() {
            out.push_str(" />");
        } else {
            out.push('>');
            for child in &element.children {
                out.push('\n');
                self.write_element(out, *child, depth + 1, indent);
            }
            out.push('\n');
            out.push_str(&padding);
            out.push_str(&format!("</{}>", element.tag));
        }
    }
}

/// Renders a whole document; shorthand for [`XmlTree::to_xml`].
pub fn render(tree: &XmlTree, indent: usize) -> String {
    tree.to_xml(indent)
}
