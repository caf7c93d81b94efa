//! Markup tree model

use indexmap::IndexMap;

/// Parsed document: the document element plus whatever surrounds it
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Declaration, doctype, comments and PIs before the root
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and PIs after the root
    pub epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Take ownership of the first element named `name` in document order,
    /// the document element included, discarding the rest of the document.
    pub fn into_element(self, name: &str) -> Option<Element> {
        self.root.into_found(name)
    }
}

/// Element node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style child append
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Iterator over the direct element children
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Depth-first, pre-order search starting with `self`
    fn into_found(self, name: &str) -> Option<Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.into_iter().find_map(|node| match node {
            Node::Element(child) => child.into_found(name),
            _ => None,
        })
    }
}

/// Any node that can appear inside an element
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction { target: String, data: String },
    /// Raw declaration body after `<!DOCTYPE`
    Doctype(String),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}
