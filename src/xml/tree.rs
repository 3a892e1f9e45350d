//! Namespace-aware element tree.

use std::fmt;

/// Qualified name: namespace URI plus local name.
///
/// Prefixes are not part of the identity; two names written with different
/// prefixes bound to the same URI compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, `None` for names in no namespace.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Create a name inside a namespace.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Create a name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Check against a namespace URI and local name without allocating.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) made on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix, `None` for the default namespace.
    pub prefix: Option<String>,
    /// Bound URI (empty string undeclares the default namespace).
    pub uri: String,
}

/// An attribute on an element.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Qualified name of the attribute.
    pub name: QName,
    /// Prefix the attribute was written with.
    pub prefix: Option<String>,
    /// Unescaped value.
    pub value: String,
}

/// A child node of an element.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl Node {
    /// Text that only exists to indent markup.
    pub(crate) fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.chars().all(char::is_whitespace))
    }
}

/// An element of the markup tree.
#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified name of the element.
    pub name: QName,
    /// Prefix the element was written with.
    pub prefix: Option<String>,
    /// Namespace declarations made on this element.
    pub namespaces: Vec<NamespaceDecl>,
    attributes: Vec<Attribute>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            prefix: None,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute value by qualified name.
    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == local && a.name.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing one with the same qualified
    /// name. Returns the previous value.
    pub fn set_attribute(&mut self, attr: Attribute) -> Option<String> {
        match self.attributes.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, attr.value)),
            None => {
                self.attributes.push(attr);
                None
            }
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.name.is(namespace, local))
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// First descendant element with the given name.
    pub fn find(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.descendants().find(|el| el.name.is(namespace, local))
    }

    /// Mutable access to the first descendant element with the given name.
    pub fn find_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
        for node in self.children.iter_mut() {
            if let Node::Element(el) = node {
                if el.name.is(namespace, local) {
                    return Some(el);
                }
                if let Some(found) = el.find_mut(namespace, local) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Visit this element and every descendant in document order.
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for node in self.children.iter_mut() {
            if let Node::Element(el) = node {
                el.walk_mut(f);
            }
        }
    }

    /// Concatenation of every text node below this element.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
    }

    fn has_markup_children(&self) -> bool {
        self.children
            .iter()
            .any(|node| !matches!(node, Node::Text(_)))
    }

    /// Children that carry meaning: indentation-only text between child
    /// markup is left out.
    pub(crate) fn significant_children(&self) -> impl Iterator<Item = &Node> {
        let mixed = self.has_markup_children();
        self.children
            .iter()
            .filter(move |node| !(mixed && node.is_blank_text()))
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(child) => collect_text(child, out),
            _ => {}
        }
    }
}

/// Structural equality: names, attributes and significant children.
/// Prefixes, namespace declarations and indentation are ignored.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name || self.attributes.len() != other.attributes.len() {
            return false;
        }
        let same_attrs = self
            .attributes
            .iter()
            .all(|a| other.attribute(a.name.namespace.as_deref(), &a.name.local) == Some(a.value.as_str()));
        same_attrs && self.significant_children().eq(other.significant_children())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a == b,
            (Node::Comment(a), Node::Comment(b)) => a == b,
            (Node::ProcessingInstruction(a), Node::ProcessingInstruction(b)) => a == b,
            _ => false,
        }
    }
}

/// Depth-first iterator over descendant elements.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// A parsed XML part: optional declaration data plus the root element.
#[derive(Debug, Clone)]
pub struct Document {
    /// Value of the `standalone` pseudo-attribute of the declaration.
    pub standalone: Option<String>,
    /// Comments and processing instructions before the root element.
    pub prolog: Vec<Node>,
    /// The document element.
    pub root: Element,
    /// Comments and processing instructions after the root element.
    pub epilog: Vec<Node>,
}

impl Document {
    /// A document with only a root element.
    pub fn new(root: Element) -> Self {
        Self {
            standalone: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.prolog == other.prolog && self.root == other.root && self.epilog == other.epilog
    }
}
