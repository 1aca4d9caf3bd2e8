//! Immutable XML tree model
//!
//! Trees are plain owned values: an [`Element`] owns its attributes and
//! children, so trees are finite and acyclic by construction. The comparison
//! engine only ever borrows them.

use std::fmt;

/// One node of a document tree
///
/// `Element::children` never holds [`Node::Attribute`]; attributes live in
/// `Element::attributes`. The variant exists so that diff values and query
/// results can carry a detached attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Attribute(Attribute),
    Text(String),
    CData(String),
}

/// An element with a qualified name, ordered attributes and ordered children
///
/// `Clone` and `Drop` walk the tree with an explicit stack, so arbitrarily
/// deep trees can be copied and released.
#[derive(Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::CData(text.into()));
        self
    }

    /// Value of the attribute with the given qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenation of the direct text and CDATA children
    pub fn direct_text(&self) -> String {
        self.children
            .iter()
            .filter_map(Node::as_text)
            .collect::<String>()
    }

    /// Copy of the name and attributes without any children
    fn shallow_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    /// XPath string-value: all descendant text in document order
    pub fn string_value(&self) -> String {
        let mut value = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Element(element) => stack.extend(element.children.iter().rev()),
                Node::Text(text) | Node::CData(text) => value.push_str(text),
                Node::Attribute(_) => {}
            }
        }
        value
    }
}

impl Clone for Element {
    fn clone(&self) -> Self {
        let mut stack = vec![(self.shallow_copy(), self.children.iter())];
        let mut completed = None;

        while let Some((copy, children)) = stack.last_mut() {
            match children.next() {
                Some(Node::Element(child)) => stack.push((child.shallow_copy(), child.children.iter())),
                Some(other) => copy.children.push(other.clone()),
                None => {
                    if let Some((done, _)) = stack.pop() {
                        match stack.last_mut() {
                            Some((parent, _)) => parent.children.push(Node::Element(done)),
                            None => completed = Some(done),
                        }
                    }
                }
            }
        }
        completed.unwrap_or_else(|| self.shallow_copy())
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            // Each element is emptied before it goes out of scope.
            if let Node::Element(mut element) = node {
                pending.append(&mut element.children);
            }
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text content of a Text or CDATA node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) | Node::CData(text) => Some(text),
            _ => None,
        }
    }

    pub fn string_value(&self) -> String {
        match self {
            Node::Element(element) => element.string_value(),
            Node::Attribute(attribute) => attribute.value.clone(),
            Node::Text(text) | Node::CData(text) => text.clone(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Attribute> for Node {
    fn from(attribute: Attribute) -> Self {
        Node::Attribute(attribute)
    }
}

/// A borrowed view of a node inside a tree, as produced by path queries
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Element(&'a Element),
    Attribute(&'a Attribute),
    Text(&'a String),
    CData(&'a String),
}

impl<'a> NodeRef<'a> {
    pub fn from_node(node: &'a Node) -> Self {
        match node {
            Node::Element(element) => NodeRef::Element(element),
            Node::Attribute(attribute) => NodeRef::Attribute(attribute),
            Node::Text(text) => NodeRef::Text(text),
            Node::CData(text) => NodeRef::CData(text),
        }
    }

    pub fn as_element(&self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn string_value(&self) -> String {
        match self {
            NodeRef::Element(element) => element.string_value(),
            NodeRef::Attribute(attribute) => attribute.value.clone(),
            NodeRef::Text(text) | NodeRef::CData(text) => (*text).clone(),
        }
    }

    /// Detached copy of the referenced node
    pub fn to_node(&self) -> Node {
        match self {
            NodeRef::Element(element) => Node::Element((*element).clone()),
            NodeRef::Attribute(attribute) => Node::Attribute((*attribute).clone()),
            NodeRef::Text(text) => Node::Text((*text).clone()),
            NodeRef::CData(text) => Node::CData((*text).clone()),
        }
    }

    /// Address of the referenced value, used for identity within one tree
    pub(crate) fn address(&self) -> usize {
        match self {
            NodeRef::Element(element) => *element as *const Element as usize,
            NodeRef::Attribute(attribute) => *attribute as *const Attribute as usize,
            NodeRef::Text(text) | NodeRef::CData(text) => *text as *const String as usize,
        }
    }

    /// Whether both views point at the very same node
    pub fn same_node(&self, other: &NodeRef<'_>) -> bool {
        self.address() == other.address()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Element(element) => write_element(f, element),
            NodeRef::Attribute(attribute) => write_attribute(f, attribute),
            NodeRef::Text(text) => write_escaped(f, text, false),
            NodeRef::CData(text) => write!(f, "<![CDATA[{}]]>", text),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        NodeRef::from_node(self).fmt(f)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self)
    }
}

enum Frame<'a> {
    Open(&'a Element),
    Close(&'a Element),
    Leaf(&'a Node),
}

// Iterative so that rendering a deep unpaired subtree cannot exhaust the stack.
fn write_element(f: &mut fmt::Formatter<'_>, root: &Element) -> fmt::Result {
    let mut stack = vec![Frame::Open(root)];
    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Open(element) => {
                write!(f, "<{}", element.name)?;
                for attribute in &element.attributes {
                    f.write_str(" ")?;
                    write_attribute(f, attribute)?;
                }
                if element.children.is_empty() {
                    f.write_str("/>")?;
                    continue;
                }
                f.write_str(">")?;
                stack.push(Frame::Close(element));
                for child in element.children.iter().rev() {
                    match child {
                        Node::Element(child) => stack.push(Frame::Open(child)),
                        other => stack.push(Frame::Leaf(other)),
                    }
                }
            }
            Frame::Close(element) => write!(f, "</{}>", element.name)?,
            Frame::Leaf(node) => match node {
                Node::Text(text) => write_escaped(f, text, false)?,
                Node::CData(text) => write!(f, "<![CDATA[{}]]>", text)?,
                Node::Attribute(attribute) => write_attribute(f, attribute)?,
                Node::Element(element) => write_element(f, element)?,
            },
        }
    }
    Ok(())
}

fn write_attribute(f: &mut fmt::Formatter<'_>, attribute: &Attribute) -> fmt::Result {
    write!(f, "{}=\"", attribute.name)?;
    write_escaped(f, &attribute.value, true)?;
    f.write_str("\"")
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, in_attribute: bool) -> fmt::Result {
    for c in text.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' if in_attribute => f.write_str("&quot;")?,
            _ => write!(f, "{}", c)?,
        }
    }
    Ok(())
}
