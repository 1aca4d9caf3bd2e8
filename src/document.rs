//! Builds comparison trees from XML text and files

use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;
use crate::node::{Attribute, Element, Node};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Deepest element nesting accepted by [`parse_str`], the root being level 1
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parses an XML document into an owned tree rooted at its document element
///
/// Names keep the prefix they were written with. Comments and processing
/// instructions are dropped. Documents nested deeper than
/// [`MAX_NESTING_DEPTH`] are rejected before the XML parser sees them.
pub fn parse_str(text: &str) -> Result<Element, DocumentError> {
    check_nesting(text, MAX_NESTING_DEPTH)?;
    let document = roxmltree::Document::parse(text)?;
    Ok(convert(document.root_element()))
}

/// Reads and parses an XML file
pub async fn load(path: impl AsRef<Path>) -> Result<Element, DocumentError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded document");

    parse_str(&text).map_err(|error| match error {
        DocumentError::Syntax(source) => DocumentError::FileSyntax {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Counts open start tags without building anything
///
/// Markup that cannot open an element (comments, CDATA sections, processing
/// instructions and declarations) is skipped. Malformed input is left for the
/// parser to reject.
fn check_nesting(text: &str, limit: usize) -> Result<(), DocumentError> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut position = 0;

    while let Some(offset) = text[position..].find('<') {
        let start = position + offset;
        let rest = &text[start..];
        position = if rest.starts_with("<!--") {
            skip_past(text, start, "-->")
        } else if rest.starts_with("<![CDATA[") {
            skip_past(text, start, "]]>")
        } else if rest.starts_with("<?") {
            skip_past(text, start, "?>")
        } else if rest.starts_with("<!") {
            skip_past(text, start, ">")
        } else if rest.starts_with("</") {
            depth = depth.saturating_sub(1);
            skip_past(text, start, ">")
        } else {
            let end = tag_end(bytes, start + 1);
            if end < bytes.len() && bytes[end - 1] != b'/' {
                depth += 1;
                if depth > limit {
                    return Err(DocumentError::NestingTooDeep { limit });
                }
            }
            end + 1
        };
        if position >= text.len() {
            break;
        }
    }
    Ok(())
}

fn skip_past(text: &str, from: usize, terminator: &str) -> usize {
    text[from..]
        .find(terminator)
        .map_or(text.len(), |offset| from + offset + terminator.len())
}

/// Index of the `>` closing a start tag, honouring quoted attribute values
fn tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote = None;
    for (index, &byte) in bytes.iter().enumerate().skip(from) {
        match (quote, byte) {
            (Some(open), _) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return index,
            (None, _) => {}
        }
    }
    bytes.len()
}

fn convert(root: roxmltree::Node<'_, '_>) -> Element {
    let mut stack = vec![(shell(root), root.children())];
    let mut completed = None;

    while let Some((element, children)) = stack.last_mut() {
        match children.next() {
            Some(child) if child.is_element() => {
                stack.push((shell(child), child.children()));
            }
            Some(child) => {
                if child.is_text()
                    && let Some(text) = child.text()
                {
                    element.children.push(Node::Text(text.to_string()));
                }
            }
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
    completed.unwrap_or_else(|| shell(root))
}

fn shell(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(qualified_name(node, tag.name(), tag.namespace()));
    element.attributes = node
        .attributes()
        .map(|attribute| {
            Attribute::new(
                qualified_name(node, attribute.name(), attribute.namespace()),
                attribute.value(),
            )
        })
        .collect();
    element
}

fn qualified_name(node: roxmltree::Node<'_, '_>, local: &str, namespace: Option<&str>) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri).filter(|prefix| !prefix.is_empty()),
        None => None,
    };
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}
