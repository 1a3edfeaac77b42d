//! Minimal namespace-aware XML element tree.
//!
//! The whole document is loaded into memory. Every element keeps its resolved
//! namespace URI and local name, so lookups are made against `(namespace, name)`
//! pairs rather than against whatever prefix the document happened to use.

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// An element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Text content preceding the first child element, untrimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// First direct child with the given qualified name.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(namespace, name))
    }

    /// All direct children with the given qualified name, in document order.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |child| child.is(namespace, name))
    }

    /// Trimmed text of the first matching child.
    ///
    /// Returns an empty string when the child is absent or has no text.
    pub fn child_text(&self, namespace: &str, name: &str) -> &str {
        self.find(namespace, name)
            .map(|child| child.text().trim())
            .unwrap_or("")
    }
}

/// Decode raw document bytes to text.
///
/// The encoding comes from a byte order mark if present, otherwise from the
/// `encoding` pseudo-attribute of the XML declaration, otherwise UTF-8.
/// Unknown encoding labels and byte sequences invalid for the chosen
/// encoding are errors.
pub fn decode_document(bytes: &[u8]) -> Result<String> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => match declared_encoding(bytes) {
            Some(label) => {
                let encoding = Encoding::for_label(label).ok_or_else(|| {
                    Error::XmlError(format!(
                        "unsupported encoding '{}'",
                        String::from_utf8_lossy(label)
                    ))
                })?;
                (encoding, bytes)
            }
            None => (UTF_8, bytes),
        },
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            Error::XmlError(format!("document is not valid {}", encoding.name()))
        })
}

/// Label in `<?xml ... encoding="..."?>`, read from the raw bytes.
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = &decl[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = skip_whitespace(&decl[at + 8..]).strip_prefix(b"=")?;
    let rest = skip_whitespace(rest);
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = rest.iter().position(|&b| b == quote)?;
    Some(&rest[..len])
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// Parse a complete XML document and return its root element.
///
/// Fails on malformed markup: mismatched or unclosed tags, unbound prefixes,
/// missing root element, content after the root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = NsReader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if root.is_some() {
                    return Err(Error::XmlError(
                        "content after the document element".to_string(),
                    ));
                }
                let element = Element {
                    namespace: resolve_namespace(resolved)?,
                    name: decode_name(e.local_name().as_ref())?,
                    text: String::new(),
                    children: Vec::new(),
                };
                if matches!(event, Event::Start(_)) {
                    stack.push(element);
                } else {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlError("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_error)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c)
                    .map_err(xml_error)?
                    .to_string();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::XmlError(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::XmlError("no document element found".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        // Only text before the first child counts as element text.
        Some(current) if current.children.is_empty() => current.text.push_str(text),
        Some(_) => {}
        None if text.trim().is_empty() => {}
        None => {
            return Err(Error::XmlError(
                "text outside the document element".to_string(),
            ))
        }
    }
    Ok(())
}

fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(decode_name(ns.as_ref())?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::XmlError(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn decode_name(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(xml_error)
}

fn xml_error<E: std::fmt::Display>(e: E) -> Error {
    Error::XmlError(e.to_string())
}
