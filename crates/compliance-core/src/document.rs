//! Minimal navigable element tree over a `.nessus` XML document.
//!
//! Elements are keyed by local name, so `cm:compliance-result` is found as
//! `compliance-result`. Text and CDATA content is unescaped and concatenated
//! per element.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::{ComplianceError, Result};

/// One XML element with its attributes, text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A parsed scan export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDocument {
    root: Element,
}

impl ScanDocument {
    /// Read and parse a scan file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_bytes(path).map(|(doc, _)| doc)
    }

    /// Like [`load`](Self::load), also handing back the raw file bytes.
    pub fn load_with_bytes(path: &Path) -> Result<(Self, Vec<u8>)> {
        let bytes = std::fs::read(path).map_err(|source| ComplianceError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::parse(&bytes).map_err(|e| e.with_path(path))?;
        Ok((doc, bytes))
    }

    /// Parse XML bytes. Any well-formedness problem is a
    /// [`ComplianceError::Parse`] with an empty path.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    return Err(parse_error(format!(
                        "{} (near byte {})",
                        e,
                        reader.buffer_position()
                    )))
                }
            };

            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_error("closing tag without an open element"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| parse_error(format!("bad text content: {e}")))?;
                    match stack.last_mut() {
                        Some(open) => open.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(parse_error("text outside of the root element")),
                    }
                }
                Event::CData(cdata) => {
                    let raw = cdata.into_inner();
                    match stack.last_mut() {
                        Some(open) => open.text.push_str(&String::from_utf8_lossy(&raw)),
                        None => return Err(parse_error("CDATA outside of the root element")),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(parse_error(format!(
                "unexpected end of document: <{}> is not closed",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| parse_error("document has no root element"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(format!("bad attribute on <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(format!("bad attribute value on <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        ..Element::default()
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(parse_error(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn parse_error(detail: impl Into<String>) -> ComplianceError {
    ComplianceError::Parse {
        path: PathBuf::new(),
        detail: detail.into(),
    }
}
