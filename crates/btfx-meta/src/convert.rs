//! XML to metadata-structure conversion, with a repair fallback.
//!
//! The primary path is a strict event parse. When that fails (embedded XML
//! blocks are frequently truncated, padded with NULs, or simply sloppy), a
//! best-effort repair appends missing closing tags and the parse is retried
//! once. A second failure degrades to an empty mapping rather than an error.

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::node::{MetadataMap, MetadataNode};
use crate::{Error, Result};

/// Convert XML text into a [`MetadataNode`].
///
/// Never fails: a parse failure triggers the repair path, and a repair
/// failure yields an empty mapping. Diagnostics go to stderr.
pub fn to_structure(xml: &str) -> MetadataNode {
    match parse_structure(xml) {
        Ok(node) => node,
        Err(err) => {
            eprintln!("XML parsing error: {err}");

            match parse_structure(&repair_xml(xml)) {
                Ok(node) => node,
                Err(_) => {
                    eprintln!("Failed to parse XML even after repair");
                    MetadataNode::empty_map()
                }
            }
        }
    }
}

/// Strict single-pass conversion.
pub fn parse_structure(xml: &str) -> Result<MetadataNode> {
    let root = parse_tree(xml)?;
    Ok(element_to_node(&root))
}

/// Attempt to repair malformed XML text.
///
/// Strips NUL bytes, prepends a declaration if missing, then appends a
/// closing tag for every opening tag whose closer appears nowhere in the
/// text, in reverse document order. The absence check ignores nesting, so
/// repeated tag names at different depths can still produce invalid nesting;
/// the heuristic is deliberately approximate.
pub fn repair_xml(xml: &str) -> String {
    let mut cleaned = xml.replace('\0', "");

    if !cleaned.starts_with("<?xml") {
        cleaned.insert_str(0, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    let tags: Vec<String> = opening_tag_pattern()
        .captures_iter(&cleaned)
        .map(|c| c[1].to_string())
        .collect();

    for tag in tags.iter().rev() {
        let closing = format!("</{tag}>");
        if !cleaned.contains(&closing) {
            cleaned.push_str(&closing);
        }
    }

    cleaned
}

/// Matches opening tags (self-closing ones included, which is part of the
/// approximation).
fn opening_tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<(\w+)[^>]*>").expect("opening tag pattern is valid"))
}

/// Intermediate element tree built from parser events.
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    /// Text immediately after the start tag, before any child.
    text: String,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }
}

fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(Error::Xml("content after the root element".to_string()));
                }

                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut element = Element::new(tag);

                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    element.attributes.push((key, value));
                }

                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut element = Element::new(tag);

                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let value = String::from_utf8_lossy(&attr.value).into_owned();
                    element.attributes.push((key, value));
                }

                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                } else if root.is_some() {
                    return Err(Error::Xml("content after the root element".to_string()));
                } else {
                    root = Some(element);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    } else if root.is_some() {
                        return Err(Error::Xml("content after the root element".to_string()));
                    } else {
                        root = Some(element);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                match stack.last_mut() {
                    Some(element) => {
                        // Only text before the first child counts as element text.
                        if element.children.is_empty() && element.text.is_empty() {
                            element.text = text.into_owned();
                        }
                    }
                    // trim_text leaves only non-whitespace text events, so any
                    // text outside an element is junk around the document.
                    None => {
                        return Err(Error::Xml("text outside the root element".to_string()));
                    }
                }
            }
            Ok(Event::CData(e)) => match stack.last_mut() {
                Some(element) => {
                    if element.children.is_empty() && element.text.is_empty() {
                        element.text = String::from_utf8_lossy(&e).into_owned();
                    }
                }
                None => {
                    return Err(Error::Xml("text outside the root element".to_string()));
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {} // Declarations, comments, processing instructions.
            Err(e) => return Err(Error::Xml(format!("XML parse error: {e}"))),
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml(format!(
            "unexpected end of document: {} unclosed element(s)",
            stack.len()
        )));
    }

    root.ok_or_else(|| Error::Xml("no root element found".to_string()))
}

/// Recursive element-to-node conversion.
///
/// Attributes become `@key` entries, children collapse under their tag names
/// (repeats promote to lists), and non-whitespace text either becomes the
/// whole node (when alone) or a `#text` entry (when coexisting with other
/// keys). An element with nothing at all converts to an empty mapping.
fn element_to_node(element: &Element) -> MetadataNode {
    let mut map = MetadataMap::new();

    for (key, value) in &element.attributes {
        map.insert(format!("@{key}"), MetadataNode::Text(value.clone()));
    }

    for child in &element.children {
        map.insert_child(child.tag.clone(), element_to_node(child));
    }

    let text = element.text.trim();
    if !text.is_empty() {
        if map.is_empty() {
            return MetadataNode::Text(text.to_string());
        }
        map.insert("#text".to_string(), MetadataNode::Text(text.to_string()));
    }

    MetadataNode::Map(map)
}
