//! Conversion of XML response bodies into a generic JSON-like tree.
//!
//! Rules:
//! - the document becomes a single-key object `{ <root name>: <root value> }`
//! - an element with child elements becomes an object keyed by child name
//! - repeated sibling elements with the same name become an array, in document order
//! - a leaf element becomes its text as a string, unchanged; an empty leaf becomes `{}`
//! - attributes go under an `"@attributes"` object; a leaf that has attributes
//!   keeps its text under `"#text"`
//!
//! No type coercion happens: numeric text stays a string.

use roxmltree::{Document, Node};
use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::error::ClientResult;

/// Parsed response body. Shape is dictated by the remote API.
pub type RemoteResponse = Value;

pub const ATTRIBUTES_KEY: &str = "@attributes";
pub const TEXT_KEY: &str = "#text";

/// Parse an XML body and normalize it into a [`RemoteResponse`].
///
/// Documents carrying a DTD are rejected.
///
/// # Errors
/// Returns `ClientError::ResponseParse` when the body is not well-formed XML.
pub fn normalize(body: &str) -> ClientResult<RemoteResponse> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    let doc = Document::parse(body)?;
    let root = doc.root_element();

    let mut map = Map::new();
    map.insert(root.tag_name().name().to_owned(), element_value(root));
    Ok(Value::Object(map))
}

fn element_value(node: Node<'_, '_>) -> Value {
    let attributes = attributes_of(node);
    let mut children = node.children().filter(Node::is_element).peekable();

    if children.peek().is_none() {
        let text = leaf_text(node);
        return match attributes {
            None if text.is_empty() => Value::Object(Map::new()),
            None => Value::String(text),
            Some(attrs) => {
                let mut map = Map::new();
                map.insert(ATTRIBUTES_KEY.to_owned(), attrs);
                if !text.is_empty() {
                    map.insert(TEXT_KEY.to_owned(), Value::String(text));
                }
                Value::Object(map)
            }
        };
    }

    let mut map = Map::new();
    if let Some(attrs) = attributes {
        map.insert(ATTRIBUTES_KEY.to_owned(), attrs);
    }
    for child in children {
        let value = element_value(child);
        match map.entry(child.tag_name().name()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if let Value::Array(items) = existing {
                    items.push(value);
                } else {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
    }
    Value::Object(map)
}

fn attributes_of(node: Node<'_, '_>) -> Option<Value> {
    let mut attrs = node.attributes().peekable();
    attrs.peek()?;
    let map: Map<String, Value> = attrs
        .map(|attr| (attr.name().to_owned(), Value::String(attr.value().to_owned())))
        .collect();
    Some(Value::Object(map))
}

fn leaf_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}
