//! The wire decoder: what a receiving side does with encoded text.
//!
//! Reverses [`escape`](crate::escape) and rebuilds host elements from their
//! records, so `decode(encode(tree)) == tree` for every tree `encode`
//! accepts. Both sides bound nesting by [`MAX_WIRE_DEPTH`].

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::encode::{ELEMENT_MARKER, ESCAPE_CHAR, MAX_WIRE_DEPTH, TYPEOF_KEY};
use crate::error::{Error, Result};
use crate::node::{HostElement, Node, Props, CHILDREN};

/// Reverse the escaping of a wire string value.
///
/// Returns an error for a `$`-prefixed marker this decoder does not know,
/// including a bare element marker outside an element record.
///
/// ```rust
/// use rsc_core::{escape, unescape};
///
/// assert_eq!(unescape("$$hello").unwrap(), "$hello");
/// assert_eq!(unescape(&escape("$RE")).unwrap(), "$RE");
/// assert!(unescape("$RE").is_err());
/// ```
pub fn unescape(value: &str) -> Result<Cow<'_, str>> {
    match value.strip_prefix(ESCAPE_CHAR) {
        None => Ok(Cow::Borrowed(value)),
        Some(rest) if rest.starts_with(ESCAPE_CHAR) => Ok(Cow::Borrowed(rest)),
        Some(_) if value == ELEMENT_MARKER => Err(Error::decode(
            "element marker outside an element record",
        )),
        Some(_) => Err(Error::decode(format!("unknown marker '{}'", value))),
    }
}

/// Rebuild a node tree from its JSON wire value.
pub fn from_wire(wire: JsonValue) -> Result<Node> {
    match wire {
        JsonValue::Null => Ok(Node::Null),
        JsonValue::Bool(b) => Ok(Node::Bool(b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Node::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Node::Float(f))
            } else {
                Err(Error::decode(format!("unrepresentable number {}", n)))
            }
        }
        JsonValue::String(s) => Ok(Node::String(unescape(&s)?.into_owned())),
        JsonValue::Array(items) => Ok(Node::Array(from_wire_all(items)?)),
        JsonValue::Object(object) => {
            if is_element_record(&object) {
                element_from_record(object).map(Node::Host)
            } else {
                let mut map = Props::new();
                for (key, value) in object {
                    map.insert(key, from_wire(value)?);
                }
                Ok(Node::Map(map))
            }
        }
    }
}

/// Decode JSON text produced by [`encode`](crate::encode).
pub fn decode(text: &str) -> Result<Node> {
    let depth = nesting_depth(text);
    if depth > MAX_WIRE_DEPTH {
        return Err(Error::WireDepthExceeded {
            limit: MAX_WIRE_DEPTH,
        });
    }

    // serde_json's own limit (128) is below ours; the scan above bounds it
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let wire = JsonValue::deserialize(&mut deserializer)?;
    deserializer.end()?;
    from_wire(wire)
}

/// Deepest array/object nesting in JSON text, ignoring brackets in strings.
fn nesting_depth(text: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

fn from_wire_all(items: Vec<JsonValue>) -> Result<Vec<Node>> {
    items.into_iter().map(from_wire).collect()
}

fn is_element_record(object: &JsonMap<String, JsonValue>) -> bool {
    matches!(object.get(TYPEOF_KEY), Some(JsonValue::String(marker)) if marker == ELEMENT_MARKER)
}

fn element_from_record(mut record: JsonMap<String, JsonValue>) -> Result<HostElement> {
    let tag = match record.remove("type") {
        Some(JsonValue::String(tag)) => unescape(&tag)?.into_owned(),
        other => {
            return Err(Error::decode(format!(
                "element type must be a string, found {:?}",
                other
            )))
        }
    };

    let key = match record.remove("key") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(key)) => Some(unescape(&key)?.into_owned()),
        Some(other) => {
            return Err(Error::decode(format!(
                "element key must be a string or null, found {}",
                other
            )))
        }
    };

    let mut props = match record.remove("props") {
        None | Some(JsonValue::Null) => JsonMap::new(),
        Some(JsonValue::Object(props)) => props,
        Some(other) => {
            return Err(Error::decode(format!(
                "element props must be an object, found {}",
                other
            )))
        }
    };

    let children = match props.remove(CHILDREN) {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(children)) => from_wire_all(children)?,
        Some(single) => vec![from_wire(single)?],
    };

    let mut element = HostElement::new(tag);
    element.key = key;
    element.children = children;
    for (name, value) in props {
        element.props.insert(name, from_wire(value)?);
    }
    Ok(element)
}
