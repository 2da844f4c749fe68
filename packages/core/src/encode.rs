//! The wire encoder.
//!
//! Turns a resolved tree into JSON. String values that start with `$` get a
//! second `$` so that markers such as the element marker can never collide
//! with application data. Keys are left untouched.

use std::borrow::Cow;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{Error, Result};
use crate::node::{HostElement, Node, CHILDREN};

/// Leading character reserved for protocol markers.
pub const ESCAPE_CHAR: char = '$';

/// Marker identifying an element record on the wire.
pub const ELEMENT_MARKER: &str = "$RE";

/// Key of the element record field carrying [`ELEMENT_MARKER`].
pub const TYPEOF_KEY: &str = "$$typeof";

/// Escape a string value for the wire.
///
/// ```rust
/// use rsc_core::escape;
///
/// assert_eq!(escape("hello"), "hello");
/// assert_eq!(escape("$hello"), "$$hello");
/// ```
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.starts_with(ESCAPE_CHAR) {
        Cow::Owned(format!("{}{}", ESCAPE_CHAR, value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Deepest container nesting (arrays and objects) allowed on the wire.
///
/// A host element costs three levels: its record, its props and its child
/// list. The decoder enforces the same bound, so every tree [`encode`]
/// accepts decodes back.
pub const MAX_WIRE_DEPTH: usize = 384;

/// Convert a resolved tree to its JSON wire value.
///
/// Fails with [`Error::UnsupportedNodeKind`] on composite elements and groups,
/// which the resolver never leaves behind, with [`Error::ChildrenProp`] on a
/// host element whose prop map holds `children`, and with
/// [`Error::WireDepthExceeded`] past [`MAX_WIRE_DEPTH`].
pub fn to_wire(node: &Node) -> Result<JsonValue> {
    to_wire_at(node, 0)
}

/// Encode a resolved tree as JSON text.
///
/// ```rust
/// use rsc_core::{encode, Node};
///
/// let node = Node::host("p").child("$5").build();
/// let text = encode(&node).unwrap();
/// assert!(text.contains(r#""$$typeof":"$RE""#));
/// assert!(text.contains(r#""children":["$$5"]"#));
/// ```
pub fn encode(node: &Node) -> Result<String> {
    let wire = to_wire(node)?;
    Ok(serde_json::to_string(&wire)?)
}

fn enter(depth: usize) -> Result<usize> {
    if depth > MAX_WIRE_DEPTH {
        return Err(Error::WireDepthExceeded {
            limit: MAX_WIRE_DEPTH,
        });
    }
    Ok(depth)
}

fn to_wire_at(node: &Node, depth: usize) -> Result<JsonValue> {
    match node {
        Node::Null => Ok(JsonValue::Null),
        Node::Bool(b) => Ok(JsonValue::Bool(*b)),
        Node::Integer(i) => Ok(JsonValue::Number((*i).into())),
        // JSON has no NaN or infinity
        Node::Float(f) => Ok(serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)),
        Node::String(s) => Ok(JsonValue::String(escape(s).into_owned())),
        Node::Array(items) => Ok(JsonValue::Array(to_wire_all(items, enter(depth + 1)?)?)),
        Node::Map(map) => {
            let depth = enter(depth + 1)?;
            let mut object = JsonMap::new();
            for (key, value) in map {
                object.insert(key.clone(), to_wire_at(value, depth)?);
            }
            Ok(JsonValue::Object(object))
        }
        Node::Host(host) => element_record(host, depth),
        Node::Composite(_) | Node::Group(_) => Err(Error::UnsupportedNodeKind(node.kind())),
    }
}

fn to_wire_all(items: &[Node], depth: usize) -> Result<Vec<JsonValue>> {
    items.iter().map(|item| to_wire_at(item, depth)).collect()
}

fn element_record(host: &HostElement, depth: usize) -> Result<JsonValue> {
    if host.props.contains_key(CHILDREN) {
        return Err(Error::ChildrenProp {
            tag: host.tag.clone(),
        });
    }

    let props_depth = enter(depth + 2)?;
    let mut props = JsonMap::new();
    for (name, value) in &host.props {
        props.insert(name.clone(), to_wire_at(value, props_depth)?);
    }
    props.insert(
        CHILDREN.to_string(),
        JsonValue::Array(to_wire_all(&host.children, enter(depth + 3)?)?),
    );

    let mut record = JsonMap::new();
    record.insert(
        TYPEOF_KEY.to_string(),
        JsonValue::String(ELEMENT_MARKER.to_string()),
    );
    record.insert(
        "type".to_string(),
        JsonValue::String(escape(&host.tag).into_owned()),
    );
    record.insert(
        "key".to_string(),
        host.key
            .as_deref()
            .map(|key| JsonValue::String(escape(key).into_owned()))
            .unwrap_or(JsonValue::Null),
    );
    record.insert("ref".to_string(), JsonValue::Null);
    record.insert("props".to_string(), JsonValue::Object(props));
    Ok(JsonValue::Object(record))
}
