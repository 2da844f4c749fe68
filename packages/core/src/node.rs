//! The Node type - the tree a page is built from.
//!
//! A node tree mixes plain data (the same shapes JSON can hold) with three
//! element kinds: host elements that describe markup, composite elements that
//! are deferred component invocations, and groups that splice their children
//! into the surrounding sequence.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::component::Component;

/// Property map of an element, or the payload of a plain map node.
///
/// Uses `BTreeMap` so key order is stable across resolution and encoding.
pub type Props = BTreeMap<String, Node>;

/// Name of the reserved property holding an element's children.
pub const CHILDREN: &str = "children";

/// A node in a page tree.
///
/// After resolution a tree contains only the data variants and `Host`; see
/// [`Node::is_resolved`].
#[derive(Clone, Debug, Default)]
pub enum Node {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of nodes.
    Array(Vec<Node>),
    /// Plain structured data that is not an element.
    Map(Props),
    /// A markup element, kept as-is by the resolver apart from its props.
    Host(HostElement),
    /// A deferred component invocation.
    Composite(CompositeElement),
    /// A fragment; the payload must be an `Array`.
    Group(Box<Node>),
}

/// Discriminant of a [`Node`], used in error values and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Map,
    Host,
    Composite,
    Group,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Array => "array",
            NodeKind::Map => "map",
            NodeKind::Host => "host element",
            NodeKind::Composite => "composite element",
            NodeKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// A renderable markup unit: a tag, optional key, props and children.
///
/// Children live outside the prop map so they are always a sequence. The
/// encoder writes them back under the `children` prop.
#[derive(Clone, Debug, PartialEq)]
pub struct HostElement {
    pub tag: String,
    pub key: Option<String>,
    pub props: Props,
    pub children: Vec<Node>,
}

impl HostElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Set a prop. `children` is routed to the children sequence.
    pub fn set_prop(&mut self, name: impl Into<String>, value: impl Into<Node>) {
        let name = name.into();
        let value = value.into();
        if name == CHILDREN {
            self.children = into_children(value);
        } else {
            self.props.insert(name, value);
        }
    }
}

fn into_children(value: Node) -> Vec<Node> {
    match value {
        Node::Null => Vec::new(),
        Node::Array(items) => items,
        other => vec![other],
    }
}

/// A deferred invocation of a component with unresolved props.
#[derive(Clone)]
pub struct CompositeElement {
    pub component: Arc<dyn Component>,
    pub key: Option<String>,
    pub props: Props,
}

impl CompositeElement {
    pub fn new(component: Arc<dyn Component>) -> Self {
        Self {
            component,
            key: None,
            props: Props::new(),
        }
    }
}

impl fmt::Debug for CompositeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeElement")
            .field("component", &self.component.name())
            .field("key", &self.key)
            .field("props", &self.props)
            .finish()
    }
}

impl PartialEq for CompositeElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.component, &other.component)
            && self.key == other.key
            && self.props == other.props
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Integer(a), Node::Integer(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Map(a), Node::Map(b)) => a == b,
            (Node::Host(a), Node::Host(b)) => a == b,
            (Node::Composite(a), Node::Composite(b)) => a == b,
            (Node::Group(a), Node::Group(b)) => a == b,
            _ => false,
        }
    }
}

impl Node {
    /// Start building a host element.
    pub fn host(tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder::Host(HostElement::new(tag))
    }

    /// Start building a composite element for `component`.
    pub fn composite(component: Arc<dyn Component>) -> ElementBuilder {
        ElementBuilder::Composite(CompositeElement::new(component))
    }

    /// A group splicing `children` into the enclosing sequence.
    pub fn group<I, T>(children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        Node::Group(Box::new(Node::Array(
            children.into_iter().map(Into::into).collect(),
        )))
    }

    /// Create an empty map.
    pub fn map() -> Self {
        Node::Map(Props::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Integer(_) => NodeKind::Integer,
            Node::Float(_) => NodeKind::Float,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Map(_) => NodeKind::Map,
            Node::Host(_) => NodeKind::Host,
            Node::Composite(_) => NodeKind::Composite,
            Node::Group(_) => NodeKind::Group,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&HostElement> {
        match self {
            Node::Host(host) => Some(host),
            _ => None,
        }
    }

    /// Check that no composite element or group remains anywhere in the tree.
    pub fn is_resolved(&self) -> bool {
        match self {
            Node::Null | Node::Bool(_) | Node::Integer(_) | Node::Float(_) | Node::String(_) => {
                true
            }
            Node::Array(items) => items.iter().all(Node::is_resolved),
            Node::Map(map) => map.values().all(Node::is_resolved),
            Node::Host(host) => {
                host.props.values().all(Node::is_resolved)
                    && host.children.iter().all(Node::is_resolved)
            }
            Node::Composite(_) | Node::Group(_) => false,
        }
    }
}

/// Builder shared by host and composite elements.
///
/// ```rust
/// use rsc_core::Node;
///
/// let link = Node::host("a").prop("href", "/hello").child("hello").build();
/// assert_eq!(link.as_host().unwrap().children, vec![Node::from("hello")]);
/// ```
pub enum ElementBuilder {
    Host(HostElement),
    Composite(CompositeElement),
}

impl ElementBuilder {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        match &mut self {
            ElementBuilder::Host(host) => host.key = Some(key.into()),
            ElementBuilder::Composite(composite) => composite.key = Some(key.into()),
        }
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
        match &mut self {
            ElementBuilder::Host(host) => host.set_prop(name, value),
            ElementBuilder::Composite(composite) => {
                composite.props.insert(name.into(), value.into());
            }
        }
        self
    }

    /// Merge a whole prop map, e.g. props forwarded from a parent component.
    pub fn props(mut self, props: Props) -> Self {
        for (name, value) in props {
            self = self.prop(name, value);
        }
        self
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        let child = child.into();
        match &mut self {
            ElementBuilder::Host(host) => host.children.push(child),
            ElementBuilder::Composite(composite) => {
                match composite.props.remove(CHILDREN) {
                    None | Some(Node::Null) => {
                        composite.props.insert(CHILDREN.to_string(), child);
                    }
                    Some(Node::Array(mut items)) => {
                        items.push(child);
                        composite
                            .props
                            .insert(CHILDREN.to_string(), Node::Array(items));
                    }
                    Some(single) => {
                        composite
                            .props
                            .insert(CHILDREN.to_string(), Node::Array(vec![single, child]));
                    }
                }
            }
        }
        self
    }

    /// Append several children.
    pub fn children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        for child in children {
            self = self.child(child);
        }
        self
    }

    pub fn build(self) -> Node {
        match self {
            ElementBuilder::Host(host) => Node::Host(host),
            ElementBuilder::Composite(composite) => Node::Composite(composite),
        }
    }
}

impl From<ElementBuilder> for Node {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}

// Conversion from common types

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Integer(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Integer(v as i64)
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Node::Integer(v as i64)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<&String> for Node {
    fn from(v: &String) -> Self {
        Node::String(v.clone())
    }
}

impl From<HostElement> for Node {
    fn from(v: HostElement) -> Self {
        Node::Host(v)
    }
}

impl From<Props> for Node {
    fn from(v: Props) -> Self {
        Node::Map(v)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(v: Vec<T>) -> Self {
        Node::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map_or(Node::Null, Into::into)
    }
}
