//! The component capability.
//!
//! A component turns props into a node. Bodies may suspend (read a file,
//! decode an image) or return immediately; the resolver awaits either the
//! same way.

use std::sync::Arc;

use async_trait::async_trait;

use crate::node::{Node, Props, CHILDREN};
use crate::Error;

/// A callable component referenced by composite elements.
///
/// # Object Safety
///
/// This trait is object-safe: composite elements hold an `Arc<dyn Component>`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use rsc_core::{Component, Error, Node, Props};
///
/// struct Greeting;
///
/// #[async_trait]
/// impl Component for Greeting {
///     async fn render(&self, props: Props) -> Result<Node, Error> {
///         let name = props.get("name").and_then(Node::as_str).unwrap_or("world");
///         Ok(Node::host("p").child(format!("Hello, {}!", name)).build())
///     }
/// }
/// ```
#[async_trait]
pub trait Component: Send + Sync {
    /// Name used in logs and error values.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Render the component with its (unresolved) props.
    async fn render(&self, props: Props) -> Result<Node, Error>;
}

/// Adapter turning a synchronous closure into a [`Component`].
pub struct FnComponent<F> {
    name: String,
    body: F,
}

impl<F> FnComponent<F>
where
    F: Fn(Props) -> Result<Node, Error> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

#[async_trait]
impl<F> Component for FnComponent<F>
where
    F: Fn(Props) -> Result<Node, Error> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn render(&self, props: Props) -> Result<Node, Error> {
        (self.body)(props)
    }
}

/// Shorthand for a shared synchronous component.
pub fn component_fn<F>(name: impl Into<String>, body: F) -> Arc<dyn Component>
where
    F: Fn(Props) -> Result<Node, Error> + Send + Sync + 'static,
{
    Arc::new(FnComponent::new(name, body))
}

/// Accessors components use to pull values out of their props.
pub trait PropsExt {
    /// Remove and return the `children` prop, `Null` when absent.
    fn take_children(&mut self) -> Node;

    /// Borrow a string prop.
    fn get_str(&self, name: &str) -> Option<&str>;

    /// Borrow a string prop that `component` cannot render without.
    fn require_str(&self, component: &str, name: &str) -> Result<&str, Error>;
}

impl PropsExt for Props {
    fn take_children(&mut self) -> Node {
        self.remove(CHILDREN).unwrap_or_default()
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Node::as_str)
    }

    fn require_str(&self, component: &str, name: &str) -> Result<&str, Error> {
        self.get_str(name).ok_or_else(|| {
            Error::invalid_props(component, format!("missing string prop '{}'", name))
        })
    }
}
