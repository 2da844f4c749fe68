//! Server component core: resolve a component tree, encode it for the wire.
//!
//! A page is described as a [`Node`] tree mixing plain data with elements:
//! - `Host` elements describe markup (a tag, props and children)
//! - `Composite` elements are deferred [`Component`] invocations, possibly async
//! - `Group` nodes splice their children into the surrounding sequence
//!
//! The [`Resolver`] invokes every component and returns a tree of data and
//! host elements only. [`encode`] then turns that tree into JSON text, marking
//! element records with `"$RE"` and escaping string values that start with `$`.
//! [`decode`] reverses both steps on the receiving side.
//!
//! # Example
//!
//! ```rust
//! use rsc_core::{component_fn, decode, encode, resolve, Node, PropsExt};
//!
//! # futures::executor::block_on(async {
//! let price = component_fn("Price", |props| {
//!     let amount = props.require_str("Price", "amount")?;
//!     Ok(Node::host("span").child(format!("${}", amount)).build())
//! });
//!
//! let page = Node::host("main")
//!     .child(Node::composite(price).prop("amount", "5"))
//!     .build();
//!
//! let resolved = resolve(page).await.unwrap();
//! let text = encode(&resolved).unwrap();
//! assert!(text.contains("$$5"));
//! assert_eq!(decode(&text).unwrap(), resolved);
//! # });
//! ```

mod component;
mod config;
mod decode;
mod encode;
mod error;
mod node;
mod resolve;

pub use component::{component_fn, Component, FnComponent, PropsExt};
pub use config::{ResolveConfig, DEFAULT_MAX_DEPTH};
pub use decode::{decode, from_wire, unescape};
pub use encode::{encode, escape, to_wire, ELEMENT_MARKER, ESCAPE_CHAR, MAX_WIRE_DEPTH, TYPEOF_KEY};
pub use error::{Cause, Error, Result};
pub use node::{CompositeElement, ElementBuilder, HostElement, Node, NodeKind, Props, CHILDREN};
pub use resolve::{resolve, Resolver};

// Re-export so callers can cancel without depending on tokio-util directly
pub use tokio_util::sync::CancellationToken;
