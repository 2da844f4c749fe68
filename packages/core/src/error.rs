//! Error types for resolution and wire encoding.

use crate::node::NodeKind;

/// Boxed cause carried by [`Error::NotFound`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving or encoding a node tree.
///
/// Resolution is all-or-nothing: the first error raised anywhere in the tree
/// is returned to the caller unchanged. Mapping an error to a transport status
/// is the caller's job; see [`Error::is_not_found`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A component could not find the resource it was asked to render.
    #[error("not found: {cause}")]
    NotFound {
        #[source]
        cause: Cause,
    },

    /// A group's payload was not a sequence.
    #[error("group payload must be a sequence, found {found}")]
    MalformedGroup { found: NodeKind },

    /// The encoder was handed a node that only exists before resolution.
    #[error("cannot encode unresolved {0} node")]
    UnsupportedNodeKind(NodeKind),

    /// Transitive component resolution went deeper than the configured bound.
    #[error("component nesting exceeded the limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    /// The caller cancelled resolution.
    #[error("resolution cancelled")]
    Cancelled,

    /// A component was invoked with props it cannot use.
    #[error("invalid props for {component}: {message}")]
    InvalidProps { component: String, message: String },

    /// A component body failed for a reason other than a missing resource.
    #[error("component {component} failed: {message}")]
    Component { component: String, message: String },

    /// A host element carries a `children` entry in its prop map, which the
    /// wire record reserves for the element's child list.
    #[error("host element <{tag}> has a 'children' prop next to its child list")]
    ChildrenProp { tag: String },

    /// A tree or payload nests containers deeper than the wire allows.
    #[error("wire nesting exceeded the limit of {limit}")]
    WireDepthExceeded { limit: usize },

    /// A wire payload could not be turned back into a node tree.
    #[error("invalid wire payload: {message}")]
    Decode { message: String },

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error surfaced by a component body.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap the cause of a missing resource.
    pub fn not_found(cause: impl Into<Cause>) -> Self {
        Error::NotFound {
            cause: cause.into(),
        }
    }

    /// Create a generic component failure.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a props validation failure.
    pub fn invalid_props(component: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidProps {
            component: component.into(),
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    /// True when the failure means "the requested resource does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type alias for resolution and encoding.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn not_found_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "posts/missing.md");
        let e = Error::not_found(io);

        assert!(e.is_not_found());
        assert!(format!("{}", e).contains("posts/missing.md"));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn only_not_found_is_not_found() {
        assert!(!Error::Cancelled.is_not_found());
        assert!(!Error::RecursionLimitExceeded { limit: 3 }.is_not_found());
        assert!(!Error::component("Post", "boom").is_not_found());
    }

    #[test]
    fn malformed_group_display() {
        let e = Error::MalformedGroup {
            found: NodeKind::String,
        };
        assert_eq!(
            format!("{}", e),
            "group payload must be a sequence, found string"
        );
    }

    #[test]
    fn unsupported_kind_display() {
        let e = Error::UnsupportedNodeKind(NodeKind::Composite);
        assert!(format!("{}", e).contains("composite"));
    }

    #[test]
    fn recursion_limit_display() {
        let e = Error::RecursionLimitExceeded { limit: 16 };
        assert!(format!("{}", e).contains("16"));
    }

    #[test]
    fn invalid_props_display() {
        let e = Error::invalid_props("Post", "missing slug");
        let display = format!("{}", e);
        assert!(display.contains("Post"));
        assert!(display.contains("missing slug"));
    }

    #[test]
    fn io_error_conversion() {
        let e: Error = std::io::Error::other("disk").into();
        assert!(matches!(e, Error::Io(_)));
        assert!(!e.is_not_found());
    }
}
