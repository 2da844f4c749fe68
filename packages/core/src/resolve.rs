//! The tree resolver.
//!
//! Walks a node tree, invokes every composite element and substitutes its
//! output, splices groups into their parent sequence, and returns a tree that
//! holds only data and host elements.

use std::future::Future;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::config::ResolveConfig;
use crate::error::{Error, Result};
use crate::node::{CompositeElement, HostElement, Node, Props};

/// Resolves node trees according to a [`ResolveConfig`].
///
/// Siblings may resolve concurrently, but every sequence in the output keeps
/// the positional order of its input. The first failure anywhere aborts the
/// whole resolution.
///
/// # Example
///
/// ```rust
/// use rsc_core::{component_fn, Node, Resolver, ResolveConfig};
///
/// # futures::executor::block_on(async {
/// let hello = component_fn("Hello", |_| Ok(Node::host("p").child("hello").build()));
/// let tree = Node::host("main").child(Node::composite(hello)).build();
///
/// let resolved = Resolver::new(ResolveConfig::default()).resolve(tree).await.unwrap();
/// assert!(resolved.is_resolved());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolveConfig,
    cancel: CancellationToken,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolveConfig::default())
    }
}

impl Resolver {
    pub fn new(config: ResolveConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Abandon in-flight component invocations once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Fully resolve `node`.
    pub async fn resolve(&self, node: Node) -> Result<Node> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.resolve_node(node, 0).await
    }

    fn resolve_node(&self, node: Node, depth: usize) -> BoxFuture<'_, Result<Node>> {
        async move {
            tracing::trace!(kind = %node.kind(), depth, "resolving node");
            match node {
                Node::Null
                | Node::Bool(_)
                | Node::Integer(_)
                | Node::Float(_)
                | Node::String(_) => Ok(node),
                Node::Array(items) => Ok(Node::Array(self.resolve_sequence(items, depth).await?)),
                Node::Map(map) => Ok(Node::Map(self.resolve_props(map, depth).await?)),
                Node::Host(host) => Ok(Node::Host(self.resolve_host(host, depth).await?)),
                Node::Composite(composite) => {
                    let (rendered, depth) = self.invoke(composite, depth).await?;
                    self.resolve_node(rendered, depth).await
                }
                Node::Group(payload) => match *payload {
                    Node::Array(items) => {
                        Ok(Node::Array(self.resolve_sequence(items, depth).await?))
                    }
                    other => Err(Error::MalformedGroup {
                        found: other.kind(),
                    }),
                },
            }
        }
        .boxed()
    }

    /// Resolve a sequence, splicing group elements into it. A composite
    /// element that renders a group is spliced the same way.
    async fn resolve_sequence(&self, items: Vec<Node>, depth: usize) -> Result<Vec<Node>> {
        let parts = self
            .join(items.into_iter().map(|item| self.resolve_entry(item, depth)))
            .await?;
        Ok(parts.into_iter().flatten().collect())
    }

    fn resolve_entry(&self, item: Node, depth: usize) -> BoxFuture<'_, Result<Vec<Node>>> {
        async move {
            match item {
                Node::Group(payload) => match *payload {
                    Node::Array(items) => self.resolve_sequence(items, depth).await,
                    other => Err(Error::MalformedGroup {
                        found: other.kind(),
                    }),
                },
                Node::Composite(composite) => {
                    let (rendered, depth) = self.invoke(composite, depth).await?;
                    self.resolve_entry(rendered, depth).await
                }
                other => Ok(vec![self.resolve_node(other, depth).await?]),
            }
        }
        .boxed()
    }

    async fn resolve_props(&self, props: Props, depth: usize) -> Result<Props> {
        let entries = self
            .join(props.into_iter().map(|(name, value)| async move {
                let value = self.resolve_node(value, depth).await?;
                Ok::<_, Error>((name, value))
            }))
            .await?;
        Ok(entries.into_iter().collect())
    }

    async fn resolve_host(&self, host: HostElement, depth: usize) -> Result<HostElement> {
        let HostElement {
            tag,
            key,
            props,
            children,
        } = host;

        let props = self.resolve_props(props, depth).await?;
        let children = self.resolve_sequence(children, depth).await?;

        Ok(HostElement {
            tag,
            key,
            props,
            children,
        })
    }

    /// Invoke a composite element once, returning its output and the depth
    /// at which that output resolves.
    async fn invoke(&self, composite: CompositeElement, depth: usize) -> Result<(Node, usize)> {
        let depth = depth + 1;
        let limit = self.config.max_depth;
        if depth > limit {
            tracing::warn!(
                component = composite.component.name(),
                limit,
                "component nesting limit exceeded"
            );
            return Err(Error::RecursionLimitExceeded { limit });
        }

        let CompositeElement {
            component, props, ..
        } = composite;
        tracing::debug!(component = component.name(), depth, "rendering component");

        let rendered = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            result = component.render(props) => result,
        };

        match rendered {
            Ok(node) => Ok((node, depth)),
            Err(err) => {
                tracing::debug!(component = component.name(), error = %err, "component failed");
                Err(err)
            }
        }
    }

    async fn join<I, F, T>(&self, futures: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T>>,
    {
        if self.config.concurrent {
            return try_join_all(futures).await;
        }

        let mut out = Vec::new();
        for future in futures {
            out.push(future.await?);
        }
        Ok(out)
    }
}

/// Resolve `node` with the default configuration.
pub async fn resolve(node: Node) -> Result<Node> {
    Resolver::default().resolve(node).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{component_fn, Component};
    use crate::node::CHILDREN;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Sleeps, records its completion, then renders its label.
    struct Delayed {
        label: &'static str,
        delay: Duration,
        finished: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Component for Delayed {
        fn name(&self) -> &str {
            self.label
        }

        async fn render(&self, _props: Props) -> std::result::Result<Node, Error> {
            tokio::time::sleep(self.delay).await;
            self.finished.lock().unwrap().push(self.label);
            Ok(Node::host("li").child(self.label).build())
        }
    }

    fn delayed(
        label: &'static str,
        millis: u64,
        finished: &Arc<Mutex<Vec<&'static str>>>,
    ) -> Node {
        Node::composite(Arc::new(Delayed {
            label,
            delay: Duration::from_millis(millis),
            finished: finished.clone(),
        }))
        .build()
    }

    fn missing_slug() -> Arc<dyn Component> {
        component_fn("MissingSlug", |_| {
            Err(Error::not_found(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "posts/missing.md",
            )))
        })
    }

    #[tokio::test]
    async fn primitives_pass_through() {
        for node in [
            Node::Null,
            Node::from(true),
            Node::from(7i64),
            Node::from(1.5),
            Node::from("$dollar"),
        ] {
            assert_eq!(resolve(node.clone()).await.unwrap(), node);
        }
    }

    #[tokio::test]
    async fn resolved_trees_are_unchanged() {
        let mut data = Props::new();
        data.insert("count".to_string(), Node::from(3i64));
        data.insert("tags".to_string(), Node::from(vec!["a", "b"]));

        let tree = Node::host("html")
            .child(
                Node::host("body")
                    .prop("style", Node::Map(data.clone()))
                    .child(Node::host("p").child("text"))
                    .child(Node::host("hr")),
            )
            .child(Node::Map(data))
            .build();

        let once = resolve(tree.clone()).await.unwrap();
        assert_eq!(once, tree);
        assert_eq!(resolve(once.clone()).await.unwrap(), once);
    }

    #[tokio::test]
    async fn sequence_order_survives_shuffled_completion() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let tree = Node::from(vec![
            delayed("slow", 60, &finished),
            delayed("fast", 0, &finished),
            delayed("medium", 30, &finished),
        ]);

        let resolved = resolve(tree).await.unwrap();

        assert_eq!(
            resolved,
            Node::from(vec![
                Node::host("li").child("slow").build(),
                Node::host("li").child("fast").build(),
                Node::host("li").child("medium").build(),
            ])
        );
        assert_eq!(*finished.lock().unwrap(), vec!["fast", "medium", "slow"]);
    }

    #[tokio::test]
    async fn sequential_mode_runs_in_input_order() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let tree = Node::from(vec![
            delayed("slow", 20, &finished),
            delayed("fast", 0, &finished),
        ]);

        let resolver = Resolver::new(ResolveConfig::default().sequential());
        let resolved = resolver.resolve(tree).await.unwrap();

        assert!(resolved.is_resolved());
        assert_eq!(*finished.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn group_in_children_is_spliced() {
        let a = Node::host("h1").child("Welcome").build();
        let b = Node::host("div").build();

        let grouped = Node::host("section")
            .child(Node::group(vec![a.clone(), b.clone()]))
            .build();
        let direct = Node::host("section").child(a).child(b).build();

        assert_eq!(resolve(grouped).await.unwrap(), direct);
    }

    #[tokio::test]
    async fn group_as_children_prop_is_spliced() {
        let grouped = Node::host("ul")
            .prop(CHILDREN, Node::group(vec!["x", "y"]))
            .build();
        let resolved = resolve(grouped).await.unwrap();
        assert_eq!(
            resolved.as_host().unwrap().children,
            vec![Node::from("x"), Node::from("y")]
        );
    }

    #[tokio::test]
    async fn group_flattens_exactly_one_level() {
        let tree = Node::from(vec![
            Node::from("a"),
            Node::group(vec![Node::from("b"), Node::from(vec!["c", "d"])]),
        ]);
        let resolved = resolve(tree).await.unwrap();
        assert_eq!(
            resolved,
            Node::from(vec![
                Node::from("a"),
                Node::from("b"),
                Node::from(vec!["c", "d"]),
            ])
        );
    }

    #[tokio::test]
    async fn composite_rendering_a_group_is_spliced() {
        let blocks = component_fn("Blocks", |_| {
            Ok(Node::group(vec![
                Node::host("p").child("one").build(),
                Node::host("p").child("two").build(),
            ]))
        });
        let tree = Node::host("section")
            .child(Node::host("h2"))
            .child(Node::composite(blocks.clone()))
            .build();

        let resolved = resolve(tree).await.unwrap();
        assert_eq!(
            resolved,
            Node::host("section")
                .child(Node::host("h2"))
                .child(Node::host("p").child("one"))
                .child(Node::host("p").child("two"))
                .build()
        );

        // Outside a sequence the group still collapses to an array.
        let alone = resolve(Node::composite(blocks).build()).await.unwrap();
        assert!(matches!(alone, Node::Array(ref items) if items.len() == 2));
    }

    #[tokio::test]
    async fn group_outside_a_sequence_becomes_an_array() {
        let resolved = resolve(Node::group(vec!["a", "b"])).await.unwrap();
        assert_eq!(resolved, Node::from(vec!["a", "b"]));
    }

    #[tokio::test]
    async fn group_with_non_sequence_payload_is_malformed() {
        let tree = Node::host("div")
            .child(Node::Group(Box::new(Node::from("oops"))))
            .build();
        let err = resolve(tree).await.unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedGroup {
                found: crate::NodeKind::String
            }
        ));

        let err = resolve(Node::Group(Box::new(Node::map()))).await.unwrap_err();
        assert!(matches!(err, Error::MalformedGroup { .. }));
    }

    #[tokio::test]
    async fn composite_results_resolve_transitively() {
        let b = component_fn("B", |_| Ok(Node::from("x")));
        let a = component_fn("A", move |_| Ok(Node::composite(b.clone()).build()));

        let resolved = resolve(Node::composite(a).build()).await.unwrap();
        assert_eq!(resolved, Node::from("x"));
    }

    #[tokio::test]
    async fn composite_receives_unresolved_props() {
        let inner = component_fn("Inner", |_| Ok(Node::from("inner")));
        let inner_node = Node::composite(inner).build();
        let expected = inner_node.clone();

        let outer = component_fn("Outer", move |mut props| {
            assert_eq!(props.remove(CHILDREN), Some(expected.clone()));
            Ok(Node::host("main").build())
        });

        let tree = Node::composite(outer).child(inner_node).build();
        assert_eq!(
            resolve(tree).await.unwrap(),
            Node::host("main").build()
        );
    }

    #[tokio::test]
    async fn not_found_propagates_without_partial_output() {
        let tree = Node::host("main")
            .child(Node::host("p").child("kept?"))
            .child(Node::composite(missing_slug()))
            .build();

        let err = resolve(tree).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn failure_in_map_value_propagates() {
        let mut data = Props::new();
        data.insert("ok".to_string(), Node::from(1i64));
        data.insert("bad".to_string(), Node::composite(missing_slug()).build());

        let err = resolve(Node::Map(data)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn depth_limit_stops_runaway_components() {
        struct Forever;

        #[async_trait]
        impl Component for Forever {
            async fn render(&self, _props: Props) -> std::result::Result<Node, Error> {
                Ok(Node::composite(Arc::new(Forever)).build())
            }
        }

        let resolver = Resolver::new(ResolveConfig::default().with_max_depth(8));
        let err = resolver
            .resolve(Node::composite(Arc::new(Forever)).build())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecursionLimitExceeded { limit: 8 }));
    }

    #[tokio::test]
    async fn self_rendering_component_hits_the_default_limit() {
        struct Mirror;

        #[async_trait]
        impl Component for Mirror {
            async fn render(&self, _props: Props) -> std::result::Result<Node, Error> {
                Ok(Node::composite(Arc::new(Mirror)).build())
            }
        }

        let err = Resolver::default()
            .resolve(Node::composite(Arc::new(Mirror)).build())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RecursionLimitExceeded { limit } if limit == crate::DEFAULT_MAX_DEPTH
        ));
    }

    #[tokio::test]
    async fn depth_counts_the_ancestor_path_only() {
        let leaf = component_fn("Leaf", |_| Ok(Node::from("leaf")));
        let wide = Node::from(vec![
            Node::composite(leaf.clone()).build(),
            Node::composite(leaf.clone()).build(),
            Node::composite(leaf).build(),
        ]);

        let resolver = Resolver::new(ResolveConfig::default().with_max_depth(1));
        assert!(resolver.resolve(wide).await.is_ok());

        let b = component_fn("B", |_| Ok(Node::from("x")));
        let a = component_fn("A", move |_| Ok(Node::composite(b.clone()).build()));
        let err = resolver
            .resolve(Node::composite(a).build())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RecursionLimitExceeded { limit: 1 }));
    }

    #[tokio::test]
    async fn cancellation_abandons_in_flight_components() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let token = CancellationToken::new();
        let resolver = Resolver::default().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = resolver
            .resolve(delayed("never", 10_000, &finished))
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, Error::Cancelled));
        assert!(finished.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_fails_before_starting() {
        let token = CancellationToken::new();
        token.cancel();
        let resolver = Resolver::default().with_cancellation(token);
        let err = resolver.resolve(Node::from("x")).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
