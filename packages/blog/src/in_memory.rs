//! In-memory post store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rsc_core::Error;

use crate::content::{check_slug, ContentStore};

/// A post store backed by a map from slug to markdown.
///
/// # Example
///
/// ```rust
/// use rsc_blog::{ContentStore, InMemoryContentStore};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let store = InMemoryContentStore::new().with_post("hello", "# Hello");
/// assert_eq!(store.list_slugs().await.unwrap(), vec!["hello".to_string()]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    posts: BTreeMap<String, String>,
}

impl InMemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a post.
    pub fn with_post(mut self, slug: impl Into<String>, markdown: impl Into<String>) -> Self {
        self.insert(slug, markdown);
        self
    }

    pub fn insert(&mut self, slug: impl Into<String>, markdown: impl Into<String>) {
        self.posts.insert(slug.into(), markdown.into());
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_slugs(&self) -> Result<Vec<String>, Error> {
        Ok(self.posts.keys().cloned().collect())
    }

    async fn read_post(&self, slug: &str) -> Result<String, Error> {
        check_slug(slug)?;
        self.posts
            .get(slug)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no post named '{}'", slug)))
    }
}
