//! Where blog posts come from.

use async_trait::async_trait;
use rsc_core::Error;

use crate::sanitize::sanitize_filename;

/// File extension of post sources.
pub const POST_EXTENSION: &str = "md";

/// Read access to the markdown sources of blog posts.
///
/// # Object Safety
///
/// This trait is object-safe: components hold an `Arc<dyn ContentStore>`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Slugs of every post, sorted.
    async fn list_slugs(&self) -> Result<Vec<String>, Error>;

    /// Markdown source of the post `slug`.
    ///
    /// Fails with [`Error::NotFound`] when the post does not exist.
    async fn read_post(&self, slug: &str) -> Result<String, Error>;
}

/// Reject slugs that would not survive sanitization unchanged.
pub(crate) fn check_slug(slug: &str) -> Result<(), Error> {
    if slug.is_empty() || sanitize_filename(slug) != slug {
        return Err(Error::not_found(format!("invalid post slug '{}'", slug)));
    }
    Ok(())
}
