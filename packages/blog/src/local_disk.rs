//! Post store reading markdown files from a directory.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rsc_core::Error;

use crate::content::{check_slug, ContentStore, POST_EXTENSION};

/// Reads `<root>/<slug>.md` files.
#[derive(Debug, Clone)]
pub struct DiskContentStore {
    root: PathBuf,
}

impl DiskContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn post_path(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}.{}", slug, POST_EXTENSION))
    }
}

#[async_trait]
impl ContentStore for DiskContentStore {
    async fn list_slugs(&self) -> Result<Vec<String>, Error> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut slugs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(POST_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                slugs.push(stem.to_string());
            }
        }

        slugs.sort();
        tracing::debug!(root = %self.root.display(), count = slugs.len(), "listed posts");
        Ok(slugs)
    }

    async fn read_post(&self, slug: &str) -> Result<String, Error> {
        check_slug(slug)?;
        let path = self.post_path(slug);
        tracing::debug!(path = %path.display(), "reading post");

        // Any read failure means the post cannot be served
        tokio::fs::read_to_string(&path).await.map_err(|err| {
            Error::not_found(io::Error::new(
                err.kind(),
                format!("{}: {}", path.display(), err),
            ))
        })
    }
}
