//! # rsc-blog
//!
//! A small blog built on `rsc-core` server components: posts are markdown
//! files, rendered into host-element trees with images inlined as data URLs.
//!
//! ```rust
//! use std::sync::Arc;
//! use rsc_blog::{Blog, FsImageLoader, InMemoryContentStore, Theme};
//!
//! let content = InMemoryContentStore::new().with_post("hello", "# Hello\n\nWorld");
//! let blog = Blog::new(Arc::new(content), Arc::new(FsImageLoader::new("."))).with_author("Sam");
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let page = runtime
//!     .block_on(rsc_core::resolve(blog.page("/hello", &Theme::default(), 2024)))
//!     .unwrap();
//! assert_eq!(page.as_host().unwrap().tag, "html");
//! ```

mod content;
mod image;
mod in_memory;
mod local_disk;
mod markdown;
mod pages;
mod sanitize;

pub use content::{ContentStore, POST_EXTENSION};
pub use image::{png_data_url, FsImageLoader, ImageComponent, ImageLoader, LoadedImage};
pub use in_memory::InMemoryContentStore;
pub use local_disk::DiskContentStore;
pub use markdown::Markdown;
pub use pages::{Blog, Theme, BACKGROUND_COLORS, DEFAULT_AUTHOR};
pub use sanitize::{sanitize_filename, MAX_FILENAME_BYTES};
