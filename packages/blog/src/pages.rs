//! The blog's components and the page composition entry point.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rsc_core::{Component, Error, Node, Props, PropsExt};

use crate::content::ContentStore;
use crate::image::{ImageComponent, ImageLoader};
use crate::markdown::Markdown;
use crate::sanitize::sanitize_filename;

/// Page background palette.
pub const BACKGROUND_COLORS: [&str; 5] = ["#EAF2E3", "#61E8E1", "#F25757", "#F2E863", "#F2CD60"];

/// Author shown in the footer unless configured otherwise.
pub const DEFAULT_AUTHOR: &str = "Jae Doe";

/// Per-request presentation choices, picked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: String,
}

impl Theme {
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            background: background.into(),
        }
    }

    /// Palette entry `index`, wrapping around.
    pub fn from_index(index: usize) -> Self {
        Self::new(BACKGROUND_COLORS[index % BACKGROUND_COLORS.len()])
    }

    pub fn random() -> Self {
        Self::from_index(rand::thread_rng().gen_range(0..BACKGROUND_COLORS.len()))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_index(0)
    }
}

/// Entry point of the composition layer: builds the root node for a path.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use rsc_blog::{Blog, FsImageLoader, InMemoryContentStore, Theme};
///
/// let blog = Blog::new(
///     Arc::new(InMemoryContentStore::new().with_post("hello", "# Hello")),
///     Arc::new(FsImageLoader::new(".")),
/// );
/// let root = blog.page("/hello", &Theme::default(), 2024);
/// assert!(!root.is_resolved());
/// ```
#[derive(Clone)]
pub struct Blog {
    router: Arc<dyn Component>,
    author: String,
}

impl Blog {
    pub fn new(content: Arc<dyn ContentStore>, images: Arc<dyn ImageLoader>) -> Self {
        let image: Arc<dyn Component> = Arc::new(ImageComponent::new(images));
        let markdown: Arc<dyn Component> =
            Arc::new(Markdown::new().with_image_component(image));
        let post: Arc<dyn Component> = Arc::new(Post {
            content: content.clone(),
            markdown,
        });
        let index: Arc<dyn Component> = Arc::new(BlogIndexPage {
            content,
            post: post.clone(),
        });
        let post_page: Arc<dyn Component> = Arc::new(BlogPostPage { post });
        let layout: Arc<dyn Component> = Arc::new(BlogLayout {
            footer: Arc::new(Footer),
        });

        Self {
            router: Arc::new(Router {
                layout,
                index,
                post_page,
            }),
            author: DEFAULT_AUTHOR.to_string(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Root node for `path` (the URL path, starting with `/`).
    pub fn page(&self, path: &str, theme: &Theme, year: i32) -> Node {
        Node::composite(self.router.clone())
            .prop("path", path)
            .prop("background", theme.background.as_str())
            .prop("author", self.author.as_str())
            .prop("year", year)
            .build()
    }
}

/// Picks the page for a path and wraps it in the layout.
struct Router {
    layout: Arc<dyn Component>,
    index: Arc<dyn Component>,
    post_page: Arc<dyn Component>,
}

#[async_trait]
impl Component for Router {
    fn name(&self) -> &str {
        "Router"
    }

    async fn render(&self, mut props: Props) -> Result<Node, Error> {
        let path = match props.remove("path") {
            Some(Node::String(path)) => path,
            _ => return Err(Error::invalid_props(self.name(), "missing string prop 'path'")),
        };

        let page = if path == "/" {
            Node::composite(self.index.clone()).build()
        } else {
            let slug = sanitize_filename(path.strip_prefix('/').unwrap_or(&path));
            Node::composite(self.post_page.clone())
                .prop("postSlug", slug)
                .build()
        };

        Ok(Node::composite(self.layout.clone())
            .props(props)
            .child(page)
            .build())
    }
}

struct BlogLayout {
    footer: Arc<dyn Component>,
}

#[async_trait]
impl Component for BlogLayout {
    fn name(&self) -> &str {
        "BlogLayout"
    }

    async fn render(&self, mut props: Props) -> Result<Node, Error> {
        let children = props.take_children();
        let background = props.get("background").cloned().unwrap_or_default();
        let author = props.get("author").cloned().unwrap_or_default();
        let year = props.get("year").cloned().unwrap_or_default();

        let mut style = Props::new();
        style.insert("backgroundColor".to_string(), background);
        style.insert(
            "transitionProperty".to_string(),
            Node::from("background-color"),
        );
        style.insert("transitionDuration".to_string(), Node::from("1s"));
        style.insert("transitionTimingFunction".to_string(), Node::from("linear"));

        let nav = Node::host("nav")
            .child(Node::host("a").prop("href", "/").child("Home"))
            .child(Node::host("hr"))
            .child(Node::host("input"))
            .child(Node::host("hr"));

        let body = Node::host("body")
            .prop("style", Node::Map(style))
            .child(nav)
            .child(Node::host("main").prop("children", children))
            .child(
                Node::composite(self.footer.clone())
                    .prop("author", author)
                    .prop("year", year),
            );

        Ok(Node::host("html").child(body).build())
    }
}

struct Footer;

#[async_trait]
impl Component for Footer {
    fn name(&self) -> &str {
        "Footer"
    }

    async fn render(&self, props: Props) -> Result<Node, Error> {
        let author = props.get("author").cloned().unwrap_or_default();
        let year = props.get("year").cloned().unwrap_or_default();

        let signature = Node::host("i")
            .child("(c) ")
            .child(author)
            .child(" ")
            .child(year);

        Ok(Node::host("footer")
            .child(Node::host("hr"))
            .child(Node::host("p").child(signature))
            .build())
    }
}

struct BlogIndexPage {
    content: Arc<dyn ContentStore>,
    post: Arc<dyn Component>,
}

#[async_trait]
impl Component for BlogIndexPage {
    fn name(&self) -> &str {
        "BlogIndexPage"
    }

    async fn render(&self, _props: Props) -> Result<Node, Error> {
        let slugs = self.content.list_slugs().await?;
        tracing::debug!(count = slugs.len(), "rendering index");

        let posts = slugs.into_iter().map(|slug| {
            Node::composite(self.post.clone())
                .key(slug.as_str())
                .prop("slug", slug)
        });

        Ok(Node::host("section")
            .child(Node::group(vec![
                Node::host("h1").child("Welcome to my blog").build(),
                Node::host("div").children(posts).build(),
            ]))
            .build())
    }
}

struct BlogPostPage {
    post: Arc<dyn Component>,
}

#[async_trait]
impl Component for BlogPostPage {
    fn name(&self) -> &str {
        "BlogPostPage"
    }

    async fn render(&self, props: Props) -> Result<Node, Error> {
        let slug = props.require_str(self.name(), "postSlug")?;
        Ok(Node::composite(self.post.clone()).prop("slug", slug).build())
    }
}

struct Post {
    content: Arc<dyn ContentStore>,
    markdown: Arc<dyn Component>,
}

#[async_trait]
impl Component for Post {
    fn name(&self) -> &str {
        "Post"
    }

    async fn render(&self, props: Props) -> Result<Node, Error> {
        let slug = props.require_str(self.name(), "slug")?;
        let content = self.content.read_post(slug).await?;

        let heading = Node::host("h2").child(
            Node::host("a")
                .prop("href", format!("/{}", slug))
                .child(slug),
        );

        Ok(Node::host("section")
            .child(heading)
            .child(Node::composite(self.markdown.clone()).child(content))
            .build())
    }
}
