//! Images inlined into posts as PNG data URLs.

use std::io::Cursor;
use std::path::{Component as PathComponent, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use image::ImageFormat;
use rsc_core::{Component, Error, Node, Props, PropsExt};
use url::Url;

/// A decoded image ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// `data:image/png;base64,...`
    pub data_url: String,
}

/// Loads the image a post refers to.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, src: &str) -> Result<LoadedImage, Error>;
}

/// Decode raw image bytes and re-encode them as a PNG data URL.
pub fn png_data_url(bytes: &[u8]) -> Result<LoadedImage, Error> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| Error::component("Image", format!("decode failed: {}", err)))?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| Error::component("Image", format!("encode failed: {}", err)))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(LoadedImage {
        width: decoded.width(),
        height: decoded.height(),
        data_url: format!("data:image/png;base64,{}", encoded),
    })
}

/// Loads images from files below a root directory. Absolute `http` and
/// `https` sources are fetched instead.
///
/// Decoding runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
    client: reqwest::Client,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, url: Url) -> Result<Vec<u8>, Error> {
        tracing::debug!(%url, "fetching image");
        let failed =
            |err: reqwest::Error| Error::component("Image", format!("fetching {}: {}", url, err));

        let response = self.client.get(url.clone()).send().await.map_err(failed)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("image {} does not exist", url)));
        }
        let response = response.error_for_status().map_err(failed)?;
        let bytes = response.bytes().await.map_err(failed)?;
        Ok(bytes.to_vec())
    }

    /// Map `src` to a file under the root. Absolute sources are taken as
    /// relative to the root; `..` is refused.
    fn file_path(&self, src: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(src.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, PathComponent::Normal(_) | PathComponent::CurDir));
        if escapes || src.is_empty() {
            return Err(Error::not_found(format!("image '{}' is outside the image root", src)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, src: &str) -> Result<LoadedImage, Error> {
        let bytes = match remote_url(src) {
            Some(url) => self.fetch(url).await?,
            None => {
                let path = self.file_path(src)?;
                tracing::debug!(path = %path.display(), "loading image");
                tokio::fs::read(&path).await?
            }
        };
        tokio::task::spawn_blocking(move || png_data_url(&bytes))
            .await
            .map_err(|err| Error::component("Image", format!("decode task failed: {}", err)))?
    }
}

fn remote_url(src: &str) -> Option<Url> {
    Url::parse(src)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Renders an image with its measures below it.
///
/// Props are forwarded to the `img` element, with `src` replaced by the
/// inlined data URL.
pub struct ImageComponent {
    loader: Arc<dyn ImageLoader>,
}

impl ImageComponent {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl Component for ImageComponent {
    fn name(&self) -> &str {
        "Image"
    }

    async fn render(&self, mut props: Props) -> Result<Node, Error> {
        let src = props.require_str(self.name(), "src")?.to_string();
        let image = self.loader.load(&src).await?;
        props.insert("src".to_string(), Node::from(image.data_url));

        let img = Node::host("img").props(props);
        let measures = Node::host("p")
            .child("Measures: ")
            .child(Node::host("br"))
            .child(" Width: ")
            .child(image.width)
            .child(Node::host("br"))
            .child(" Height:")
            .child(" ")
            .child(image.height);

        Ok(Node::host("div").child(img).child(measures).build())
    }
}
