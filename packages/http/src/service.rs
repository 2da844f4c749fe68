//! Request handling: compose the page for a path, resolve it, encode it.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Datelike, Utc};
use http::header::{self, HeaderValue};
use http::request::Parts;
use http::{Method, Request, Response, StatusCode, Uri};
use http_body_util::Full;
use rsc_blog::{Blog, DiskContentStore, FsImageLoader, Theme};
use rsc_core::{encode, CancellationToken, ResolveConfig, Resolver};
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{Error, Result};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Turns request paths into encoded component trees.
pub struct RscService {
    blog: Blog,
    resolver: Resolver,
}

impl RscService {
    pub fn new(blog: Blog, config: ResolveConfig) -> Self {
        Self {
            blog,
            resolver: Resolver::new(config),
        }
    }

    /// Build the service described by the command line.
    pub fn from_config(config: &ServerConfig) -> Self {
        let blog = Blog::new(
            Arc::new(DiskContentStore::new(&config.posts)),
            Arc::new(FsImageLoader::new(&config.images)),
        )
        .with_author(config.author.as_str());
        Self::new(blog, config.resolve_config())
    }

    /// Abort in-flight renders once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.resolver = self.resolver.with_cancellation(token);
        self
    }

    /// Render `path` with a random background and the current year.
    pub async fn render(&self, path: &str) -> Result<String> {
        self.render_with(path, &Theme::random(), Utc::now().year())
            .await
    }

    pub async fn render_with(&self, path: &str, theme: &Theme, year: i32) -> Result<String> {
        let root = self.blog.page(path, theme, year);
        let tree = self.resolver.resolve(root).await?;
        Ok(encode(&tree)?)
    }

    /// Answer one HTTP request. Never fails: errors map to status codes.
    pub async fn respond<B>(&self, request: Request<B>) -> Response<Full<Bytes>> {
        let (parts, _body) = request.into_parts();
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "request",
            id = %request_id,
            method = %parts.method,
            path = parts.uri.path(),
        );

        let mut response = self.dispatch(&parts).instrument(span).await;
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    async fn dispatch(&self, parts: &Parts) -> Response<Full<Bytes>> {
        if parts.method != Method::GET && parts.method != Method::HEAD {
            tracing::debug!("method not allowed");
            let mut response = status_only(StatusCode::METHOD_NOT_ALLOWED);
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
            return response;
        }

        let rendered = match request_path(&parts.uri) {
            Ok(path) => self.render(&path).await,
            Err(err) => Err(err),
        };

        match rendered {
            Ok(body) => {
                tracing::debug!(bytes = body.len(), "rendered");
                let length = HeaderValue::from(body.len());
                let body = if parts.method == Method::HEAD {
                    Bytes::new()
                } else {
                    Bytes::from(body)
                };
                let mut response = with_status(StatusCode::OK, body);
                let headers = response.headers_mut();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                headers.insert(header::CONTENT_LENGTH, length);
                response
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(error = %err, "not found");
                status_only(StatusCode::NOT_FOUND)
            }
            Err(err @ Error::InvalidPath(_)) => {
                tracing::warn!(error = %err, "unparseable request path");
                status_only(StatusCode::BAD_REQUEST)
            }
            Err(err) => {
                tracing::error!(error = %err, "render failed");
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Normalized path of a request target (dot segments removed).
pub fn request_path(uri: &Uri) -> Result<String> {
    let base = Url::parse("http://localhost/")?;
    Ok(base.join(uri.path())?.path().to_string())
}

fn with_status(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
}

fn status_only(status: StatusCode) -> Response<Full<Bytes>> {
    with_status(status, Bytes::new())
}
