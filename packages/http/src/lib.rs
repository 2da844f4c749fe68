//! # rsc-http
//!
//! The HTTP boundary of the blog: every `GET` is composed into a component
//! tree, resolved, and answered with the tree's JSON wire form.
//!
//! ```no_run
//! use std::sync::Arc;
//! use clap::Parser;
//! use rsc_http::{serve, RscService, ServerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), rsc_http::Error> {
//! let config = ServerConfig::parse_from(["rsc-blog-server", "--posts", "./posts"]);
//! let listener = tokio::net::TcpListener::bind(config.addr).await?;
//! let service = Arc::new(RscService::from_config(&config));
//! serve(listener, service, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Status mapping: a rendered page is `200 application/json`, a missing post
//! is `404`, methods other than `GET` and `HEAD` get `405`, and any other
//! failure is a `500` with an empty body.

pub mod config;
pub mod error;
pub mod server;
pub mod service;

pub use config::{ServerConfig, DEFAULT_ADDR};
pub use error::{Error, Result};
pub use server::{handle_connection, serve};
pub use service::{request_path, RscService, JSON_CONTENT_TYPE, REQUEST_ID_HEADER};
