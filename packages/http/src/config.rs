//! Command line configuration for the blog server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use rsc_blog::DEFAULT_AUTHOR;
use rsc_core::{ResolveConfig, DEFAULT_MAX_DEPTH};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8081";

#[derive(Debug, Clone, Parser)]
#[command(name = "rsc-blog-server", version, about = "Serve blog pages as resolved component trees")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// Directory holding the `*.md` posts
    #[arg(long, default_value = "./posts")]
    pub posts: PathBuf,

    /// Directory image sources are read from
    #[arg(long, default_value = ".")]
    pub images: PathBuf,

    /// Author shown in the page footer
    #[arg(long, default_value = DEFAULT_AUTHOR)]
    pub author: String,

    /// Maximum nesting of component invocations
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Resolve sibling components one at a time
    #[arg(long)]
    pub sequential: bool,
}

impl ServerConfig {
    pub fn resolve_config(&self) -> ResolveConfig {
        let config = ResolveConfig::default().with_max_depth(self.max_depth);
        if self.sequential {
            config.sequential()
        } else {
            config
        }
    }
}
