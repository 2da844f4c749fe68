//! Resolver configuration.

use serde::{Deserialize, Serialize};

/// Default bound on transitive component nesting.
///
/// Every level nests another boxed future inside the one polling it, so the
/// bound also has to fit a 2 MiB worker stack in unoptimized builds.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for the [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Maximum number of component invocations along one ancestor path.
    pub max_depth: usize,

    /// Resolve siblings concurrently. Output order is the same either way.
    pub concurrent: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrent: true,
        }
    }
}

impl ResolveConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.concurrent = false;
        self
    }
}
