//! Client context passed to every call

use std::fmt;

use serde::Deserialize;

use crate::config::Config;

/// Execution node endpoint and credentials
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Node RPC URL
    #[serde(default)]
    pub url: String,
    /// Bearer token for the node API
    #[serde(default)]
    pub token: Option<String>,
}

impl NodeConfig {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            url: url.into(),
            token,
        }
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Context available to every call
///
/// Built once by the caller and handed to each call, so several
/// independently configured clients can live in one process.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Node the transport submits to
    pub node: NodeConfig,
}

impl Context {
    pub fn new(node: NodeConfig) -> Self {
        Self { node }
    }

    /// Build a context from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            node: config.node.clone(),
        }
    }

    /// Node endpoint display string
    pub fn endpoint(&self) -> &str {
        &self.node.url
    }
}
