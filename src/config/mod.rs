use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::core::NodeConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,

    /// Directories holding `<contract>/abi.json` files
    #[serde(default)]
    pub abi_paths: Vec<String>,
}

impl Config {
    pub fn abi_roots(&self) -> Vec<PathBuf> {
        self.abi_paths.iter().map(|p| expand_home(p)).collect()
    }

    /// Apply `NODE_URL` / `NODE_TOKEN` style overrides
    pub fn with_overrides(mut self, url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.node.url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.node.token = Some(token);
        }
        self
    }
}

/// Load configuration from the default location, falling back to defaults,
/// then apply environment overrides
pub fn load() -> Config {
    let config = config_path()
        .and_then(|path| match load_from(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "using default config");
                None
            }
        })
        .unwrap_or_default();

    config.with_overrides(
        std::env::var("NODE_URL").ok(),
        std::env::var("NODE_TOKEN").ok(),
    )
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ACTOR_CLIENT_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("actor-client").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("actor-client").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "actor-client", "actor-client")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
