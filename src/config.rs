//! Configuration management for streamgate
//!
//! Handles config file loading/saving. Config is stored at
//! ~/.config/streamgate/config.toml; STREAMGATE_CONFIG overrides the path.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rank;
use crate::render::TemplateBlob;

/// One upstream addon entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Display label; defaults to the URL host
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    /// Extraction ruleset: a built-in name (`torrentio`, …) or an inline blob
    #[serde(default)]
    pub extractor: Option<String>,
    #[serde(default)]
    pub reconfigure_store: bool,
    #[serde(default)]
    pub no_content_proxy: bool,
}

impl UpstreamConfig {
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()
            .unwrap_or(&self.url)
            .to_string()
    }
}

/// One backend account binding; order is cache-check priority
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend name (`realdebrid`) or code (`rd`)
    pub name: String,
    pub token: String,
    /// Endpoint exposing the uniform store API
    pub api_url: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway base URL that deferred resolution links hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the informational failure videos live; defaults under base_url
    #[serde(default)]
    pub static_video_base: Option<String>,
    /// Sort order, e.g. `-resolution,-quality,-size`
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub cached_only: bool,
    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,
    #[serde(default)]
    pub stores: Vec<StoreConfig>,
    /// Display templates; empty means the built-in default
    #[serde(default)]
    pub template: Option<TemplateBlob>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_sort() -> String {
    rank::DEFAULT_SORT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            static_video_base: None,
            sort: default_sort(),
            cached_only: false,
            upstreams: Vec::new(),
            stores: Vec::new(),
            template: None,
        }
    }
}

impl Config {
    /// Get config file path (~/.config/streamgate/config.toml)
    pub fn path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("STREAMGATE_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|p| p.join("streamgate").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path =
            Self::path().ok_or_else(|| anyhow::anyhow!("could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    pub fn static_video_base(&self) -> String {
        self.static_video_base
            .clone()
            .unwrap_or_else(|| format!("{}/videos", self.base_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sort, "-resolution,-quality,-size");
        assert!(config.upstreams.is_empty());
        assert!(config.stores.is_empty());
        assert!(!config.cached_only);
    }

    #[test]
    fn test_config_parses_toml() {
        let config: Config = toml::from_str(
            r#"
            base_url = "https://gw.example"
            sort = "-size"
            cached_only = true

            [[upstreams]]
            name = "Torrentio"
            url = "https://torrentio.strem.fun"
            extractor = "torrentio"

            [[stores]]
            name = "realdebrid"
            token = "secret"
            api_url = "https://store.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://gw.example");
        assert!(config.cached_only);
        assert_eq!(config.upstreams.len(), 1);
        assert_eq!(config.upstreams[0].label(), "Torrentio");
        assert_eq!(config.stores[0].name, "realdebrid");
    }

    #[test]
    fn test_upstream_label_falls_back_to_host() {
        let up = UpstreamConfig {
            name: None,
            url: "https://torrentio.strem.fun/config".to_string(),
            extractor: None,
            reconfigure_store: false,
            no_content_proxy: false,
        };
        assert_eq!(up.label(), "torrentio.strem.fun");
    }

    #[test]
    fn test_static_video_base_defaults_under_base_url() {
        let config = Config {
            base_url: "https://gw.example/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.static_video_base(), "https://gw.example/videos");
    }
}
