//! Application configuration: YAML file, then environment, then CLI flags.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use showcase_core::cache::CacheConfig;
use showcase_core::controller::ControllerConfig;
use showcase_core::layout::LayoutConstraints;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    /// Account whose repositories are shown
    pub user: Option<String>,

    /// Personal access token; never written back out
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub api_url: String,

    pub timeout_secs: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub dir: PathBuf,

    /// Lifetime of cached GitHub responses
    pub ttl_secs: u64,

    /// Random spread applied to `ttl_secs` (0.0 - 1.0)
    pub ttl_jitter: f64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("showcase"),
            ttl_secs: 3600,
            ttl_jitter: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GithubSettings,
    pub cache: CacheSettings,
    pub server: ServerSettings,
    pub controller: ControllerConfig,
    pub layout: LayoutConstraints,
}

impl AppConfig {
    /// Load from `path` (or the default location if it exists), then apply
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// `<config dir>/showcase/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("showcase").join("config.yaml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override settings from environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(user) = var("GITHUB_USER") {
            self.github.user = Some(user);
        }
        if let Some(token) = var("GITHUB_TOKEN") {
            debug!("Using GitHub token from environment");
            self.github.token = Some(token);
        }
        if let Some(url) = var("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(dir) = var("SHOWCASE_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
        if let Some(ttl) = var("SHOWCASE_CACHE_TTL_SECS") {
            self.cache.ttl_secs = ttl
                .parse()
                .with_context(|| format!("SHOWCASE_CACHE_TTL_SECS is not a number: {}", ttl))?;
        }
        if let Some(host) = var("SHOWCASE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SHOWCASE_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("SHOWCASE_PORT is not a port: {}", port))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.github.api_url.trim().is_empty() {
            bail!("github.api_url must not be empty");
        }
        if self.controller.max_sorts == 0 {
            bail!("controller.max_sorts must be at least 1");
        }
        self.cache_config().validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }

    /// Response cache settings derived from this configuration
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::builder()
            .default_ttl(Duration::from_secs(self.cache.ttl_secs))
            .ttl_jitter(self.cache.ttl_jitter)
            .build()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.github.timeout_secs.max(1))
    }
}
