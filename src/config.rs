//! Configuration loading and validation.
//!
//! Values are resolved from built-in defaults, then an optional TOML file,
//! then environment variables. The CLI applies `--port` on top.

use crate::error::{ConfigError, Result};

use serde::Deserialize;

use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_DIRECTORY_REPO: &str = "github/org-chart";
const DEFAULT_DIRECTORY_PATH: &str = "org-chart.json";
const DEFAULT_API_VERSION: &str = "2022-11-28";

/// hubberbot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// Upstream API settings.
    pub github: GitHubConfig,
}

/// Where the public profile and the directory snapshot are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    /// REST API base URL, without a trailing slash.
    pub api_url: String,

    /// `owner/name` of the repository holding the directory snapshot.
    pub directory_repo: String,

    /// Path of the snapshot file inside `directory_repo`.
    pub directory_path: String,

    /// Value pinned in the `X-GitHub-Api-Version` header.
    pub api_version: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            directory_repo: DEFAULT_DIRECTORY_REPO.into(),
            directory_path: DEFAULT_DIRECTORY_PATH.into(),
            api_version: DEFAULT_API_VERSION.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            github: GitHubConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    bind: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    github: TomlGitHubConfig,
}

#[derive(Debug, Default, Deserialize)]
struct TomlGitHubConfig {
    api_url: Option<String>,
    directory_repo: Option<String>,
    directory_path: Option<String>,
    api_version: Option<String>,
}

impl Config {
    /// Load configuration from defaults and the process environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Load {
            path: path.display().to_string(),
            source: error.into(),
        })?;

        let toml_config: TomlConfig =
            toml::from_str(&content).map_err(|error| ConfigError::Parse {
                path: path.display().to_string(),
                source: Box::new(error),
            })?;

        let mut config = Self::from_toml(toml_config);
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_toml(toml_config: TomlConfig) -> Self {
        let defaults = Self::default();
        let github = toml_config.github;

        Self {
            bind: toml_config.bind.unwrap_or(defaults.bind),
            port: toml_config.port.unwrap_or(defaults.port),
            github: GitHubConfig {
                api_url: github
                    .api_url
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.github.api_url),
                directory_repo: github
                    .directory_repo
                    .unwrap_or(defaults.github.directory_repo),
                directory_path: github
                    .directory_path
                    .unwrap_or(defaults.github.directory_path),
                api_version: github.api_version.unwrap_or(defaults.github.api_version),
            },
        }
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(bind) = var("HUBBERBOT_BIND") {
            self.bind = bind;
        }
        if let Some(api_url) = var("HUBBERBOT_GITHUB_API_URL") {
            self.github.api_url = api_url.trim_end_matches('/').to_string();
        }
        if let Some(repo) = var("HUBBERBOT_DIRECTORY_REPO") {
            self.github.directory_repo = repo;
        }
        if let Some(path) = var("HUBBERBOT_DIRECTORY_PATH") {
            self.github.directory_path = path;
        }

        Ok(())
    }

    /// Resolve the listening socket address. IPv6 binds may be bracketed or bare.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let raw_bind = self.bind.trim_start_matches('[').trim_end_matches(']');
        let bind_str = if raw_bind.contains(':') {
            format!("[{}]:{}", raw_bind, self.port)
        } else {
            format!("{}:{}", raw_bind, self.port)
        };

        bind_str.parse::<SocketAddr>().map_err(|error| {
            ConfigError::Invalid(format!("invalid bind address '{}': {}", bind_str, error)).into()
        })
    }
}
