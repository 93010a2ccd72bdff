use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host used when a repository is given without one, and the default fallback.
pub const DEFAULT_HOST: &str = "github.com";

const CONFIG_FILE: &str = "config.json";

/// Settings for the `actiongraph` CLI.
///
/// Loaded from `<data_dir>/config.json` when present. Tokens from the
/// environment take precedence over the file; CLI flags take precedence over
/// both and are applied by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Host of the repository being inspected.
  #[serde(default = "default_host")]
  pub host: String,

  /// Host retried once when a cross-repository reference cannot be fetched
  /// from the current host.
  #[serde(default = "default_host")]
  pub fallback_host: String,

  /// Bearer token forwarded to the hosting API.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub token: Option<String>,

  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      host: default_host(),
      fallback_host: default_host(),
      token: None,
      user_agent: default_user_agent(),
    }
  }
}

fn default_host() -> String {
  DEFAULT_HOST.to_string()
}

fn default_user_agent() -> String {
  concat!("actiongraph/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Config {
  /// Default data directory, `~/.actiongraph`.
  pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
      .map(|home| home.join(".actiongraph"))
      .ok_or(ConfigError::NoHomeDir)
  }

  /// Load `config.json` from `data_dir`. A missing file yields the defaults.
  pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);

    let content = match std::fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(source) => return Err(ConfigError::Io { path, source }),
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Json { path, source })
  }

  /// Apply `GH_TOKEN` / `GITHUB_TOKEN` from the process environment.
  pub fn with_env(self) -> Self {
    self.with_env_from(|key| std::env::var(key).ok())
  }

  /// Apply token variables read through `lookup`. `GH_TOKEN` wins over
  /// `GITHUB_TOKEN`.
  pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let token = ["GH_TOKEN", "GITHUB_TOKEN"]
      .into_iter()
      .filter_map(&lookup)
      .find(|t| !t.trim().is_empty());

    if let Some(token) = token {
      self.token = Some(token);
    }
    self
  }
}
