use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while decoding a workflow or action file.
#[derive(Debug, Error)]
pub enum ParseError {
  /// The document is empty or only whitespace.
  #[error("empty document")]
  Empty,

  /// The bytes are not valid UTF-8.
  #[error("document is not valid UTF-8: {0}")]
  Utf8(#[from] std::str::Utf8Error),

  /// The YAML is malformed or does not match the schema.
  #[error("invalid YAML: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}")]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("could not determine home directory")]
  NoHomeDir,
}
