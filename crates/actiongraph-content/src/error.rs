/// Error type for content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
  /// The requested file or directory does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The server answered with a non-success status.
  #[error("request to {url} failed with status {status}")]
  Status { url: String, status: u16 },

  /// The path escapes the repository or is otherwise unusable.
  #[error("invalid path: {0}")]
  InvalidPath(String),

  /// The response body did not have the expected shape.
  #[error("unexpected response from {url}: {message}")]
  InvalidResponse { url: String, message: String },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ContentError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, ContentError::NotFound(_))
  }
}
