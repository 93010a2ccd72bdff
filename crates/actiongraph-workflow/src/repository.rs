use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Where to fetch repository content from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryCoordinate {
  pub host: String,
  pub owner: String,
  pub name: String,
}

impl RepositoryCoordinate {
  pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      host: host.into(),
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Parse `owner/name`, `host/owner/name` or an `https://` URL of either.
  /// `default_host` is used when no host is given.
  pub fn parse(input: &str, default_host: &str) -> Result<Self, WorkflowError> {
    let trimmed = input.trim();
    let trimmed = trimmed
      .strip_prefix("https://")
      .or_else(|| trimmed.strip_prefix("http://"))
      .unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let parts: Vec<&str> = trimmed.split('/').collect();
    let (host, owner, name) = match parts.as_slice() {
      [owner, name] => (default_host, *owner, *name),
      [host, owner, name] => (*host, *owner, *name),
      _ => return Err(WorkflowError::InvalidRepository(input.to_string())),
    };

    if host.is_empty() || owner.is_empty() || name.is_empty() {
      return Err(WorkflowError::InvalidRepository(input.to_string()));
    }

    Ok(Self::new(host, owner, name))
  }

  /// `owner/name`.
  pub fn slug(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }

  /// Another repository on the same host.
  pub fn sibling(&self, owner: &str, name: &str) -> Self {
    Self::new(self.host.clone(), owner, name)
  }

  /// The same repository on another host.
  pub fn on_host(&self, host: &str) -> Self {
    Self::new(host, self.owner.clone(), self.name.clone())
  }

  /// Whether both coordinates name the same repository, ignoring host and case.
  pub fn same_repository(&self, other: &Self) -> bool {
    self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
  }

  pub fn is_on_host(&self, host: &str) -> bool {
    self.host.eq_ignore_ascii_case(host)
  }
}

impl fmt::Display for RepositoryCoordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.host, self.owner, self.name)
  }
}
