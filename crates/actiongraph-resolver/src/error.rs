//! Resolution errors.

use actiongraph_config::ParseError;
use actiongraph_content::ContentError;

/// Errors that can occur during dependency resolution.
///
/// Only the root variants and [`ResolveError::Cancelled`] ever reach the
/// caller of [`Resolver::resolve`](crate::Resolver::resolve); fetch failures of
/// discovered dependencies are dropped where they occur.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
  /// A root workflow file (or the workflow directory) could not be fetched.
  #[error("failed to fetch root workflow '{path}'")]
  RootFetch {
    path: String,
    #[source]
    source: ContentError,
  },

  /// A root workflow file could not be decoded.
  #[error("failed to parse root workflow '{path}'")]
  RootParse {
    path: String,
    #[source]
    source: ParseError,
  },

  /// A file could not be fetched.
  #[error("failed to fetch '{path}'")]
  Fetch {
    path: String,
    #[source]
    source: ContentError,
  },

  /// A numeric workflow selector could not be mapped to a path.
  #[error("failed to look up workflow id {id}")]
  WorkflowLookup {
    id: u64,
    #[source]
    source: ContentError,
  },

  /// Resolution was cancelled.
  #[error("resolution cancelled")]
  Cancelled,
}

impl ResolveError {
  /// Re-label a fetch failure as a failure of the root file `path`.
  pub(crate) fn into_root(self, path: &str) -> Self {
    match self {
      ResolveError::Fetch { source, .. } => ResolveError::RootFetch {
        path: path.to_string(),
        source,
      },
      other => other,
    }
  }
}
