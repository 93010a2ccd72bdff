//! actiongraph Content
//!
//! The I/O boundary of the resolver. A [`ContentStore`] turns
//! (repository, path, revision) into file bytes; a [`WorkflowIndex`] maps
//! numeric workflow ids to workflow paths.
//!
//! Implementations:
//! - [`GitHubStore`]: GitHub / GitHub Enterprise REST API.
//! - [`FsStore`]: a local checkout of a single repository.
//! - [`OverlayStore`]: serves one repository from a local store and
//!   everything else from a remote one.

mod error;
mod fs;
mod github;
mod overlay;

pub use error::ContentError;
pub use fs::FsStore;
pub use github::GitHubStore;
pub use overlay::OverlayStore;

use actiongraph_workflow::RepositoryCoordinate;
use async_trait::async_trait;
use bytes::Bytes;

/// Read access to repository files.
#[async_trait]
pub trait ContentStore: Send + Sync {
  /// Fetch the file at `path`. `revision` of `None` means the default branch.
  ///
  /// Returns [`ContentError::NotFound`] when the file does not exist.
  async fn fetch(
    &self,
    repo: &RepositoryCoordinate,
    path: &str,
    revision: Option<&str>,
  ) -> Result<Bytes, ContentError>;

  /// Paths of the regular files directly inside `dir`.
  async fn list(
    &self,
    repo: &RepositoryCoordinate,
    dir: &str,
    revision: Option<&str>,
  ) -> Result<Vec<String>, ContentError>;
}

/// Lookup of workflow paths by numeric id.
#[async_trait]
pub trait WorkflowIndex: Send + Sync {
  async fn workflow_path(&self, repo: &RepositoryCoordinate, id: u64)
  -> Result<String, ContentError>;
}
