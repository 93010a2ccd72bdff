use actiongraph_workflow::RepositoryCoordinate;
use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ContentError;
use crate::ContentStore;

/// Serves `repository` from `local` and every other repository from `remote`.
pub struct OverlayStore<L: ContentStore, R: ContentStore> {
  repository: RepositoryCoordinate,
  local: L,
  remote: R,
}

impl<L: ContentStore, R: ContentStore> OverlayStore<L, R> {
  pub fn new(repository: RepositoryCoordinate, local: L, remote: R) -> Self {
    Self {
      repository,
      local,
      remote,
    }
  }

  fn is_local(&self, repo: &RepositoryCoordinate) -> bool {
    repo.same_repository(&self.repository) && repo.is_on_host(&self.repository.host)
  }
}

#[async_trait]
impl<L: ContentStore, R: ContentStore> ContentStore for OverlayStore<L, R> {
  async fn fetch(
    &self,
    repo: &RepositoryCoordinate,
    path: &str,
    revision: Option<&str>,
  ) -> Result<Bytes, ContentError> {
    if self.is_local(repo) {
      self.local.fetch(repo, path, revision).await
    } else {
      self.remote.fetch(repo, path, revision).await
    }
  }

  async fn list(
    &self,
    repo: &RepositoryCoordinate,
    dir: &str,
    revision: Option<&str>,
  ) -> Result<Vec<String>, ContentError> {
    if self.is_local(repo) {
      self.local.list(repo, dir, revision).await
    } else {
      self.remote.list(repo, dir, revision).await
    }
  }
}
