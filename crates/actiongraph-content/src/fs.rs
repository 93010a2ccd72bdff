use std::path::{Component, Path, PathBuf};

use actiongraph_workflow::RepositoryCoordinate;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::error::ContentError;
use crate::ContentStore;

/// Content store over a local checkout.
///
/// Serves whatever is on disk under `root`; the repository coordinate and the
/// revision are ignored. Usually wrapped in an [`OverlayStore`](crate::OverlayStore)
/// so only the checked out repository is read from here.
pub struct FsStore {
  root: PathBuf,
}

impl FsStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Join `path` below the root, rejecting anything that would leave it.
  fn resolve(&self, path: &str) -> Result<PathBuf, ContentError> {
    let relative = Path::new(path);
    let escapes = relative
      .components()
      .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
      return Err(ContentError::InvalidPath(path.to_string()));
    }
    Ok(self.root.join(relative))
  }
}

fn not_found(e: std::io::Error, path: &str) -> ContentError {
  if e.kind() == std::io::ErrorKind::NotFound {
    ContentError::NotFound(path.to_string())
  } else {
    ContentError::Io(e)
  }
}

#[async_trait]
impl ContentStore for FsStore {
  async fn fetch(
    &self,
    _repo: &RepositoryCoordinate,
    path: &str,
    _revision: Option<&str>,
  ) -> Result<Bytes, ContentError> {
    let full = self.resolve(path)?;
    let content = fs::read(&full).await.map_err(|e| not_found(e, path))?;
    Ok(Bytes::from(content))
  }

  async fn list(
    &self,
    _repo: &RepositoryCoordinate,
    dir: &str,
    _revision: Option<&str>,
  ) -> Result<Vec<String>, ContentError> {
    let full = self.resolve(dir)?;
    let mut entries = fs::read_dir(&full).await.map_err(|e| not_found(e, dir))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_file() {
        continue;
      }
      if let Some(name) = entry.file_name().to_str() {
        files.push(format!("{}/{}", dir.trim_end_matches('/'), name));
      }
    }

    files.sort();
    Ok(files)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn repo() -> RepositoryCoordinate {
    RepositoryCoordinate::new("github.com", "octo", "app")
  }

  #[tokio::test]
  async fn test_fetch_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let workflows = dir.path().join(".github/workflows");
    std::fs::create_dir_all(workflows.join("nested")).unwrap();
    std::fs::write(workflows.join("ci.yml"), "name: CI\n").unwrap();
    std::fs::write(workflows.join("a.yaml"), "name: A\n").unwrap();

    let store = FsStore::new(dir.path());

    let content = store
      .fetch(&repo(), ".github/workflows/ci.yml", None)
      .await
      .unwrap();
    assert_eq!(&content[..], b"name: CI\n");

    let files = store.list(&repo(), ".github/workflows", None).await.unwrap();
    assert_eq!(
      files,
      vec![".github/workflows/a.yaml", ".github/workflows/ci.yml"]
    );
  }

  #[tokio::test]
  async fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    let err = store.fetch(&repo(), "action.yml", None).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.list(&repo(), ".github/workflows", None).await.unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn test_rejects_paths_outside_root() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    for path in ["../secret", "/etc/passwd"] {
      let err = store.fetch(&repo(), path, None).await.unwrap_err();
      assert!(matches!(err, ContentError::InvalidPath(_)), "path {}", path);
    }
  }
}
