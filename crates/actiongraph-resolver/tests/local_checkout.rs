//! Resolution of a local checkout whose workflows call into other repositories.

use std::collections::HashMap;
use std::path::Path;

use actiongraph_content::{ContentError, ContentStore, FsStore, OverlayStore};
use actiongraph_resolver::{Resolver, ResolverConfig, StandardResolver};
use actiongraph_workflow::{RepositoryCoordinate, distinct_actions, expand, filter};
use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// Remote repositories keyed by `owner/name:path`, on any host.
struct RemoteRepos(HashMap<String, &'static str>);

#[async_trait]
impl ContentStore for RemoteRepos {
  async fn fetch(
    &self,
    repo: &RepositoryCoordinate,
    path: &str,
    _revision: Option<&str>,
  ) -> Result<Bytes, ContentError> {
    let key = format!("{}:{}", repo.slug(), path);
    self
      .0
      .get(&key)
      .map(|content| Bytes::from_static(content.as_bytes()))
      .ok_or(ContentError::NotFound(key))
  }

  async fn list(
    &self,
    repo: &RepositoryCoordinate,
    dir: &str,
    _revision: Option<&str>,
  ) -> Result<Vec<String>, ContentError> {
    Err(ContentError::NotFound(format!("{}:{}", repo.slug(), dir)))
  }
}

fn write(root: &Path, path: &str, content: &str) {
  let full = root.join(path);
  std::fs::create_dir_all(full.parent().unwrap()).unwrap();
  std::fs::write(full, content).unwrap();
}

fn checkout() -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  write(
    dir.path(),
    ".github/workflows/ci.yml",
    r#"
name: CI
on: push
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: ./.github/actions/setup
  release:
    uses: org/shared/.github/workflows/release.yml@v1
"#,
  );
  write(
    dir.path(),
    ".github/workflows/lint.yaml",
    "name: Lint\njobs:\n  lint:\n    steps:\n      - uses: actions/checkout@v4\n",
  );
  write(dir.path(), ".github/workflows/notes.txt", "not a workflow");
  write(
    dir.path(),
    ".github/actions/setup/action.yml",
    "runs:\n  using: composite\n  steps:\n    - uses: actions/setup-node@v4\n",
  );
  dir
}

fn remote() -> RemoteRepos {
  RemoteRepos(HashMap::from([
    (
      "actions/checkout:action.yml".to_string(),
      "runs:\n  using: node20\n",
    ),
    (
      "actions/setup-node:action.yml".to_string(),
      "runs:\n  using: node20\n",
    ),
    (
      "org/shared:.github/workflows/release.yml".to_string(),
      "name: Release\njobs:\n  publish:\n    steps:\n      - uses: docker://alpine:3\n",
    ),
  ]))
}

#[tokio::test]
async fn test_resolve_local_checkout() {
  let dir = checkout();
  let root = RepositoryCoordinate::new("github.com", "octo", "app");
  let store = OverlayStore::new(root.clone(), FsStore::new(dir.path()), remote());
  let resolver = StandardResolver::new(store, ResolverConfig::default());
  let cancel = CancellationToken::new();

  let roots = resolver.load_workflows(&root, None, &cancel).await.unwrap();
  assert_eq!(roots.len(), 2);

  let all = resolver.resolve(&root, None, roots, true, &cancel).await.unwrap();
  let sources: Vec<&str> = all.iter().map(|r| r.source.as_str()).collect();
  assert_eq!(
    sources,
    vec![
      ".github/workflows/ci.yml",
      ".github/workflows/lint.yaml",
      "actions/checkout:action.yml",
      ".github/actions/setup/action.yml",
      "org/shared:.github/workflows/release.yml",
      "actions/setup-node:action.yml",
    ]
  );

  // Lint only reaches the checkout action.
  let lint = expand(&filter(&all, "lint"), &all);
  assert_eq!(lint.len(), 2);
  assert_eq!(lint[1].source, "actions/checkout:action.yml");

  let ci = expand(&filter(&all, "ci.yml"), &all);
  assert_eq!(ci.len(), 5);

  let actions: Vec<String> = distinct_actions(&all).iter().map(|a| a.to_string()).collect();
  assert!(actions.contains(&"actions/checkout@v4".to_string()));
  assert!(actions.contains(&"docker://alpine:3".to_string()));
  assert!(actions.contains(&"org/shared/.github/workflows/release.yml@v1".to_string()));
}

#[tokio::test]
async fn test_missing_workflow_directory_is_fatal() {
  let dir = tempfile::tempdir().unwrap();
  let root = RepositoryCoordinate::new("github.com", "octo", "empty");
  let store = OverlayStore::new(root.clone(), FsStore::new(dir.path()), remote());
  let resolver = StandardResolver::new(store, ResolverConfig::default());

  let result = resolver
    .load_workflows(&root, None, &CancellationToken::new())
    .await;
  assert!(result.is_err());
}
