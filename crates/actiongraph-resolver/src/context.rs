//! Per-call traversal state.

use std::collections::HashSet;

use actiongraph_workflow::{
  ActionReference, Origin, RepositoryCoordinate, WorkflowDependency, repo_key,
};

/// Repository, revision and key namespace a record was fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Scope {
  pub repo: RepositoryCoordinate,
  pub revision: Option<String>,
  pub origin: Origin,
}

impl Scope {
  pub fn root(repo: RepositoryCoordinate, revision: Option<&str>) -> Self {
    Self {
      repo,
      revision: non_empty(revision),
      origin: Origin::Root,
    }
  }

  pub fn foreign(repo: RepositoryCoordinate, git_ref: &str) -> Self {
    let origin = Origin::foreign(&repo.owner, &repo.name);
    Self {
      repo,
      revision: non_empty(Some(git_ref)),
      origin,
    }
  }

  pub fn revision(&self) -> Option<&str> {
    self.revision.as_deref()
  }

  /// Record source of `path` fetched in this scope.
  pub fn source_for(&self, path: &str) -> String {
    self.origin.source_for(path)
  }

  /// Visited key of an action directory in this scope. Matches the key a
  /// remote reference to the same directory would produce.
  pub fn dir_key(&self, dir: &str) -> String {
    match &self.origin {
      Origin::Root => format!("./{}", dir),
      Origin::Foreign { owner, repo } => repo_key(owner, repo, dir),
    }
  }
}

fn non_empty(value: Option<&str>) -> Option<String> {
  value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Visited sets and accumulated records of one `resolve` call.
#[derive(Debug)]
pub(crate) struct ResolutionContext {
  /// `owner/repo`, `owner/repo:subdir`, or `./dir` for root action directories.
  visited_repos: HashSet<String>,
  /// Keyed like [`WorkflowDependency::source`].
  visited_files: HashSet<String>,
  records: Vec<(WorkflowDependency, Scope)>,
}

impl ResolutionContext {
  pub fn new(root: &RepositoryCoordinate) -> Self {
    Self {
      visited_repos: HashSet::from([repo_key(&root.owner, &root.name, "")]),
      visited_files: HashSet::new(),
      records: Vec::new(),
    }
  }

  /// Returns `true` if the key was not visited before.
  pub fn mark_repo(&mut self, key: String) -> bool {
    self.visited_repos.insert(key)
  }

  /// Returns `true` if the key was not visited before.
  pub fn mark_file(&mut self, key: &str) -> bool {
    self.visited_files.insert(key.to_string())
  }

  /// Append a record; its source counts as visited from now on.
  pub fn push(&mut self, record: WorkflowDependency, scope: Scope) {
    self.visited_files.insert(record.source.clone());
    self.records.push((record, scope));
  }

  /// Actions and scope of the record at `index`, if it exists.
  pub fn pending(&self, index: usize) -> Option<(Vec<ActionReference>, Scope)> {
    self
      .records
      .get(index)
      .map(|(record, scope)| (record.actions.clone(), scope.clone()))
  }

  pub fn into_records(self) -> Vec<WorkflowDependency> {
    self.records.into_iter().map(|(record, _)| record).collect()
  }
}
