use std::collections::HashMap;

use actiongraph_config::{ActionFile, WorkflowFile};
use serde::{Deserialize, Serialize};

use crate::reference::ActionReference;

/// The dependency record for one fetched workflow or action file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDependency {
  /// Unique key: a plain path for files of the root repository,
  /// `owner/repo:path` for files from any other repository.
  pub source: String,
  /// Declared workflow name; empty for action files.
  pub name: String,
  /// Run mechanism of an action file; empty for workflows.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub using: String,
  pub actions: Vec<ActionReference>,
}

impl WorkflowDependency {
  pub fn from_workflow(source: impl Into<String>, file: &WorkflowFile) -> Self {
    Self {
      source: source.into(),
      name: file.name.clone(),
      using: String::new(),
      actions: file.uses.iter().map(ActionReference::from_uses).collect(),
    }
  }

  pub fn from_action(source: impl Into<String>, file: &ActionFile) -> Self {
    Self {
      source: source.into(),
      name: String::new(),
      using: file.using.clone(),
      actions: file.uses.iter().map(ActionReference::from_uses).collect(),
    }
  }

  /// A record for a file that exists but could not be decoded.
  pub fn undecodable(source: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      name: String::new(),
      using: String::new(),
      actions: Vec::new(),
    }
  }

  /// Path of the file inside its repository.
  pub fn path(&self) -> &str {
    match self.origin() {
      Origin::Root => self.source.as_str(),
      Origin::Foreign { .. } => self
        .source
        .split_once(':')
        .map(|(_, path)| path)
        .unwrap_or(self.source.as_str()),
    }
  }

  /// File name of the record, e.g. `ci.yml`.
  pub fn basename(&self) -> &str {
    let path = self.path();
    path.rsplit('/').next().unwrap_or(path)
  }

  pub fn origin(&self) -> Origin {
    Origin::of_source(&self.source)
  }
}

/// The repository a record's local references are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
  /// The repository resolution started from.
  Root,
  /// Any other repository.
  Foreign { owner: String, repo: String },
}

impl Origin {
  /// Owner and repository are stored lowercased, so sources of the same
  /// repository compare equal however a reference spells it.
  pub fn foreign(owner: &str, repo: &str) -> Self {
    Self::Foreign {
      owner: owner.to_lowercase(),
      repo: repo.to_lowercase(),
    }
  }

  /// Record source for `path` inside this repository.
  pub fn source_for(&self, path: &str) -> String {
    match self {
      Origin::Root => path.to_string(),
      Origin::Foreign { owner, repo } => format!("{}/{}:{}", owner, repo, path),
    }
  }

  /// Recover the origin from a record source.
  pub fn of_source(source: &str) -> Self {
    let Some((prefix, _)) = source.split_once(':') else {
      return Origin::Root;
    };

    match prefix.split_once('/') {
      Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
        Origin::foreign(owner, repo)
      }
      _ => Origin::Root,
    }
  }
}

/// Fill `using` on every reference whose target record is present.
pub fn annotate_using(records: &mut [WorkflowDependency]) {
  let usings: HashMap<String, String> = records
    .iter()
    .filter(|r| !r.using.is_empty())
    .map(|r| (r.source.clone(), r.using.clone()))
    .collect();

  for record in records.iter_mut() {
    let origin = record.origin();
    for action in &mut record.actions {
      if action.using.is_some() {
        continue;
      }
      action.using = action
        .candidate_sources(&origin)
        .iter()
        .find_map(|key| usings.get(key))
        .cloned();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actiongraph_config::UsesEntry;

  #[test]
  fn test_origin_round_trip() {
    assert_eq!(Origin::of_source(".github/workflows/ci.yml"), Origin::Root);
    assert_eq!(
      Origin::of_source("org/helper:action.yml"),
      Origin::foreign("org", "helper")
    );
    assert_eq!(
      Origin::foreign("org", "helper").source_for("a/action.yml"),
      "org/helper:a/action.yml"
    );
    assert_eq!(
      Origin::foreign("Org", "Helper").source_for("Sub/action.yml"),
      "org/helper:Sub/action.yml"
    );
    // A colon inside a nested path is not a repository prefix.
    assert_eq!(Origin::of_source(".github/workflows/a:b.yml"), Origin::Root);
  }

  #[test]
  fn test_basename_and_path() {
    let root = WorkflowDependency::undecodable(".github/workflows/ci.yml");
    assert_eq!(root.path(), ".github/workflows/ci.yml");
    assert_eq!(root.basename(), "ci.yml");

    let foreign = WorkflowDependency::undecodable("org/shared:.github/workflows/release.yml");
    assert_eq!(foreign.path(), ".github/workflows/release.yml");
    assert_eq!(foreign.basename(), "release.yml");

    let action = WorkflowDependency::undecodable("org/helper:action.yml");
    assert_eq!(action.basename(), "action.yml");
  }

  #[test]
  fn test_annotate_using_follows_origin() {
    let workflow = WorkflowFile {
      name: "CI".to_string(),
      uses: vec![
        UsesEntry::new("./.github/actions/m"),
        UsesEntry::new("org/helper@v1"),
        UsesEntry::new("org/missing@v1"),
      ],
    };
    let local = ActionFile {
      using: "composite".to_string(),
      uses: vec![UsesEntry::new("./sub")],
    };
    let remote = ActionFile {
      using: "node20".to_string(),
      uses: vec![],
    };

    let mut records = vec![
      WorkflowDependency::from_workflow(".github/workflows/ci.yml", &workflow),
      WorkflowDependency::from_action(".github/actions/m/action.yml", &local),
      WorkflowDependency::from_action("org/helper:action.yml", &remote),
    ];
    annotate_using(&mut records);

    let ci = &records[0];
    assert_eq!(ci.actions[0].using.as_deref(), Some("composite"));
    assert_eq!(ci.actions[1].using.as_deref(), Some("node20"));
    assert_eq!(ci.actions[2].using, None);
  }
}
