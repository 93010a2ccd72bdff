use std::fmt;

use actiongraph_config::{UsesEntry, is_yaml_file};
use serde::{Deserialize, Serialize};

use crate::dependency::Origin;

/// File names probed, in order, inside an action directory.
pub const ACTION_FILE_NAMES: [&str; 2] = ["action.yml", "action.yaml"];

/// Repository placed into the workspace by an `actions/checkout` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
  pub owner: String,
  pub repo: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub git_ref: String,
}

/// The class of a reference. Each variant carries only the fields that are
/// meaningful for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
  /// `./.github/workflows/build.yml`
  LocalWorkflow { path: String },

  /// `./.github/actions/setup`. When `checkout` is set, `path` is relative to
  /// the checked out repository instead of the current one.
  LocalAction {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checkout: Option<Checkout>,
  },

  /// `docker://alpine:3.19`
  Docker { image: String },

  /// `org/repo/.github/workflows/release.yml@v1`
  RemoteWorkflow {
    owner: String,
    repo: String,
    path: String,
    git_ref: String,
  },

  /// `org/monorepo/actions/lint@v1`
  RemoteActionPath {
    owner: String,
    repo: String,
    path: String,
    git_ref: String,
  },

  /// `actions/checkout@v4`
  RemoteAction {
    owner: String,
    repo: String,
    git_ref: String,
  },

  /// Anything that could not be classified.
  Inert,
}

/// What resolving a reference would fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
  /// A workflow file in the repository currently being processed.
  LocalFile(&'a str),
  /// An action directory in the repository currently being processed.
  LocalActionDir(&'a str),
  /// A workflow file in another repository.
  RemoteFile {
    owner: &'a str,
    repo: &'a str,
    path: &'a str,
    git_ref: &'a str,
  },
  /// An action directory (possibly the root) of another repository.
  RemoteActionDir {
    owner: &'a str,
    repo: &'a str,
    subdir: &'a str,
    git_ref: &'a str,
  },
  /// Nothing to fetch.
  Terminal,
}

/// One parsed `uses:` occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReference {
  /// The string as written in the file.
  pub raw: String,
  pub kind: Reference,
  /// Run mechanism of the referenced action, filled in after resolution.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub using: Option<String>,
}

/// Classify a raw `uses:` string. Never fails; unrecognised input becomes
/// [`Reference::Inert`].
pub fn classify(raw: &str) -> ActionReference {
  ActionReference {
    raw: raw.to_string(),
    kind: classify_kind(raw.trim()),
    using: None,
  }
}

fn classify_kind(s: &str) -> Reference {
  if let Some(local) = s.strip_prefix("./") {
    let path = local.trim_end_matches('/').to_string();
    return if is_yaml_file(&path) {
      Reference::LocalWorkflow { path }
    } else {
      Reference::LocalAction {
        path,
        checkout: None,
      }
    };
  }

  if let Some(image) = s.strip_prefix("docker://") {
    if image.is_empty() {
      return Reference::Inert;
    }
    return Reference::Docker {
      image: image.to_string(),
    };
  }

  let (name, git_ref) = s.rsplit_once('@').unwrap_or((s, ""));
  let mut segments = name.splitn(3, '/');
  let owner = segments.next().unwrap_or_default();
  let repo = segments.next().unwrap_or_default();
  let path = segments.next().unwrap_or_default().trim_matches('/');

  if owner.is_empty() || repo.is_empty() {
    return Reference::Inert;
  }

  let (owner, repo, git_ref) = (owner.to_string(), repo.to_string(), git_ref.to_string());
  if path.is_empty() {
    Reference::RemoteAction {
      owner,
      repo,
      git_ref,
    }
  } else if is_yaml_file(path) {
    Reference::RemoteWorkflow {
      owner,
      repo,
      path: path.to_string(),
      git_ref,
    }
  } else {
    Reference::RemoteActionPath {
      owner,
      repo,
      path: path.to_string(),
      git_ref,
    }
  }
}

/// Visited key for a repository or one of its sub-directories. Owner and
/// repository names are case-insensitive; sub-directory paths are not.
pub fn repo_key(owner: &str, repo: &str, subdir: &str) -> String {
  let (owner, repo) = (owner.to_lowercase(), repo.to_lowercase());
  if subdir.is_empty() {
    format!("{}/{}", owner, repo)
  } else {
    format!("{}/{}:{}", owner, repo, subdir)
  }
}

/// `dir/file`, or just `file` for the repository root.
pub fn join_path(dir: &str, file: &str) -> String {
  if dir.is_empty() {
    file.to_string()
  } else {
    format!("{}/{}", dir.trim_end_matches('/'), file)
  }
}

impl ActionReference {
  /// Classify a parsed `uses:` entry, attaching its checkout mapping to local
  /// action references.
  pub fn from_uses(entry: &UsesEntry) -> Self {
    let mut reference = classify(&entry.raw);

    if let (Some(mapping), Reference::LocalAction { path, checkout }) =
      (&entry.checkout, &mut reference.kind)
      && let Some((owner, repo)) = mapping.repository.split_once('/')
    {
      let sub = path
        .strip_prefix(mapping.path.as_str())
        .unwrap_or(path.as_str())
        .trim_matches('/')
        .to_string();
      *path = sub;
      *checkout = Some(Checkout {
        owner: owner.to_string(),
        repo: repo.to_string(),
        git_ref: mapping.git_ref.clone().unwrap_or_default(),
      });
    }

    reference
  }

  pub fn owner(&self) -> &str {
    match &self.kind {
      Reference::RemoteWorkflow { owner, .. }
      | Reference::RemoteActionPath { owner, .. }
      | Reference::RemoteAction { owner, .. } => owner,
      Reference::LocalAction {
        checkout: Some(c), ..
      } => &c.owner,
      _ => "",
    }
  }

  pub fn repo(&self) -> &str {
    match &self.kind {
      Reference::RemoteWorkflow { repo, .. }
      | Reference::RemoteActionPath { repo, .. }
      | Reference::RemoteAction { repo, .. } => repo,
      Reference::LocalAction {
        checkout: Some(c), ..
      } => &c.repo,
      _ => "",
    }
  }

  pub fn path(&self) -> &str {
    match &self.kind {
      Reference::LocalWorkflow { path }
      | Reference::LocalAction { path, .. }
      | Reference::RemoteWorkflow { path, .. }
      | Reference::RemoteActionPath { path, .. } => path,
      _ => "",
    }
  }

  /// Pinned revision; empty means the default branch.
  pub fn git_ref(&self) -> &str {
    match &self.kind {
      Reference::RemoteWorkflow { git_ref, .. }
      | Reference::RemoteActionPath { git_ref, .. }
      | Reference::RemoteAction { git_ref, .. } => git_ref,
      Reference::LocalAction {
        checkout: Some(c), ..
      } => &c.git_ref,
      _ => "",
    }
  }

  pub fn is_local(&self) -> bool {
    matches!(
      self.kind,
      Reference::LocalWorkflow { .. } | Reference::LocalAction { .. }
    )
  }

  pub fn target(&self) -> Target<'_> {
    match &self.kind {
      Reference::LocalWorkflow { path } => Target::LocalFile(path),
      Reference::LocalAction {
        path,
        checkout: None,
      } => Target::LocalActionDir(path),
      Reference::LocalAction {
        path,
        checkout: Some(c),
      } => Target::RemoteActionDir {
        owner: &c.owner,
        repo: &c.repo,
        subdir: path,
        git_ref: &c.git_ref,
      },
      Reference::RemoteWorkflow {
        owner,
        repo,
        path,
        git_ref,
      } => Target::RemoteFile {
        owner,
        repo,
        path,
        git_ref,
      },
      Reference::RemoteActionPath {
        owner,
        repo,
        path,
        git_ref,
      } => Target::RemoteActionDir {
        owner,
        repo,
        subdir: path,
        git_ref,
      },
      Reference::RemoteAction {
        owner,
        repo,
        git_ref,
      } => Target::RemoteActionDir {
        owner,
        repo,
        subdir: "",
        git_ref,
      },
      Reference::Docker { .. } | Reference::Inert => Target::Terminal,
    }
  }

  /// The record sources this reference resolves to when it appears in a file
  /// from `origin`, in probe order.
  pub fn candidate_sources(&self, origin: &Origin) -> Vec<String> {
    match self.target() {
      Target::LocalFile(path) => vec![origin.source_for(path)],
      Target::LocalActionDir(dir) => ACTION_FILE_NAMES
        .iter()
        .map(|file| origin.source_for(&join_path(dir, file)))
        .collect(),
      Target::RemoteFile {
        owner, repo, path, ..
      } => vec![Origin::foreign(owner, repo).source_for(path)],
      Target::RemoteActionDir {
        owner,
        repo,
        subdir,
        ..
      } => {
        let origin = Origin::foreign(owner, repo);
        ACTION_FILE_NAMES
          .iter()
          .map(|file| origin.source_for(&join_path(subdir, file)))
          .collect()
      }
      Target::Terminal => Vec::new(),
    }
  }

  /// Display name without the revision.
  pub fn name(&self) -> String {
    match &self.kind {
      Reference::Docker { image } => format!("docker://{}", image),
      Reference::LocalWorkflow { .. }
      | Reference::LocalAction {
        checkout: None, ..
      }
      | Reference::Inert => self.raw.trim().to_string(),
      _ => {
        let base = format!("{}/{}", self.owner(), self.repo());
        if self.path().is_empty() {
          base
        } else {
          join_path(&base, self.path())
        }
      }
    }
  }
}

impl fmt::Display for ActionReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let git_ref = self.git_ref();
    if git_ref.is_empty() {
      write!(f, "{}", self.name())
    } else {
      write!(f, "{}@{}", self.name(), git_ref)
    }
  }
}
