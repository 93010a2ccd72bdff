use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The action whose steps can map another repository into the workspace.
const CHECKOUT_ACTION: &str = "actions/checkout";

/// A single job or composite-action step. Only the fields the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Step {
  #[serde(default)]
  pub uses: Option<String>,
  #[serde(default)]
  pub with: HashMap<String, serde_yaml::Value>,
}

/// An `actions/checkout` step that places another repository at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMapping {
  /// `owner/repo` of the checked out repository.
  pub repository: String,
  /// Directory inside the workspace, without leading `./` or trailing `/`.
  pub path: String,
  /// Revision given by `with.ref`, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub git_ref: Option<String>,
}

/// One `uses:` occurrence, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsesEntry {
  /// The reference string, trimmed.
  pub raw: String,
  /// Set when a local reference points into a directory populated by an
  /// earlier checkout step of the same job.
  pub checkout: Option<CheckoutMapping>,
}

impl UsesEntry {
  pub fn new(raw: impl Into<String>) -> Self {
    Self {
      raw: raw.into(),
      checkout: None,
    }
  }
}

/// Collect the `uses:` entries of one job's steps, attaching checkout
/// mappings to local references that fall inside a checked out directory.
pub(crate) fn collect_step_uses(steps: &[Step], out: &mut Vec<UsesEntry>) {
  let mut checkouts: Vec<CheckoutMapping> = Vec::new();

  for step in steps {
    let Some(uses) = step.uses.as_deref().map(str::trim) else {
      continue;
    };
    if uses.is_empty() {
      continue;
    }

    if is_checkout(uses)
      && let Some(mapping) = checkout_mapping(&step.with)
    {
      checkouts.push(mapping);
    }

    let checkout = uses
      .strip_prefix("./")
      .and_then(|local| match_checkout(&checkouts, local));

    out.push(UsesEntry {
      raw: uses.to_string(),
      checkout,
    });
  }
}

fn is_checkout(uses: &str) -> bool {
  let name = uses.split('@').next().unwrap_or_default();
  name.eq_ignore_ascii_case(CHECKOUT_ACTION)
}

fn checkout_mapping(with: &HashMap<String, serde_yaml::Value>) -> Option<CheckoutMapping> {
  let repository = with.get("repository")?.as_str()?.trim();
  let path = normalize_dir(with.get("path")?.as_str()?);

  // Expressions such as `${{ github.repository }}` cannot be resolved statically.
  if repository.is_empty() || path.is_empty() || repository.contains("${{") {
    return None;
  }

  Some(CheckoutMapping {
    repository: repository.to_string(),
    path,
    git_ref: with
      .get("ref")
      .and_then(|v| v.as_str())
      .map(str::trim)
      .filter(|r| !r.is_empty() && !r.contains("${{"))
      .map(str::to_string),
  })
}

/// The most recent checkout whose directory contains `local`.
fn match_checkout(checkouts: &[CheckoutMapping], local: &str) -> Option<CheckoutMapping> {
  let local = normalize_dir(local);
  checkouts
    .iter()
    .rev()
    .find(|m| {
      local == m.path
        || local
          .strip_prefix(m.path.as_str())
          .is_some_and(|rest| rest.starts_with('/'))
    })
    .cloned()
}

fn normalize_dir(path: &str) -> String {
  let path = path.trim();
  let path = path.strip_prefix("./").unwrap_or(path);
  path.trim_matches('/').to_string()
}
