use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ParseError;
use crate::step::{Step, UsesEntry, collect_step_uses};

/// Directory holding a repository's workflow files.
pub const WORKFLOW_DIR: &str = ".github/workflows";

#[derive(Debug, Default, Deserialize)]
struct WorkflowDoc {
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  jobs: serde_yaml::Mapping,
}

#[derive(Debug, Default, Deserialize)]
struct JobDoc {
  #[serde(default)]
  uses: Option<String>,
  #[serde(default)]
  steps: Vec<Step>,
}

/// The fields of a workflow file the resolver cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowFile {
  /// Declared `name:`, empty when absent.
  pub name: String,
  /// Job-level and step-level `uses:` entries in document order.
  pub uses: Vec<UsesEntry>,
}

/// Decode a workflow file.
pub fn parse_workflow(bytes: &[u8]) -> Result<WorkflowFile, ParseError> {
  let doc: WorkflowDoc = decode(bytes)?;

  let mut uses = Vec::new();
  for (_, value) in doc.jobs {
    let job: JobDoc = serde_yaml::from_value(value)?;

    if let Some(called) = job.uses.as_deref().map(str::trim)
      && !called.is_empty()
    {
      uses.push(UsesEntry::new(called));
    }

    collect_step_uses(&job.steps, &mut uses);
  }

  Ok(WorkflowFile {
    name: doc.name.unwrap_or_default(),
    uses,
  })
}

/// Whether `path` names a YAML file.
pub fn is_yaml_file(path: &str) -> bool {
  path.ends_with(".yml") || path.ends_with(".yaml")
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ParseError> {
  let text = std::str::from_utf8(bytes)?;
  if text.trim().is_empty() {
    return Err(ParseError::Empty);
  }
  Ok(serde_yaml::from_str(text)?)
}
