use serde::Deserialize;

use crate::error::ParseError;
use crate::step::{Step, UsesEntry, collect_step_uses};
use crate::workflow::decode;

#[derive(Debug, Default, Deserialize)]
struct ActionDoc {
  #[serde(default)]
  runs: Option<RunsDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct RunsDoc {
  #[serde(default)]
  using: Option<String>,
  #[serde(default)]
  image: Option<String>,
  #[serde(default)]
  steps: Vec<Step>,
}

/// The fields of an `action.yml` file the resolver cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFile {
  /// Run mechanism from `runs.using` (`composite`, `node20`, `docker`, ...).
  pub using: String,
  /// Nested `uses:` entries of a composite action, plus a `docker://` image.
  pub uses: Vec<UsesEntry>,
}

/// Decode an `action.yml` / `action.yaml` file.
pub fn parse_action(bytes: &[u8]) -> Result<ActionFile, ParseError> {
  let doc: ActionDoc = decode(bytes)?;
  let Some(runs) = doc.runs else {
    return Ok(ActionFile::default());
  };

  let mut uses = Vec::new();
  collect_step_uses(&runs.steps, &mut uses);

  if let Some(image) = runs.image.as_deref().map(str::trim)
    && image.starts_with("docker://")
  {
    uses.push(UsesEntry::new(image));
  }

  Ok(ActionFile {
    using: runs.using.unwrap_or_default(),
    uses,
  })
}
