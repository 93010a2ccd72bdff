use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::dependency::WorkflowDependency;
use crate::reference::{ActionReference, Reference};

/// How the user picked the workflows to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
  /// Numeric workflow id, resolved to a path by the hosting API.
  Id(u64),
  /// Source, file name or declared workflow name.
  Name(String),
}

impl Selector {
  pub fn parse(input: &str) -> Self {
    let trimmed = input.trim();
    match trimmed.parse::<u64>() {
      Ok(id) => Selector::Id(id),
      Err(_) => Selector::Name(trimmed.to_string()),
    }
  }
}

/// Records whose source or file name equals `selector`, or whose declared name
/// equals it ignoring case.
pub fn filter(all: &[WorkflowDependency], selector: &str) -> Vec<WorkflowDependency> {
  let selector = selector.trim();
  let lowered = selector.to_lowercase();

  all
    .iter()
    .filter(|record| {
      record.source == selector
        || record.basename() == selector
        || (!record.name.is_empty() && record.name.to_lowercase() == lowered)
    })
    .cloned()
    .collect()
}

/// Grow `filtered` with every record of `all` reachable from it.
///
/// Works only on already-resolved records; nothing is fetched. The result keeps
/// `filtered` first, followed by newly reached records in breadth-first order.
pub fn expand(
  filtered: &[WorkflowDependency],
  all: &[WorkflowDependency],
) -> Vec<WorkflowDependency> {
  let by_source: HashMap<&str, &WorkflowDependency> =
    all.iter().map(|r| (r.source.as_str(), r)).collect();

  let mut included: HashSet<String> = filtered.iter().map(|r| r.source.clone()).collect();
  let mut result: Vec<WorkflowDependency> = filtered.to_vec();
  let mut queue: VecDeque<WorkflowDependency> = filtered.iter().cloned().collect();

  while let Some(record) = queue.pop_front() {
    let origin = record.origin();
    for action in &record.actions {
      for key in action.candidate_sources(&origin) {
        let Some(found) = by_source.get(key.as_str()) else {
          continue;
        };
        // Mark before enqueueing so every record is visited at most once.
        if included.insert(key) {
          result.push((*found).clone());
          queue.push_back((*found).clone());
        }
      }
    }
  }

  debug!(
    selected = filtered.len(),
    expanded = result.len(),
    "expanded selection"
  );
  result
}

/// Every distinct reference across `all`, sorted by `name@ref`.
pub fn distinct_actions(all: &[WorkflowDependency]) -> Vec<ActionReference> {
  let mut distinct: BTreeMap<String, ActionReference> = BTreeMap::new();

  for action in all.iter().flat_map(|r| r.actions.iter()) {
    if action.kind == Reference::Inert {
      continue;
    }
    distinct
      .entry(action.to_string())
      .or_insert_with(|| action.clone());
  }

  distinct.into_values().collect()
}
