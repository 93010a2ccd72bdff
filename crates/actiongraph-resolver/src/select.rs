use actiongraph_content::WorkflowIndex;
use actiongraph_workflow::{RepositoryCoordinate, Selector, WorkflowDependency, filter};
use tracing::debug;

use crate::error::ResolveError;

/// Filter `all` by a user selector. Numeric selectors are workflow ids and are
/// mapped to a workflow path through `index` first.
pub async fn select<I: WorkflowIndex + ?Sized>(
  all: &[WorkflowDependency],
  selector: &str,
  index: &I,
  repo: &RepositoryCoordinate,
) -> Result<Vec<WorkflowDependency>, ResolveError> {
  match Selector::parse(selector) {
    Selector::Id(id) => {
      let path = index
        .workflow_path(repo, id)
        .await
        .map_err(|source| ResolveError::WorkflowLookup { id, source })?;
      debug!(id, path = %path, "resolved workflow id");
      Ok(filter(all, &path))
    }
    Selector::Name(name) => Ok(filter(all, &name)),
  }
}
