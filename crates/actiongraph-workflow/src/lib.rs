//! actiongraph Workflow
//!
//! Core data model of the dependency resolver:
//! - [`ActionReference`] / [`Reference`]: one `uses:` occurrence, classified
//!   into a closed set of reference kinds by [`classify`].
//! - [`WorkflowDependency`]: the record for one fetched workflow or action file.
//! - [`RepositoryCoordinate`]: host + owner + name of a repository.
//! - [`filter`], [`expand`] and [`distinct_actions`]: post-resolution views
//!   that work purely on already-resolved records.

mod dependency;
mod error;
mod filter;
mod reference;
mod repository;

pub use dependency::{Origin, WorkflowDependency, annotate_using};
pub use error::WorkflowError;
pub use filter::{Selector, distinct_actions, expand, filter};
pub use reference::{
  ACTION_FILE_NAMES, ActionReference, Checkout, Reference, Target, classify, join_path, repo_key,
};
pub use repository::RepositoryCoordinate;
