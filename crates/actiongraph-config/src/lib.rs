//! actiongraph Config
//!
//! This crate decodes the two fixed YAML schemas the resolver reads (workflow
//! files and `action.yml` files) into the flat fields the rest of the workspace
//! consumes, and holds the CLI settings.
//!
//! Decoding is intentionally shallow: only `name`, `runs.using` and every
//! `uses:` occurrence (in document order) are kept, together with the
//! `actions/checkout` steps that map another repository into a sub-directory.

mod action;
mod error;
mod settings;
mod step;
mod workflow;

pub use action::{ActionFile, parse_action};
pub use error::{ConfigError, ParseError};
pub use settings::{Config, DEFAULT_HOST};
pub use step::{CheckoutMapping, UsesEntry};
pub use workflow::{WORKFLOW_DIR, WorkflowFile, is_yaml_file, parse_workflow};
