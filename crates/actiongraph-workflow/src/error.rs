use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("invalid repository '{0}': expected owner/name or host/owner/name")]
  InvalidRepository(String),
}
