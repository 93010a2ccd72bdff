use std::fmt;

use actiongraph_config::{DEFAULT_HOST, WORKFLOW_DIR, is_yaml_file, parse_action, parse_workflow};
use actiongraph_content::{ContentError, ContentStore};
use actiongraph_workflow::{
  ACTION_FILE_NAMES, ActionReference, Origin, RepositoryCoordinate, Target, WorkflowDependency,
  annotate_using, join_path, repo_key,
};
use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::context::{ResolutionContext, Scope};
use crate::error::ResolveError;

/// Resolver settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
  /// Host retried once when a cross-repository reference cannot be fetched
  /// from the host of the repository that references it.
  pub fallback_host: String,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      fallback_host: DEFAULT_HOST.to_string(),
    }
  }
}

/// Resolver turns root workflow files into the transitive set of dependency
/// records.
#[async_trait]
pub trait Resolver: Send + Sync {
  /// Load every workflow file of `root`. Any failure is fatal.
  async fn load_workflows(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError>;

  /// Load the given workflow files of `root`. Any failure is fatal.
  async fn load_files(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    paths: &[String],
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError>;

  /// Resolve everything reachable from `root_files`.
  ///
  /// With `recursive` unset the root files are returned unchanged. Otherwise
  /// the result starts with the root files, followed by every discovered
  /// workflow and action file, each exactly once.
  async fn resolve(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    root_files: Vec<WorkflowDependency>,
    recursive: bool,
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError>;
}

/// Which decoder applies to a fetched file.
#[derive(Debug, Clone, Copy)]
enum FileKind {
  Workflow,
  Action,
}

/// What to fetch from a repository.
#[derive(Debug, Clone, Copy)]
enum Want<'a> {
  File(&'a str),
  ActionDir(&'a str),
}

impl fmt::Display for Want<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Want::File(path) => write!(f, "{}", path),
      Want::ActionDir(dir) => write!(f, "{}", join_path(dir, ACTION_FILE_NAMES[0])),
    }
  }
}

/// Standard resolver reading files through a [`ContentStore`].
pub struct StandardResolver<S: ContentStore> {
  store: S,
  config: ResolverConfig,
}

impl<S: ContentStore> StandardResolver<S> {
  pub fn new(store: S, config: ResolverConfig) -> Self {
    Self { store, config }
  }

  /// Fetch one file, racing the cancellation token.
  async fn fetch(
    &self,
    repo: &RepositoryCoordinate,
    path: &str,
    revision: Option<&str>,
    cancel: &CancellationToken,
  ) -> Result<Bytes, ResolveError> {
    debug!(repo = %repo, path, revision = ?revision, "fetching");

    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(ResolveError::Cancelled),
      result = self.store.fetch(repo, path, revision) => {
        result.map_err(|source| ResolveError::Fetch {
          path: format!("{}:{}", repo, path),
          source,
        })
      }
    }
  }

  /// Fetch `action.yml`, falling back to `action.yaml`, from `dir`.
  async fn fetch_action(
    &self,
    repo: &RepositoryCoordinate,
    dir: &str,
    revision: Option<&str>,
    cancel: &CancellationToken,
  ) -> Result<(String, Bytes), ResolveError> {
    let mut last_error = None;

    for file in ACTION_FILE_NAMES {
      let path = join_path(dir, file);
      match self.fetch(repo, &path, revision, cancel).await {
        Ok(bytes) => return Ok((path, bytes)),
        Err(ResolveError::Cancelled) => return Err(ResolveError::Cancelled),
        Err(e) => last_error = Some(e),
      }
    }

    Err(last_error.unwrap_or_else(|| ResolveError::Fetch {
      path: format!("{}:{}", repo, dir),
      source: ContentError::NotFound(dir.to_string()),
    }))
  }

  async fn fetch_want(
    &self,
    repo: &RepositoryCoordinate,
    want: Want<'_>,
    revision: Option<&str>,
    cancel: &CancellationToken,
  ) -> Result<(String, Bytes), ResolveError> {
    match want {
      Want::File(path) => {
        let bytes = self.fetch(repo, path, revision, cancel).await?;
        Ok((path.to_string(), bytes))
      }
      Want::ActionDir(dir) => self.fetch_action(repo, dir, revision, cancel).await,
    }
  }

  /// Fetch from another repository, retrying once on the fallback host.
  ///
  /// Returns the coordinate that served the file, so the sub-tree below it
  /// keeps using that host. `Ok(None)` means the dependency is unavailable.
  async fn fetch_remote(
    &self,
    repo: RepositoryCoordinate,
    want: Want<'_>,
    git_ref: &str,
    cancel: &CancellationToken,
  ) -> Result<Option<(RepositoryCoordinate, String, Bytes)>, ResolveError> {
    let revision = Some(git_ref).filter(|r| !r.is_empty());

    match self.fetch_want(&repo, want, revision, cancel).await {
      Ok((path, bytes)) => return Ok(Some((repo, path, bytes))),
      Err(ResolveError::Cancelled) => return Err(ResolveError::Cancelled),
      Err(e) => debug!(repo = %repo, target = %want, error = %e, "not available on primary host"),
    }

    if repo.is_on_host(&self.config.fallback_host) {
      warn!(repo = %repo, target = %want, "dependency unavailable; skipping");
      return Ok(None);
    }

    let fallback = repo.on_host(&self.config.fallback_host);
    match self.fetch_want(&fallback, want, revision, cancel).await {
      Ok((path, bytes)) => {
        info!(
          repo = %repo.slug(),
          from = %repo.host,
          to = %fallback.host,
          "resolved dependency on fallback host"
        );
        Ok(Some((fallback, path, bytes)))
      }
      Err(ResolveError::Cancelled) => Err(ResolveError::Cancelled),
      Err(e) => {
        warn!(
          repo = %repo.slug(),
          target = %want,
          error = %e,
          "dependency unavailable on primary and fallback host; skipping"
        );
        Ok(None)
      }
    }
  }

  /// Dispatch one reference of a record fetched in `scope`.
  async fn visit(
    &self,
    ctx: &mut ResolutionContext,
    scope: &Scope,
    reference: &ActionReference,
    cancel: &CancellationToken,
  ) -> Result<(), ResolveError> {
    match reference.target() {
      Target::Terminal => {}

      Target::LocalFile(path) => {
        let source = scope.source_for(path);
        if !ctx.mark_file(&source) {
          return Ok(());
        }

        let fetched = self.fetch(&scope.repo, path, scope.revision(), cancel).await;
        if let Some(bytes) = discard_child_error(fetched, &source)? {
          ctx.push(decode(FileKind::Workflow, source, &bytes), scope.clone());
        }
      }

      Target::LocalActionDir(dir) => {
        let key = scope.dir_key(dir);
        if !ctx.mark_repo(key.clone()) {
          return Ok(());
        }

        let fetched = self
          .fetch_action(&scope.repo, dir, scope.revision(), cancel)
          .await;
        if let Some((path, bytes)) = discard_child_error(fetched, &key)? {
          let source = scope.source_for(&path);
          if ctx.mark_file(&source) {
            ctx.push(decode(FileKind::Action, source, &bytes), scope.clone());
          }
        }
      }

      Target::RemoteActionDir {
        owner,
        repo,
        subdir,
        git_ref,
      } => {
        if !ctx.mark_repo(repo_key(owner, repo, subdir)) {
          return Ok(());
        }

        let coordinate = scope.repo.sibling(owner, repo);
        let found = self
          .fetch_remote(coordinate, Want::ActionDir(subdir), git_ref, cancel)
          .await?;
        if let Some((coordinate, path, bytes)) = found {
          let next = Scope::foreign(coordinate, git_ref);
          let source = next.source_for(&path);
          if ctx.mark_file(&source) {
            ctx.push(decode(FileKind::Action, source, &bytes), next);
          }
        }
      }

      Target::RemoteFile {
        owner,
        repo,
        path,
        git_ref,
      } => {
        let source = Origin::foreign(owner, repo).source_for(path);
        if !ctx.mark_file(&source) {
          return Ok(());
        }

        let coordinate = scope.repo.sibling(owner, repo);
        let found = self
          .fetch_remote(coordinate, Want::File(path), git_ref, cancel)
          .await?;
        if let Some((coordinate, _, bytes)) = found {
          let next = Scope::foreign(coordinate, git_ref);
          ctx.push(decode(FileKind::Workflow, source, &bytes), next);
        }
      }
    }

    Ok(())
  }
}

/// Stop a failed child branch here; only cancellation propagates further.
fn discard_child_error<T>(
  result: Result<T, ResolveError>,
  dependency: &str,
) -> Result<Option<T>, ResolveError> {
  match result {
    Ok(value) => Ok(Some(value)),
    Err(ResolveError::Cancelled) => Err(ResolveError::Cancelled),
    Err(e) => {
      warn!(dependency, error = %e, "dependency unavailable; skipping");
      Ok(None)
    }
  }
}

/// Decode a discovered file. Undecodable files are kept without references.
fn decode(kind: FileKind, source: String, bytes: &[u8]) -> WorkflowDependency {
  let decoded = match kind {
    FileKind::Workflow => {
      parse_workflow(bytes).map(|file| WorkflowDependency::from_workflow(source.clone(), &file))
    }
    FileKind::Action => {
      parse_action(bytes).map(|file| WorkflowDependency::from_action(source.clone(), &file))
    }
  };

  decoded.unwrap_or_else(|e| {
    warn!(
      source = %source,
      error = %e,
      "could not decode dependency; keeping it without references"
    );
    WorkflowDependency::undecodable(source)
  })
}

#[async_trait]
impl<S: ContentStore> Resolver for StandardResolver<S> {
  async fn load_workflows(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError> {
    let listed = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
      result = self.store.list(root, WORKFLOW_DIR, revision) => result,
    };

    let mut paths: Vec<String> = listed
      .map_err(|source| ResolveError::RootFetch {
        path: WORKFLOW_DIR.to_string(),
        source,
      })?
      .into_iter()
      .filter(|p| is_yaml_file(p))
      .collect();
    paths.sort();

    self.load_files(root, revision, &paths, cancel).await
  }

  async fn load_files(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    paths: &[String],
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError> {
    let mut records = Vec::with_capacity(paths.len());

    for path in paths {
      let bytes = self
        .fetch(root, path, revision, cancel)
        .await
        .map_err(|e| e.into_root(path))?;
      let file = parse_workflow(&bytes).map_err(|source| ResolveError::RootParse {
        path: path.clone(),
        source,
      })?;
      records.push(WorkflowDependency::from_workflow(path.clone(), &file));
    }

    Ok(records)
  }

  #[instrument(
    name = "resolve_dependencies",
    skip_all,
    fields(root = %root, roots = root_files.len(), recursive = recursive)
  )]
  async fn resolve(
    &self,
    root: &RepositoryCoordinate,
    revision: Option<&str>,
    root_files: Vec<WorkflowDependency>,
    recursive: bool,
    cancel: &CancellationToken,
  ) -> Result<Vec<WorkflowDependency>, ResolveError> {
    if !recursive {
      return Ok(root_files);
    }

    let root_scope = Scope::root(root.clone(), revision);
    let mut ctx = ResolutionContext::new(root);
    for record in root_files {
      ctx.push(record, root_scope.clone());
    }

    // Records appended while scanning are picked up by later iterations.
    let mut cursor = 0;
    while let Some((actions, scope)) = ctx.pending(cursor) {
      if cancel.is_cancelled() {
        return Err(ResolveError::Cancelled);
      }
      for action in &actions {
        self.visit(&mut ctx, &scope, action, cancel).await?;
      }
      cursor += 1;
    }

    let mut records = ctx.into_records();
    annotate_using(&mut records);

    info!(records = records.len(), "resolved dependencies");
    Ok(records)
  }
}
