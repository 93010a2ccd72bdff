use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use actiongraph_config::Config;
use actiongraph_content::{ContentStore, FsStore, GitHubStore, OverlayStore};
use actiongraph_resolver::{Resolver, ResolverConfig, StandardResolver, select};
use actiongraph_workflow::{RepositoryCoordinate, WorkflowDependency, distinct_actions, expand};

/// actiongraph - Map the actions and reusable workflows a repository depends on
#[derive(Parser)]
#[command(name = "actiongraph")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.actiongraph)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Host of the inspected repository when it is given as owner/repo
  #[arg(long, global = true)]
  host: Option<String>,

  /// API token (default: GH_TOKEN, GITHUB_TOKEN, then the config file)
  #[arg(long, global = true)]
  token: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the dependencies of a repository's workflows
  Deps(DepsArgs),
}

#[derive(Args)]
struct DepsArgs {
  /// Repository as owner/repo or host/owner/repo
  repository: String,

  /// Branch, tag or commit to read (default: the default branch)
  #[arg(long = "ref")]
  git_ref: Option<String>,

  /// Read the repository itself from this local checkout
  #[arg(long)]
  local: Option<PathBuf>,

  /// Only show this workflow (name, file name, path or numeric id)
  #[arg(long)]
  workflow: Option<String>,

  /// Follow references into local actions, other repositories and reusable workflows
  #[arg(short, long)]
  recursive: bool,

  /// With --workflow, also show everything the selected workflow reaches (implies --recursive)
  #[arg(long)]
  expand: bool,

  /// Print the distinct list of referenced actions instead of the records
  #[arg(long)]
  actions: bool,

  /// Print JSON
  #[arg(long)]
  json: bool,
}

fn main() -> Result<()> {
  init_tracing();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => Config::default_data_dir().context("failed to determine data directory")?,
  };

  let mut config = Config::load(&data_dir)
    .with_context(|| format!("failed to load config from {}", data_dir.display()))?
    .with_env();
  if let Some(host) = cli.host {
    config.host = host;
  }
  if let Some(token) = cli.token {
    config.token = Some(token);
  }

  match cli.command {
    Some(Commands::Deps(args)) => run_deps(args, config)?,
    None => {
      println!("actiongraph - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "actiongraph=warn".into()),
    ))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

fn run_deps(args: DepsArgs, config: Config) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_deps_async(args, config).await })
}

async fn run_deps_async(args: DepsArgs, config: Config) -> Result<()> {
  let repo = RepositoryCoordinate::parse(&args.repository, &config.host)
    .with_context(|| format!("invalid repository: {}", args.repository))?;

  let mut github = GitHubStore::new(&config.user_agent).context("failed to create HTTP client")?;
  if let Some(token) = &config.token {
    github = github.with_token(repo.host.clone(), token.clone());
  }

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      on_interrupt.cancel();
    }
  });

  let resolver_config = ResolverConfig {
    fallback_host: config.fallback_host.clone(),
  };

  let records = match &args.local {
    Some(dir) => {
      let store = OverlayStore::new(repo.clone(), FsStore::new(dir.clone()), github.clone());
      collect(store, resolver_config, &github, &repo, &args, &cancel).await?
    }
    None => collect(github.clone(), resolver_config, &github, &repo, &args, &cancel).await?,
  };

  print_records(&records, &args)
}

/// Load, resolve and select the records requested by `args`.
async fn collect<S: ContentStore>(
  store: S,
  resolver_config: ResolverConfig,
  index: &GitHubStore,
  repo: &RepositoryCoordinate,
  args: &DepsArgs,
  cancel: &CancellationToken,
) -> Result<Vec<WorkflowDependency>> {
  let resolver = StandardResolver::new(store, resolver_config);
  let revision = args.git_ref.as_deref();

  let roots = resolver
    .load_workflows(repo, revision, cancel)
    .await
    .with_context(|| format!("failed to load workflows of {}", repo))?;

  let all = resolver
    .resolve(repo, revision, roots, args.recursive || args.expand, cancel)
    .await
    .context("failed to resolve dependencies")?;

  let Some(selector) = &args.workflow else {
    return Ok(all);
  };

  let selected = select(&all, selector, index, repo)
    .await
    .with_context(|| format!("failed to select workflow '{}'", selector))?;
  if selected.is_empty() {
    anyhow::bail!("no workflow matches '{}'", selector);
  }

  if args.expand {
    Ok(expand(&selected, &all))
  } else {
    Ok(selected)
  }
}

fn print_records(records: &[WorkflowDependency], args: &DepsArgs) -> Result<()> {
  if args.actions {
    let actions = distinct_actions(records);
    if args.json {
      println!("{}", serde_json::to_string_pretty(&actions)?);
    } else {
      for action in actions {
        match &action.using {
          Some(using) => println!("{} ({})", action, using),
          None => println!("{}", action),
        }
      }
    }
    return Ok(());
  }

  if args.json {
    println!("{}", serde_json::to_string_pretty(records)?);
    return Ok(());
  }

  for record in records {
    match (record.name.is_empty(), record.using.is_empty()) {
      (false, _) => println!("{} ({})", record.source, record.name),
      (true, false) => println!("{} [{}]", record.source, record.using),
      (true, true) => println!("{}", record.source),
    }
    for action in &record.actions {
      match &action.using {
        Some(using) => println!("  - {} ({})", action, using),
        None => println!("  - {}", action),
      }
    }
  }

  Ok(())
}
