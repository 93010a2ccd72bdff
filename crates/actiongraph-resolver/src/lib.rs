//! Dependency resolution for actiongraph.
//!
//! # Architecture
//!
//! ```text
//! StandardResolver<S: ContentStore>
//! ├── load_workflows(root, revision) - every file in .github/workflows (fatal on error)
//! ├── load_files(root, revision, paths) - explicit root files (fatal on error)
//! └── resolve(root, revision, roots, recursive)
//!     └── ResolutionContext - visited repositories, visited files, records
//!
//! select(all, selector, index, repo) - filter, resolving numeric workflow ids
//! ```
//!
//! Everything discovered below the root files is best-effort: a dependency that
//! cannot be fetched from its host, nor from the fallback host, simply ends its
//! branch.
//!
//! # Usage
//!
//! ```ignore
//! let resolver = StandardResolver::new(store, ResolverConfig::default());
//! let roots = resolver.load_workflows(&repo, None, &cancel).await?;
//! let all = resolver.resolve(&repo, None, roots, true, &cancel).await?;
//! let ci = expand(&select(&all, "ci.yml", &index, &repo).await?, &all);
//! ```

mod context;
mod error;
mod resolver;
mod select;

pub use error::ResolveError;
pub use resolver::{Resolver, ResolverConfig, StandardResolver};
pub use select::select;
