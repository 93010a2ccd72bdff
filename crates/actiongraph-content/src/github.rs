use actiongraph_workflow::RepositoryCoordinate;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ContentError;
use crate::{ContentStore, WorkflowIndex};

const PUBLIC_HOST: &str = "github.com";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Entry of a `contents` directory listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
  path: String,
  #[serde(rename = "type")]
  kind: String,
}

#[derive(Debug, Deserialize)]
struct WorkflowInfo {
  path: String,
}

/// Content store backed by the GitHub REST API.
///
/// `github.com` is served from `https://api.github.com`, any other host from
/// `https://{host}/api/v3` (GitHub Enterprise Server). The token is only sent
/// to the host it was configured for.
#[derive(Clone)]
pub struct GitHubStore {
  client: Client,
  token: Option<(String, String)>,
}

impl GitHubStore {
  pub fn new(user_agent: &str) -> Result<Self, ContentError> {
    let client = Client::builder().user_agent(user_agent).build()?;
    Ok(Self {
      client,
      token: None,
    })
  }

  /// Authenticate requests to `host` with `token`.
  pub fn with_token(mut self, host: impl Into<String>, token: impl Into<String>) -> Self {
    self.token = Some((host.into(), token.into()));
    self
  }

  /// REST API root for `host`.
  pub fn api_base(host: &str) -> String {
    if host.eq_ignore_ascii_case(PUBLIC_HOST) {
      "https://api.github.com".to_string()
    } else {
      format!("https://{}/api/v3", host)
    }
  }

  fn token_for(&self, host: &str) -> Option<&str> {
    match &self.token {
      Some((token_host, token)) if token_host.eq_ignore_ascii_case(host) => Some(token.as_str()),
      _ => None,
    }
  }

  /// `{api}/repos/{owner}/{name}/{segments...}`, each `/`-separated part of a
  /// segment becoming its own percent-encoded path segment.
  fn repo_url(repo: &RepositoryCoordinate, segments: &[&str]) -> Result<Url, ContentError> {
    let mut url = Url::parse(&Self::api_base(&repo.host))?;
    url
      .path_segments_mut()
      .map_err(|_| ContentError::InvalidPath(repo.to_string()))?
      .pop_if_empty()
      .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
      .extend(
        segments
          .iter()
          .flat_map(|s| s.split('/'))
          .filter(|s| !s.is_empty()),
      );
    Ok(url)
  }

  fn contents_url(
    repo: &RepositoryCoordinate,
    path: &str,
    revision: Option<&str>,
  ) -> Result<Url, ContentError> {
    let mut url = Self::repo_url(repo, &["contents", path])?;
    if let Some(revision) = revision.filter(|r| !r.is_empty()) {
      url.query_pairs_mut().append_pair("ref", revision);
    }
    Ok(url)
  }

  async fn get(
    &self,
    repo: &RepositoryCoordinate,
    url: Url,
    accept: &str,
    what: String,
  ) -> Result<Response, ContentError> {
    debug!(%url, "github request");

    let mut request = self
      .client
      .get(url.clone())
      .header(header::ACCEPT, accept)
      .header("X-GitHub-Api-Version", API_VERSION);
    if let Some(token) = self.token_for(&repo.host) {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    match response.status() {
      StatusCode::NOT_FOUND => Err(ContentError::NotFound(what)),
      status if !status.is_success() => Err(ContentError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      }),
      _ => Ok(response),
    }
  }
}

/// Paths of the regular files in a directory listing.
fn listed_files(entries: Vec<ContentEntry>) -> Vec<String> {
  entries
    .into_iter()
    .filter(|e| e.kind == "file")
    .map(|e| e.path)
    .collect()
}

#[async_trait]
impl ContentStore for GitHubStore {
  async fn fetch(
    &self,
    repo: &RepositoryCoordinate,
    path: &str,
    revision: Option<&str>,
  ) -> Result<Bytes, ContentError> {
    let url = Self::contents_url(repo, path, revision)?;
    let what = format!("{}:{}", repo, path);
    let response = self.get(repo, url, RAW_MEDIA_TYPE, what).await?;
    Ok(response.bytes().await?)
  }

  async fn list(
    &self,
    repo: &RepositoryCoordinate,
    dir: &str,
    revision: Option<&str>,
  ) -> Result<Vec<String>, ContentError> {
    let url = Self::contents_url(repo, dir, revision)?;
    let what = format!("{}:{}", repo, dir);
    let response = self.get(repo, url.clone(), JSON_MEDIA_TYPE, what).await?;

    // A file path yields an object instead of an array.
    let entries: Vec<ContentEntry> =
      response
        .json()
        .await
        .map_err(|e| ContentError::InvalidResponse {
          url: url.to_string(),
          message: e.to_string(),
        })?;

    Ok(listed_files(entries))
  }
}

#[async_trait]
impl WorkflowIndex for GitHubStore {
  async fn workflow_path(
    &self,
    repo: &RepositoryCoordinate,
    id: u64,
  ) -> Result<String, ContentError> {
    let id = id.to_string();
    let url = Self::repo_url(repo, &["actions", "workflows", id.as_str()])?;
    let what = format!("workflow {} in {}", id, repo);
    let response = self.get(repo, url.clone(), JSON_MEDIA_TYPE, what).await?;

    let info: WorkflowInfo = response
      .json()
      .await
      .map_err(|e| ContentError::InvalidResponse {
        url: url.to_string(),
        message: e.to_string(),
      })?;
    Ok(info.path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_base() {
    assert_eq!(GitHubStore::api_base("github.com"), "https://api.github.com");
    assert_eq!(GitHubStore::api_base("GitHub.com"), "https://api.github.com");
    assert_eq!(
      GitHubStore::api_base("ghe.corp.net"),
      "https://ghe.corp.net/api/v3"
    );
  }

  #[test]
  fn test_contents_url_public() {
    let repo = RepositoryCoordinate::new("github.com", "org", "helper");
    let url = GitHubStore::contents_url(&repo, "sub dir/action.yml", Some("v1")).unwrap();
    assert_eq!(
      url.as_str(),
      "https://api.github.com/repos/org/helper/contents/sub%20dir/action.yml?ref=v1"
    );
  }

  #[test]
  fn test_contents_url_enterprise_default_branch() {
    let repo = RepositoryCoordinate::new("ghe.corp.net", "team", "svc");
    let url = GitHubStore::contents_url(&repo, ".github/workflows", None).unwrap();
    assert_eq!(
      url.as_str(),
      "https://ghe.corp.net/api/v3/repos/team/svc/contents/.github/workflows"
    );
  }

  #[test]
  fn test_contents_url_encodes_revision() {
    let repo = RepositoryCoordinate::new("github.com", "org", "helper");
    let url = GitHubStore::contents_url(&repo, "action.yml", Some("feature/a&b")).unwrap();
    assert_eq!(url.query(), Some("ref=feature%2Fa%26b"));
  }

  #[test]
  fn test_token_only_sent_to_its_host() {
    let store = GitHubStore::new("test")
      .unwrap()
      .with_token("ghe.corp.net", "secret");
    assert_eq!(store.token_for("GHE.corp.net"), Some("secret"));
    assert_eq!(store.token_for("github.com"), None);
  }

  #[test]
  fn test_listing_keeps_files_only() {
    let body = r#"[
      {"name": "ci.yml", "path": ".github/workflows/ci.yml", "type": "file"},
      {"name": "shared", "path": ".github/workflows/shared", "type": "dir"}
    ]"#;
    let entries: Vec<ContentEntry> = serde_json::from_str(body).unwrap();
    assert_eq!(listed_files(entries), vec![".github/workflows/ci.yml"]);
  }
}
