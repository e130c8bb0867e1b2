use crate::ports::outbound::{RemoteLookupClient, RepositoryMetadata, TagInfo};
use crate::shared::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Number of tags requested when falling back from releases to tags
const TAGS_PER_PAGE: u32 = 30;

/// Annotated tags may point at other tag objects; follow at most this many
const MAX_TAG_DEREFERENCES: usize = 3;

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct AnnotatedTag {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    commit: Option<TagCommit>,
}

/// Connection settings for [`GitHubClient`]
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            token: None,
        }
    }
}

impl GitHubSettings {
    /// Reads the API token from `var`, ignoring unset or blank values
    pub fn with_token_from_env(mut self, var: &str) -> Self {
        self.token = std::env::var(var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        self
    }
}

/// GitHubClient adapter for looking up releases and tags over the GitHub REST API
///
/// This adapter implements the RemoteLookupClient port. Requests carry the
/// `application/vnd.github+json` media type and, when configured, a bearer
/// token for the higher authenticated rate limit.
///
/// # Async Support
/// Uses the async reqwest client so the analyzer can run lookups for many
/// dependencies concurrently.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    max_retries: u32,
}

impl GitHubClient {
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &settings.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| anyhow::anyhow!("Invalid GitHub token format"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = format!("action-deps/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            max_retries: 3,
        })
    }

    /// Rejects owner and repository names that could alter the request path
    fn validate_url_component(component: &str, component_type: &str) -> Result<()> {
        if component.is_empty() {
            anyhow::bail!("{} must not be empty", component_type);
        }

        if component.contains('/') || component.contains('\\') {
            anyhow::bail!(
                "Security: {} contains path separators which are not allowed",
                component_type
            );
        }

        if component.contains("..") {
            anyhow::bail!(
                "Security: {} contains '..' which is not allowed",
                component_type
            );
        }

        if component.contains('#') || component.contains('?') || component.contains('@') {
            anyhow::bail!("Security: {} contains URL-unsafe characters", component_type);
        }

        Ok(())
    }

    /// `<api>/repos/<owner>/<repo><suffix>` with validated, encoded components
    fn repo_url(&self, owner: &str, repo: &str, suffix: &str) -> Result<String> {
        Self::validate_url_component(owner, "Owner")?;
        Self::validate_url_component(repo, "Repository")?;

        Ok(format!(
            "{}/repos/{}/{}{}",
            self.api_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            suffix
        ))
    }

    /// Tag names may contain `/`; each segment is encoded on its own
    fn encode_ref(tag: &str) -> Result<String> {
        if tag.is_empty() || tag.split('/').any(|segment| segment.is_empty() || segment == "..")
        {
            anyhow::bail!("Security: tag '{}' is not a valid ref name", tag);
        }

        Ok(tag
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// GET with retry; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.fetch_json(url).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    debug!(url, attempt, error = %e, "GitHub request failed");
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("GitHub request to {} was not attempted", url)))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("GitHub API returned status code {}", response.status());
        }

        Ok(Some(response.json().await?))
    }

    /// Follows annotated tag objects down to the commit they point at
    async fn peel_to_commit(&self, owner: &str, repo: &str, mut object: GitObject) -> Result<Option<String>> {
        for _ in 0..MAX_TAG_DEREFERENCES {
            if object.kind != "tag" {
                return Ok(Some(object.sha));
            }

            let url = self.repo_url(owner, repo, &format!("/git/tags/{}", object.sha))?;
            match self.get_json::<AnnotatedTag>(&url).await? {
                Some(tag) => object = tag.object,
                None => return Ok(None),
            }
        }

        anyhow::bail!(
            "Tag chain in {}/{} is deeper than {} levels",
            owner,
            repo,
            MAX_TAG_DEREFERENCES
        )
    }
}

// Note: no Default implementation; client construction can fail.

#[async_trait]
impl RemoteLookupClient for GitHubClient {
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        let url = self.repo_url(owner, repo, "/releases/latest")?;
        let release: Option<Release> = self.get_json(&url).await?;
        Ok(release.map(|release| release.tag_name))
    }

    async fn tag_commit_sha(&self, owner: &str, repo: &str, tag: &str) -> Result<Option<String>> {
        let url = self.repo_url(owner, repo, &format!("/git/ref/tags/{}", Self::encode_ref(tag)?))?;
        match self.get_json::<GitRef>(&url).await? {
            Some(git_ref) => self.peel_to_commit(owner, repo, git_ref.object).await,
            None => Ok(None),
        }
    }

    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<TagInfo>> {
        let url = self.repo_url(owner, repo, &format!("/tags?per_page={}", TAGS_PER_PAGE))?;
        let tags: Vec<Tag> = self.get_json(&url).await?.unwrap_or_default();

        Ok(tags
            .into_iter()
            .map(|tag| TagInfo {
                name: tag.name,
                commit_sha: tag.commit.map(|commit| commit.sha),
            })
            .collect())
    }

    async fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata> {
        let url = self.repo_url(owner, repo, "")?;
        self.get_json(&url)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Repository {}/{} not found", owner, repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new(GitHubSettings::default()).unwrap()
    }

    #[test]
    fn test_github_client_creation() {
        assert!(GitHubClient::new(GitHubSettings::default()).is_ok());

        let settings = GitHubSettings {
            token: Some("ghp_example".to_string()),
            ..GitHubSettings::default()
        };
        assert!(GitHubClient::new(settings).is_ok());
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let settings = GitHubSettings {
            token: Some("bad\ntoken".to_string()),
            ..GitHubSettings::default()
        };
        assert!(GitHubClient::new(settings).is_err());
    }

    #[test]
    fn test_repo_url() {
        let url = client().repo_url("actions", "checkout", "/releases/latest").unwrap();
        assert_eq!(url, "https://api.github.com/repos/actions/checkout/releases/latest");
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let settings = GitHubSettings {
            api_url: "https://ghe.example.com/api/v3/".to_string(),
            ..GitHubSettings::default()
        };
        let client = GitHubClient::new(settings).unwrap();
        let url = client.repo_url("o", "r", "").unwrap();
        assert_eq!(url, "https://ghe.example.com/api/v3/repos/o/r");
    }

    #[test]
    fn test_validate_url_component_rejects_injection() {
        assert!(GitHubClient::validate_url_component("actions", "Owner").is_ok());
        assert!(GitHubClient::validate_url_component("setup-node.js", "Repository").is_ok());

        for bad in ["", "a/b", "a\\b", "..", "a?b", "a#b", "a@b"] {
            assert!(
                GitHubClient::validate_url_component(bad, "Owner").is_err(),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_encode_ref() {
        assert_eq!(GitHubClient::encode_ref("v4.1.1").unwrap(), "v4.1.1");
        assert_eq!(GitHubClient::encode_ref("release/v2").unwrap(), "release/v2");
        assert_eq!(GitHubClient::encode_ref("a b").unwrap(), "a%20b");
        assert!(GitHubClient::encode_ref("").is_err());
        assert!(GitHubClient::encode_ref("../x").is_err());
        assert!(GitHubClient::encode_ref("a//b").is_err());
    }

    #[test]
    fn test_deserialize_payloads() {
        let release: Release =
            serde_json::from_str(r#"{"tag_name": "v4.2.2", "name": "v4.2.2", "draft": false}"#)
                .unwrap();
        assert_eq!(release.tag_name, "v4.2.2");

        let git_ref: GitRef = serde_json::from_str(
            r#"{"ref": "refs/tags/v4", "object": {"sha": "abc", "type": "tag", "url": "x"}}"#,
        )
        .unwrap();
        assert_eq!(git_ref.object.kind, "tag");

        let tags: Vec<Tag> = serde_json::from_str(
            r#"[{"name": "v2.0.0", "commit": {"sha": "def", "url": "x"}}, {"name": "v1.0.0"}]"#,
        )
        .unwrap();
        assert_eq!(tags[0].commit.as_ref().map(|c| c.sha.as_str()), Some("def"));
        assert!(tags[1].commit.is_none());

        let metadata: RepositoryMetadata = serde_json::from_str(
            r#"{"description": "Checkout a Git repository", "default_branch": "main", "stargazers_count": 5}"#,
        )
        .unwrap();
        assert_eq!(metadata.description.as_deref(), Some("Checkout a Git repository"));
        assert_eq!(metadata.html_url, None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_latest_release_live() {
        let client = GitHubClient::new(
            GitHubSettings::default().with_token_from_env(DEFAULT_TOKEN_ENV),
        )
        .unwrap();
        let tag = client.latest_release("actions", "checkout").await.unwrap();
        assert!(tag.is_some());
    }
}
