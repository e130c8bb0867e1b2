use crate::shared::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tag as returned by a tag listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    pub commit_sha: Option<String>,
}

/// Repository metadata used to enrich dependency descriptions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Latest upstream version of an action, as cached under `latest:<owner>/<repo>`
///
/// `sha` is empty when the tag could not be resolved to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestVersion {
    pub version: String,
    #[serde(default)]
    pub sha: String,
}

impl LatestVersion {
    pub fn commit_sha(&self) -> Option<&str> {
        (!self.sha.is_empty()).then_some(self.sha.as_str())
    }
}

/// RemoteLookupClient port for querying the hosting service of an action
///
/// This port abstracts the version-control hosting API (e.g., GitHub)
/// used to discover the newest release of an action and the commit it
/// points at.
///
/// # Async Support
/// All methods are async; implementations must be `Send + Sync` so lookups
/// can run concurrently.
#[async_trait]
pub trait RemoteLookupClient: Send + Sync {
    /// Tag name of the latest published release, `None` when the repository
    /// has no releases
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<String>>;

    /// Commit SHA the tag points at, `None` when the tag does not exist
    async fn tag_commit_sha(&self, owner: &str, repo: &str, tag: &str) -> Result<Option<String>>;

    /// Tags ordered most recent first
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<TagInfo>>;

    /// Free-text metadata of the repository
    async fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata>;
}
