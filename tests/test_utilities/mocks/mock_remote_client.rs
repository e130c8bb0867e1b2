use action_deps::prelude::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock RemoteLookupClient serving canned releases, tags and descriptions
///
/// Counters are shared so a clone handed to the analyzer can still be
/// inspected by the test.
#[derive(Default, Clone)]
pub struct MockRemoteClient {
    releases: HashMap<String, String>,
    tag_shas: HashMap<String, String>,
    tags: HashMap<String, Vec<TagInfo>>,
    descriptions: HashMap<String, String>,
    failing: Vec<String>,
    release_calls: Arc<AtomicUsize>,
    repository_calls: Arc<AtomicUsize>,
}

impl MockRemoteClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// `repo` is `owner/name`; the release tag resolves to `sha`
    pub fn with_release(mut self, repo: &str, tag: &str, sha: &str) -> Self {
        self.releases.insert(repo.to_string(), tag.to_string());
        self.tag_shas
            .insert(format!("{}@{}", repo, tag), sha.to_string());
        self
    }

    pub fn with_tags(mut self, repo: &str, tags: &[(&str, Option<&str>)]) -> Self {
        let tags = tags
            .iter()
            .map(|(name, sha)| TagInfo {
                name: name.to_string(),
                commit_sha: sha.map(str::to_string),
            })
            .collect();
        self.tags.insert(repo.to_string(), tags);
        self
    }

    pub fn with_description(mut self, repo: &str, description: &str) -> Self {
        self.descriptions
            .insert(repo.to_string(), description.to_string());
        self
    }

    /// Every call for `repo` fails
    pub fn failing(mut self, repo: &str) -> Self {
        self.failing.push(repo.to_string());
        self
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn repository_calls(&self) -> usize {
        self.repository_calls.load(Ordering::SeqCst)
    }

    fn check(&self, owner: &str, repo: &str) -> Result<String> {
        let key = format!("{}/{}", owner, repo);
        if self.failing.contains(&key) {
            anyhow::bail!("503 Service Unavailable for {}", key);
        }
        Ok(key)
    }
}

#[async_trait]
impl RemoteLookupClient for MockRemoteClient {
    async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        let key = self.check(owner, repo)?;
        Ok(self.releases.get(&key).cloned())
    }

    async fn tag_commit_sha(&self, owner: &str, repo: &str, tag: &str) -> Result<Option<String>> {
        let key = self.check(owner, repo)?;
        Ok(self.tag_shas.get(&format!("{}@{}", key, tag)).cloned())
    }

    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<TagInfo>> {
        let key = self.check(owner, repo)?;
        Ok(self.tags.get(&key).cloned().unwrap_or_default())
    }

    async fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata> {
        self.repository_calls.fetch_add(1, Ordering::SeqCst);
        let key = self.check(owner, repo)?;
        Ok(RepositoryMetadata {
            description: self.descriptions.get(&key).cloned(),
            ..RepositoryMetadata::default()
        })
    }
}
