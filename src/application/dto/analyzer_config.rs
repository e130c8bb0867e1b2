use crate::shared::error::ActionDepsError;
use crate::shared::Result;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// `owner/repo` of the repository whose manifests are analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryIdentity {
    pub owner: String,
    pub repo: String,
}

impl RepositoryIdentity {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo`; both parts must be non-empty and contain no further `/`
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || ActionDepsError::InvalidRepository {
            value: value.to_string(),
        };

        let (owner, repo) = value.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid().into());
        }

        Ok(Self::new(owner, repo))
    }

    /// Case-insensitive match, as on the hosting service
    pub fn matches(&self, owner: &str, repo: &str) -> bool {
        self.owner.eq_ignore_ascii_case(owner) && self.repo.eq_ignore_ascii_case(repo)
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Explicit configuration injected into the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Identity used for the local-action flag and shell-step links
    pub repository: Option<RepositoryIdentity>,
    pub default_branch: String,
    /// Upper bound for every remote call
    pub remote_timeout: Duration,
    pub max_concurrent_lookups: usize,
    pub latest_version_ttl: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            repository: None,
            default_branch: "main".to_string(),
            remote_timeout: Duration::from_secs(10),
            max_concurrent_lookups: 8,
            latest_version_ttl: Duration::from_secs(6 * 60 * 60),
        }
    }
}
