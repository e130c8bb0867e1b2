use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of the `@ref` part of an action reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    /// `v4`, `v4.1`, `v4.1.1`, `1.2.3-rc.1`
    Semantic,
    /// 7-40 lowercase hex characters
    CommitSha,
    /// Anything else: `main`, `release/v2`, ...
    BranchName,
    /// `./path`, `../path`, `docker://image`, or an unparseable reference
    LocalPath,
}

impl VersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Semantic => "semantic",
            VersionType::CommitSha => "commit",
            VersionType::BranchName => "branch",
            VersionType::LocalPath => "local",
        }
    }
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `owner/repo[/subpath]@ref` reference
///
/// References that are local paths, docker images, or malformed keep empty
/// `owner` and `repo`. Use [`ActionReference::is_resolvable`] before treating
/// the value as a remote dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReference {
    pub owner: String,
    pub repo: String,
    pub subpath: Option<String>,
    pub version: String,
    pub version_type: VersionType,
}

impl ActionReference {
    pub(crate) fn unresolved() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            subpath: None,
            version: String::new(),
            version_type: VersionType::LocalPath,
        }
    }

    /// True when both owner and repo were extracted
    pub fn is_resolvable(&self) -> bool {
        !self.owner.is_empty() && !self.repo.is_empty()
    }

    /// `owner/repo` plus the sub-directory, if any
    pub fn action_path(&self) -> String {
        match &self.subpath {
            Some(subpath) => format!("{}/{}/{}", self.owner, self.repo, subpath),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }
}

/// One action reference or inline shell step discovered in a manifest
///
/// Exactly one of `uses` (non-empty) and `is_shell_script` describes the step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub name: String,
    /// Raw `owner/repo@ref` text as written in the manifest; empty for shell steps
    pub uses: String,
    pub version: String,
    pub version_type: VersionType,
    pub is_pinned: bool,
    pub description: String,
    pub author: String,
    pub source_url: String,
    pub marketplace_url: String,
    pub with_params: BTreeMap<String, String>,
    pub is_local_action: bool,
    pub is_shell_script: bool,
    /// Link to the manifest line a shell step was declared on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_url: Option<String>,
}

impl Dependency {
    /// Whether the dependency points at another repository and can drift
    ///
    /// Container images are not actions and have no upstream release.
    pub fn is_remote(&self) -> bool {
        !self.is_shell_script && !self.is_local_action && !self.uses.starts_with("docker://")
    }
}
