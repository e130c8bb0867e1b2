use super::UpdateType;
use crate::shared::error::ActionDepsError;
use crate::shared::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A proposed substitution of one `uses:` reference by a commit-pinned one
///
/// Construction requires a commit SHA, so a `PinnedUpdate` always carries a
/// well-formed replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedUpdate {
    file_path: PathBuf,
    old_uses: String,
    new_uses: String,
    commit_sha: String,
    version: String,
    update_type: UpdateType,
    line_number: Option<usize>,
}

impl PinnedUpdate {
    /// Builds `<action_path>@<sha> # <version>` as the replacement text
    pub fn new(
        file_path: impl Into<PathBuf>,
        old_uses: impl Into<String>,
        action_path: &str,
        commit_sha: Option<&str>,
        version: impl Into<String>,
        update_type: UpdateType,
    ) -> Result<Self> {
        let old_uses = old_uses.into();
        let commit_sha = match commit_sha.map(str::trim) {
            Some(sha) if !sha.is_empty() => sha.to_string(),
            _ => return Err(ActionDepsError::MissingCommitSha { uses: old_uses }.into()),
        };
        let version = version.into();
        let new_uses = format!("{}@{} # {}", action_path, commit_sha, version);

        Ok(Self {
            file_path: file_path.into(),
            old_uses,
            new_uses,
            commit_sha,
            version,
            update_type,
            line_number: None,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn old_uses(&self) -> &str {
        &self.old_uses
    }

    pub fn new_uses(&self) -> &str {
        &self.new_uses
    }

    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn update_type(&self) -> UpdateType {
        self.update_type
    }

    /// 1-based line of the rewritten `uses:` statement, once applied
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub(crate) fn with_line_number(mut self, line_number: usize) -> Self {
        self.line_number = Some(line_number);
        self
    }
}
