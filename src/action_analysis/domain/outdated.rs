use super::Dependency;
use serde::Serialize;
use std::fmt;

/// Size of the jump between the current and the latest version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    None,
    Patch,
    Minor,
    Major,
}

impl UpdateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateType::None => "none",
            UpdateType::Patch => "patch",
            UpdateType::Minor => "minor",
            UpdateType::Major => "major",
        }
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dependency with a newer upstream release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutdatedDependency {
    pub current: Dependency,
    pub latest_version: String,
    pub latest_sha: Option<String>,
    pub update_type: UpdateType,
    /// Heuristic only: every major bump is flagged, no advisory database is consulted
    pub is_security_update: bool,
}

impl OutdatedDependency {
    pub fn new(
        current: Dependency,
        latest_version: String,
        latest_sha: Option<String>,
        update_type: UpdateType,
    ) -> Self {
        Self {
            current,
            latest_version,
            latest_sha,
            update_type,
            is_security_update: update_type == UpdateType::Major,
        }
    }
}
