use crate::action_analysis::domain::{Dependency, OutdatedDependency, PinnedUpdate};
use serde::Serialize;
use std::path::PathBuf;

/// Dependencies found in one manifest, in step order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestDependencies {
    pub path: PathBuf,
    pub dependencies: Vec<Dependency>,
}

/// A file that could not be analyzed or updated, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
        Self {
            path: path.into(),
            error: format!("{:#}", error),
        }
    }
}

/// Result of analyzing a batch of manifests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchAnalysis {
    pub manifests: Vec<ManifestDependencies>,
    pub failures: Vec<FileFailure>,
}

impl BatchAnalysis {
    pub fn dependency_count(&self) -> usize {
        self.manifests.iter().map(|m| m.dependencies.len()).sum()
    }
}

/// Outdated dependencies in input order, plus how many could not be checked
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutdatedReport {
    pub outdated: Vec<OutdatedDependency>,
    pub skipped: usize,
}

/// Outdated check of one manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutdated {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: OutdatedReport,
}

/// Pin proposals for one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PinPlan {
    pub updates: Vec<PinnedUpdate>,
    /// Outdated entries without a known commit SHA
    pub skipped: usize,
}

/// Outcome of applying pin updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub dry_run: bool,
    /// Updates that matched a line, with the line number filled in
    pub applied: Vec<PinnedUpdate>,
    /// Updates whose original reference no longer appears in the file
    pub unmatched: usize,
    pub failures: Vec<FileFailure>,
}

/// Everything one run produced, as handed to the report formatters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub analysis: BatchAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdated: Option<Vec<FileOutdated>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<ApplyReport>,
}

impl AnalysisReport {
    pub fn outdated_count(&self) -> usize {
        self.outdated.as_ref().map_or(0, |files| {
            files.iter().map(|file| file.report.outdated.len()).sum()
        })
    }

    pub fn has_failures(&self) -> bool {
        !self.analysis.failures.is_empty()
            || self
                .updates
                .as_ref()
                .is_some_and(|updates| !updates.failures.is_empty())
    }
}
