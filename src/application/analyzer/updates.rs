use super::DependencyAnalyzer;
use crate::action_analysis::domain::{Dependency, OutdatedDependency, PinnedUpdate, UpdateType};
use crate::action_analysis::services::{UsesRewriter, VersionClassifier, VersionComparator};
use crate::application::dto::{ApplyReport, FileFailure, PinPlan};
use crate::ports::outbound::{ManifestReader, RemoteLookupClient};
use crate::shared::error::ActionDepsError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_MANIFEST_SIZE};
use crate::shared::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of the copy written next to a manifest while it is being updated
pub const BACKUP_SUFFIX: &str = ".backup";

impl<MR, RC> DependencyAnalyzer<MR, RC>
where
    MR: ManifestReader,
    RC: RemoteLookupClient,
{
    /// Proposes pinning `dependency` to `latest_sha`, annotated with `latest_version`
    ///
    /// # Errors
    /// Returns `MissingCommitSha` when no SHA is known, and an error when the
    /// dependency is not a remote `owner/repo@ref` reference.
    pub fn generate_pinned_update(
        &self,
        path: &Path,
        dependency: &Dependency,
        latest_version: &str,
        latest_sha: Option<&str>,
    ) -> Result<PinnedUpdate> {
        let update_type = VersionComparator::compare(&dependency.version, latest_version);
        pin(path, dependency, latest_version, latest_sha, update_type)
    }

    /// One update per outdated entry that has a commit SHA
    pub fn generate_pinned_updates(&self, path: &Path, outdated: &[OutdatedDependency]) -> PinPlan {
        let mut plan = PinPlan::default();

        for entry in outdated {
            match pin(
                path,
                &entry.current,
                &entry.latest_version,
                entry.latest_sha.as_deref(),
                entry.update_type,
            ) {
                Ok(update) => plan.updates.push(update),
                Err(e) => {
                    debug!(uses = %entry.current.uses, error = %e, "Cannot pin dependency");
                    plan.skipped += 1;
                }
            }
        }

        plan
    }

    /// Rewrites the manifests named by `updates`, one file at a time
    ///
    /// Each file is backed up, rewritten, and re-validated; a file that no
    /// longer validates is restored from its backup and reported in
    /// `failures` while the remaining files are still processed. With
    /// `dry_run`, line numbers are computed but nothing is written.
    pub fn apply_updates(&self, updates: &[PinnedUpdate], dry_run: bool) -> ApplyReport {
        let mut report = ApplyReport {
            dry_run,
            ..ApplyReport::default()
        };

        for (path, group) in group_by_file(updates) {
            match self.apply_file_updates(path, &group, dry_run) {
                Ok(applied) => {
                    report.unmatched += group.len() - applied.len();
                    report.applied.extend(applied);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to update manifest");
                    report.failures.push(FileFailure::new(path, &e));
                }
            }
        }

        report
    }

    fn apply_file_updates(
        &self,
        path: &Path,
        updates: &[&PinnedUpdate],
        dry_run: bool,
    ) -> Result<Vec<PinnedUpdate>> {
        let read_error = |details: String| ActionDepsError::FileReadError {
            path: path.to_path_buf(),
            details,
        };

        let metadata = validate_regular_file(path, "action manifest")
            .map_err(|e| read_error(e.to_string()))?;
        validate_file_size(metadata.len(), path, MAX_MANIFEST_SIZE)
            .map_err(|e| read_error(e.to_string()))?;
        let original = fs::read(path).map_err(|e| read_error(e.to_string()))?;
        let content = String::from_utf8(original.clone()).map_err(|e| read_error(e.to_string()))?;

        let rewrite = UsesRewriter::rewrite(
            &content,
            updates.iter().map(|update| (update.old_uses(), update.new_uses())),
        );
        let applied: Vec<PinnedUpdate> = updates
            .iter()
            .zip(&rewrite.line_numbers)
            .filter_map(|(update, line)| line.map(|n| (*update).clone().with_line_number(n)))
            .collect();

        if applied.is_empty() || dry_run {
            return Ok(applied);
        }

        let backup = backup_path(path)?;
        fs::write(&backup, &original).map_err(|e| ActionDepsError::FileWriteError {
            path: backup.clone(),
            details: e.to_string(),
        })?;

        if let Err(e) = fs::write(path, &rewrite.content) {
            restore_backup(path, &backup)?;
            return Err(ActionDepsError::FileWriteError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into());
        }

        if let Err(e) = self.load_manifest(path) {
            restore_backup(path, &backup)?;
            return Err(ActionDepsError::UpdateValidationFailed {
                path: path.to_path_buf(),
                details: format!("{:#}", e),
            }
            .into());
        }

        if let Err(e) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), error = %e, "Failed to remove backup file");
        }

        info!(path = %path.display(), updates = applied.len(), "Pinned dependencies");
        Ok(applied)
    }
}

fn pin(
    path: &Path,
    dependency: &Dependency,
    latest_version: &str,
    latest_sha: Option<&str>,
    update_type: UpdateType,
) -> Result<PinnedUpdate> {
    let reference = VersionClassifier::parse_uses(&dependency.uses);
    if dependency.is_shell_script || !reference.is_resolvable() {
        return Err(ActionDepsError::Validation {
            message: format!("'{}' is not a remote action reference", dependency.uses),
        }
        .into());
    }

    PinnedUpdate::new(
        path,
        dependency.uses.clone(),
        &reference.action_path(),
        latest_sha,
        latest_version,
        update_type,
    )
}

/// Groups updates by file, files in order of first appearance
fn group_by_file(updates: &[PinnedUpdate]) -> Vec<(&Path, Vec<&PinnedUpdate>)> {
    let mut groups: Vec<(&Path, Vec<&PinnedUpdate>)> = Vec::new();

    for update in updates {
        match groups.iter().position(|(path, _)| *path == update.file_path()) {
            Some(index) => groups[index].1.push(update),
            None => groups.push((update.file_path(), vec![update])),
        }
    }

    groups
}

/// `action.yml` -> `action.yml.backup`, in the same directory
pub fn backup_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("{} has no file name", path.display()))?;

    let mut backup_name = file_name.to_os_string();
    backup_name.push(BACKUP_SUFFIX);
    Ok(path.with_file_name(backup_name))
}

/// Moves the backup back over the original
fn restore_backup(path: &Path, backup: &Path) -> Result<()> {
    fs::rename(backup, path).map_err(|e| {
        ActionDepsError::FileWriteError {
            path: path.to_path_buf(),
            details: format!(
                "Failed to restore from backup {}: {}. The backup has been kept.",
                backup.display(),
                e
            ),
        }
        .into()
    })
}
