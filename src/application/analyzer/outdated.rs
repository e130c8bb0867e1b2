use super::DependencyAnalyzer;
use crate::action_analysis::domain::{Dependency, OutdatedDependency, UpdateType, VersionType};
use crate::action_analysis::services::{VersionClassifier, VersionComparator};
use crate::application::dto::{BatchAnalysis, FileOutdated, OutdatedReport};
use crate::ports::outbound::{
    get_or_set, latest_version_key, LatestVersion, ManifestReader, ProgressReporter,
    RemoteLookupClient,
};
use crate::shared::Result;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::debug;

/// One shared lookup per `latest:<owner>/<repo>` key within a check run
type LatestLookups = HashMap<String, OnceCell<std::result::Result<LatestVersion, String>>>;

enum CheckOutcome {
    Outdated(OutdatedDependency),
    Current,
    Skipped,
}

impl<MR, RC> DependencyAnalyzer<MR, RC>
where
    MR: ManifestReader,
    RC: RemoteLookupClient,
{
    /// Remote dependencies with a newer upstream version, in input order
    ///
    /// Shell steps and local actions are not checked. A dependency whose
    /// reference cannot be resolved, or whose lookup fails or times out, is
    /// counted in `skipped` instead of failing the call.
    pub async fn check_outdated(&self, dependencies: &[Dependency]) -> OutdatedReport {
        let candidates: Vec<&Dependency> =
            dependencies.iter().filter(|dep| dep.is_remote()).collect();
        let outcomes = self.check_each(&candidates, |_, _| {}).await;
        tally(outcomes)
    }

    /// Checks every manifest of a batch, reporting progress per lookup
    ///
    /// Lookups for all files share one concurrency budget. The result has one
    /// entry per analyzed manifest, in batch order.
    pub async fn check_outdated_batch(
        &self,
        analysis: &BatchAnalysis,
        progress: &dyn ProgressReporter,
    ) -> Vec<FileOutdated> {
        let candidates: Vec<(usize, &Dependency)> = analysis
            .manifests
            .iter()
            .enumerate()
            .flat_map(|(index, manifest)| {
                manifest
                    .dependencies
                    .iter()
                    .filter(|dep| dep.is_remote())
                    .map(move |dep| (index, dep))
            })
            .collect();

        let dependencies: Vec<&Dependency> = candidates.iter().map(|(_, dep)| *dep).collect();
        let outcomes = self
            .check_each(&dependencies, |done, total| {
                progress.report_progress(done, total, Some("checking latest versions"))
            })
            .await;

        let mut per_file: Vec<Vec<CheckOutcome>> =
            analysis.manifests.iter().map(|_| Vec::new()).collect();
        for ((index, _), outcome) in candidates.iter().zip(outcomes) {
            per_file[*index].push(outcome);
        }

        analysis
            .manifests
            .iter()
            .zip(per_file)
            .map(|(manifest, outcomes)| FileOutdated {
                path: manifest.path.clone(),
                report: tally(outcomes),
            })
            .collect()
    }

    /// Runs the lookups with bounded concurrency, keeping input order
    ///
    /// Dependencies on the same repository share a single lookup, so
    /// concurrent checks never race each other past the cache.
    async fn check_each<F>(&self, dependencies: &[&Dependency], mut on_progress: F) -> Vec<CheckOutcome>
    where
        F: FnMut(usize, usize),
    {
        let total = dependencies.len();
        let limit = self.config.max_concurrent_lookups.max(1);
        let mut outcomes = Vec::with_capacity(total);

        let lookups: LatestLookups = dependencies
            .iter()
            .map(|dep| VersionClassifier::parse_uses(&dep.uses))
            .filter(|reference| reference.is_resolvable())
            .map(|reference| {
                (
                    latest_version_key(&reference.owner, &reference.repo),
                    OnceCell::new(),
                )
            })
            .collect();

        let mut results = std::pin::pin!(stream::iter(dependencies.iter().copied())
            .map(|dep| self.check_one(dep, &lookups))
            .buffered(limit));

        while let Some(outcome) = results.next().await {
            outcomes.push(outcome);
            on_progress(outcomes.len(), total);
        }

        outcomes
    }

    async fn check_one(&self, dependency: &Dependency, lookups: &LatestLookups) -> CheckOutcome {
        match self.outdated_entry(dependency, lookups).await {
            Ok(Some(outdated)) => CheckOutcome::Outdated(outdated),
            Ok(None) => CheckOutcome::Current,
            Err(e) => {
                debug!(uses = %dependency.uses, error = %e, "Skipping outdated check");
                CheckOutcome::Skipped
            }
        }
    }

    async fn outdated_entry(
        &self,
        dependency: &Dependency,
        lookups: &LatestLookups,
    ) -> Result<Option<OutdatedDependency>> {
        let reference = VersionClassifier::parse_uses(&dependency.uses);
        if !reference.is_resolvable() {
            anyhow::bail!("'{}' is not a remote action reference", dependency.uses);
        }

        let key = latest_version_key(&reference.owner, &reference.repo);
        let latest = match lookups.get(&key) {
            Some(cell) => cell
                .get_or_init(|| async {
                    self.latest_version(&reference.owner, &reference.repo)
                        .await
                        .map_err(|e| format!("{:#}", e))
                })
                .await
                .clone()
                .map_err(anyhow::Error::msg)?,
            None => self.latest_version(&reference.owner, &reference.repo).await?,
        };

        let already_at_latest_commit = reference.version_type == VersionType::CommitSha
            && latest
                .commit_sha()
                .is_some_and(|sha| sha.starts_with(&reference.version));
        let update_type = if already_at_latest_commit {
            UpdateType::None
        } else {
            VersionComparator::compare(&reference.version, &latest.version)
        };

        if update_type == UpdateType::None {
            return Ok(None);
        }

        let latest_sha = latest.commit_sha().map(str::to_string);
        Ok(Some(OutdatedDependency::new(
            dependency.clone(),
            latest.version,
            latest_sha,
            update_type,
        )))
    }

    /// Cache-first lookup under `latest:<owner>/<repo>`
    pub async fn latest_version(&self, owner: &str, repo: &str) -> Result<LatestVersion> {
        let key = latest_version_key(owner, repo);
        let ttl = Some(self.config.latest_version_ttl);

        let value = get_or_set(&*self.cache, &key, ttl, move || async move {
            let latest = self.fetch_latest_version(owner, repo).await?;
            Ok::<Value, anyhow::Error>(serde_json::to_value(latest)?)
        })
        .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Latest release first, then the most recent tag
    async fn fetch_latest_version(&self, owner: &str, repo: &str) -> Result<LatestVersion> {
        let client = self.remote_client()?;

        match self.with_timeout(client.latest_release(owner, repo)).await {
            Ok(Some(tag)) => {
                let sha = self.resolve_tag_sha(owner, repo, &tag).await;
                return Ok(LatestVersion { version: tag, sha });
            }
            Ok(None) => debug!(owner, repo, "No published release, falling back to tags"),
            Err(e) => debug!(owner, repo, error = %e, "Release lookup failed, falling back to tags"),
        }

        let tags = self.with_timeout(client.list_tags(owner, repo)).await?;
        let tag = tags
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("{}/{} has no releases or tags", owner, repo))?;

        let sha = match tag.commit_sha.filter(|sha| !sha.is_empty()) {
            Some(sha) => sha,
            None => self.resolve_tag_sha(owner, repo, &tag.name).await,
        };
        Ok(LatestVersion {
            version: tag.name,
            sha,
        })
    }

    /// Commit SHA of a tag, empty when it cannot be resolved
    async fn resolve_tag_sha(&self, owner: &str, repo: &str, tag: &str) -> String {
        let Ok(client) = self.remote_client() else {
            return String::new();
        };

        match self.with_timeout(client.tag_commit_sha(owner, repo, tag)).await {
            Ok(sha) => sha.unwrap_or_default(),
            Err(e) => {
                debug!(owner, repo, tag, error = %e, "Tag commit lookup failed");
                String::new()
            }
        }
    }
}

fn tally(outcomes: Vec<CheckOutcome>) -> OutdatedReport {
    let mut report = OutdatedReport::default();
    for outcome in outcomes {
        match outcome {
            CheckOutcome::Outdated(outdated) => report.outdated.push(outdated),
            CheckOutcome::Current => {}
            CheckOutcome::Skipped => report.skipped += 1,
        }
    }
    report
}
