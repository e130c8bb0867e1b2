use crate::action_analysis::domain::{ActionManifest, Dependency, RunMechanism, Step, VersionType};
use crate::action_analysis::services::VersionClassifier;
use crate::application::dto::{AnalyzerConfig, BatchAnalysis, FileFailure, ManifestDependencies};
use crate::ports::outbound::{
    get_or_set, repository_key, DependencyCache, ManifestReader, RemoteLookupClient,
    RepositoryMetadata,
};
use crate::shared::error::ActionDepsError;
use crate::shared::Result;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

mod outdated;
mod updates;

pub use updates::{backup_path, BACKUP_SUFFIX};


/// Longest shell-step description taken from the script's first line
const SCRIPT_SUMMARY_LEN: usize = 80;

/// DependencyAnalyzer - extracts, checks and pins the dependencies of action manifests
///
/// All collaborators are injected: the manifest reader, an optional remote
/// lookup client (without one, nothing is enriched and only cached versions
/// can be checked), a cache, and the explicit [`AnalyzerConfig`].
///
/// The analyzer holds no mutable state of its own. Concurrent use is safe
/// as long as callers do not update the same file at the same time.
///
/// # Type Parameters
/// * `MR` - ManifestReader implementation
/// * `RC` - RemoteLookupClient implementation
pub struct DependencyAnalyzer<MR, RC> {
    manifest_reader: MR,
    client: Option<RC>,
    cache: Arc<dyn DependencyCache>,
    config: AnalyzerConfig,
}

impl<MR, RC> DependencyAnalyzer<MR, RC>
where
    MR: ManifestReader,
    RC: RemoteLookupClient,
{
    pub fn new(
        manifest_reader: MR,
        client: Option<RC>,
        cache: Arc<dyn DependencyCache>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            manifest_reader,
            client,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Reads a manifest and checks `runs.using` against the supported mechanisms
    ///
    /// This is also the validation applied to a manifest after rewriting it.
    pub fn load_manifest(&self, path: &Path) -> Result<(ActionManifest, RunMechanism)> {
        let manifest = self.manifest_reader.read_manifest(path)?;
        let mechanism = RunMechanism::parse(manifest.runs.using.trim()).ok_or_else(|| {
            ActionDepsError::InvalidRunMechanism {
                path: path.to_path_buf(),
                value: manifest.runs.using.clone(),
            }
        })?;
        Ok((manifest, mechanism))
    }

    /// Dependencies declared by the steps of a composite manifest, in step order
    ///
    /// Non-composite manifests have no steps to analyze and yield an empty
    /// list. Steps whose reference cannot be parsed are skipped.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be read or parsed, or if its
    /// run mechanism is not supported.
    pub async fn analyze_manifest(&self, path: &Path) -> Result<Vec<Dependency>> {
        let (manifest, mechanism) = self.load_manifest(path)?;
        if mechanism != RunMechanism::Composite {
            debug!(path = %path.display(), %mechanism, "Not a composite action, no steps to analyze");
            return Ok(Vec::new());
        }

        let mut dependencies = Vec::with_capacity(manifest.runs.steps.len());
        let mut run_ordinal = 0;

        for (index, step) in manifest.runs.steps.iter().enumerate() {
            let ordinal = run_ordinal;
            if step.run.is_some() {
                run_ordinal += 1;
            }

            if let Some(uses) = step.uses.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
                match self.action_dependency(step, uses) {
                    Some(mut dependency) => {
                        self.enrich(&mut dependency).await;
                        dependencies.push(dependency);
                    }
                    None => debug!(uses, step = index + 1, "Skipping unparseable action reference"),
                }
            } else if let Some(run) = step.run.as_deref().filter(|r| !r.trim().is_empty()) {
                dependencies.push(self.shell_dependency(path, &manifest, step, index, ordinal, run));
            } else {
                debug!(step = index + 1, "Skipping step without uses or run");
            }
        }

        Ok(dependencies)
    }

    /// Analyzes every manifest, collecting failures instead of stopping
    pub async fn analyze_manifests(&self, paths: &[PathBuf]) -> BatchAnalysis {
        let mut batch = BatchAnalysis::default();

        for path in paths {
            match self.analyze_manifest(path).await {
                Ok(dependencies) => batch.manifests.push(ManifestDependencies {
                    path: path.clone(),
                    dependencies,
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to analyze manifest");
                    batch.failures.push(FileFailure::new(path, &e));
                }
            }
        }

        batch
    }

    fn action_dependency(&self, step: &Step, uses: &str) -> Option<Dependency> {
        if VersionClassifier::is_relative_path(uses) {
            return Some(Dependency {
                name: step.name.clone().unwrap_or_else(|| uses.to_string()),
                uses: uses.to_string(),
                version: String::new(),
                version_type: VersionType::LocalPath,
                is_pinned: true,
                description: String::new(),
                author: self
                    .config
                    .repository
                    .as_ref()
                    .map(|repository| repository.owner.clone())
                    .unwrap_or_default(),
                source_url: String::new(),
                marketplace_url: String::new(),
                with_params: step.params(),
                is_local_action: true,
                is_shell_script: false,
                script_url: None,
            });
        }

        if let Some(image) = uses.strip_prefix("docker://") {
            return Some(Dependency {
                name: step.name.clone().unwrap_or_else(|| image.to_string()),
                uses: uses.to_string(),
                version: String::new(),
                version_type: VersionType::LocalPath,
                is_pinned: image.contains("@sha256:"),
                description: String::new(),
                author: String::new(),
                source_url: String::new(),
                marketplace_url: String::new(),
                with_params: step.params(),
                is_local_action: false,
                is_shell_script: false,
                script_url: None,
            });
        }

        let reference = VersionClassifier::parse_uses(uses);
        if !reference.is_resolvable() {
            return None;
        }

        let is_local_action = self
            .config
            .repository
            .as_ref()
            .is_some_and(|repository| repository.matches(&reference.owner, &reference.repo));

        let source_url = match &reference.subpath {
            Some(subpath) => format!(
                "https://github.com/{}/{}/tree/{}/{}",
                reference.owner, reference.repo, reference.version, subpath
            ),
            None => format!("https://github.com/{}/{}", reference.owner, reference.repo),
        };
        let marketplace_url = if is_local_action {
            String::new()
        } else {
            format!("https://github.com/marketplace/actions/{}", reference.repo)
        };

        Some(Dependency {
            name: step.name.clone().unwrap_or_else(|| reference.action_path()),
            uses: uses.to_string(),
            is_pinned: VersionClassifier::is_pinned(&reference.version),
            version: reference.version,
            version_type: reference.version_type,
            description: String::new(),
            author: reference.owner,
            source_url,
            marketplace_url,
            with_params: step.params(),
            is_local_action,
            is_shell_script: false,
            script_url: None,
        })
    }

    fn shell_dependency(
        &self,
        path: &Path,
        manifest: &ActionManifest,
        step: &Step,
        index: usize,
        run_ordinal: usize,
        run: &str,
    ) -> Dependency {
        let script_url = self.config.repository.as_ref().map(|repository| {
            let mut url = format!(
                "https://github.com/{}/{}/blob/{}/{}",
                repository.owner,
                repository.repo,
                self.config.default_branch,
                repository_relative_path(path)
            );
            if let Some(line) = manifest.run_line(run_ordinal) {
                url.push_str(&format!("#L{}", line));
            }
            url
        });

        Dependency {
            name: step
                .name
                .clone()
                .unwrap_or_else(|| format!("Shell Script #{}", index + 1)),
            uses: String::new(),
            version: String::new(),
            version_type: VersionType::LocalPath,
            is_pinned: true,
            description: script_summary(run),
            author: String::new(),
            source_url: String::new(),
            marketplace_url: String::new(),
            with_params: step
                .shell
                .iter()
                .map(|shell| ("shell".to_string(), shell.clone()))
                .collect(),
            is_local_action: false,
            is_shell_script: true,
            script_url,
        }
    }

    /// Fills an empty description from the repository metadata, best effort
    async fn enrich(&self, dependency: &mut Dependency) {
        if !dependency.description.is_empty() || dependency.is_local_action || self.client.is_none()
        {
            return;
        }

        let reference = VersionClassifier::parse_uses(&dependency.uses);
        if !reference.is_resolvable() {
            return;
        }

        match self.repository_metadata(&reference.owner, &reference.repo).await {
            Ok(metadata) => {
                if let Some(description) = metadata.description.filter(|d| !d.trim().is_empty()) {
                    dependency.description = description;
                }
            }
            Err(e) => debug!(uses = %dependency.uses, error = %e, "Description lookup failed"),
        }
    }

    async fn repository_metadata(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata> {
        let key = repository_key(owner, repo);
        let value = get_or_set(&*self.cache, &key, None, move || async move {
            let client = self.remote_client()?;
            let metadata = self.with_timeout(client.repository(owner, repo)).await?;
            Ok::<Value, anyhow::Error>(serde_json::to_value(metadata)?)
        })
        .await?;
        Ok(serde_json::from_value(value)?)
    }

    fn remote_client(&self) -> Result<&RC> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No remote lookup client configured"))
    }

    /// Bounds a remote call by the configured timeout; elapsing is an error
    async fn with_timeout<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.remote_timeout, call)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Remote lookup timed out after {:?}",
                    self.config.remote_timeout
                )
            })?
    }
}

/// Path of the manifest inside its repository, with forward slashes
///
/// The repository root is the nearest ancestor holding `.git`, else the
/// working directory; outside both only the file name is used.
fn repository_relative_path(path: &Path) -> String {
    let cwd = std::env::current_dir().ok();
    let absolute = match &cwd {
        Some(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };

    let git_root = absolute
        .ancestors()
        .skip(1)
        .find(|dir| dir.join(".git").exists());
    let relative = git_root
        .or(cwd.as_deref())
        .and_then(|root| absolute.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .or_else(|| absolute.file_name().map(PathBuf::from))
        .unwrap_or_else(|| absolute.clone());

    relative.to_string_lossy().replace('\\', "/")
}

/// First non-blank line of a script, shortened for display
fn script_summary(run: &str) -> String {
    let first_line = run
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    if first_line.chars().count() > SCRIPT_SUMMARY_LEN {
        let truncated: String = first_line.chars().take(SCRIPT_SUMMARY_LEN).collect();
        format!("{}...", truncated)
    } else {
        first_line.to_string()
    }
}
