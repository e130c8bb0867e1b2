use crate::action_analysis::domain::ActionManifest;
use crate::shared::Result;
use std::path::Path;

/// ManifestReader port for loading action manifests
///
/// This port abstracts the file system and YAML parsing needed to turn an
/// `action.yml` into an [`ActionManifest`]. The analyzer uses it both for
/// analysis and for validating a manifest after it has been rewritten.
pub trait ManifestReader: Send + Sync {
    /// Reads and parses the manifest at `path`
    ///
    /// Steps are returned as declared; whether they are relevant depends on
    /// `runs.using`, which the caller checks.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist or cannot be read
    /// - The content is not valid YAML or lacks a `runs` section
    fn read_manifest(&self, path: &Path) -> Result<ActionManifest>;
}
