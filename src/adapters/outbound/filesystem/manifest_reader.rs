use crate::action_analysis::domain::ActionManifest;
use crate::ports::outbound::ManifestReader;
use crate::shared::error::ActionDepsError;
use crate::shared::security::read_manifest_file;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// YamlManifestReader adapter for reading `action.yml` files from disk
///
/// This adapter implements the ManifestReader port. Files go through the
/// shared symlink and size checks before serde_yaml_ng parses them.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlManifestReader;

impl YamlManifestReader {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestReader for YamlManifestReader {
    fn read_manifest(&self, path: &Path) -> Result<ActionManifest> {
        if fs::symlink_metadata(path).is_err() {
            return Err(ActionDepsError::ManifestNotFound {
                path: path.to_path_buf(),
                suggestion: "Pass the path of an action.yml file, or a directory containing one"
                    .to_string(),
            }
            .into());
        }

        let content = read_manifest_file(path).map_err(|e| ActionDepsError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let mut manifest: ActionManifest =
            serde_yaml_ng::from_str(&content).map_err(|e| ActionDepsError::ManifestParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        manifest.source = content;

        Ok(manifest)
    }
}
