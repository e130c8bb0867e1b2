use crate::shared::error::ActionDepsError;
use crate::shared::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// File names recognised as action manifests
pub const MANIFEST_FILE_NAMES: &[&str] = &["action.yml", "action.yaml"];

fn manifest_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    MANIFEST_FILE_NAMES
        .iter()
        .map(move |name| dir.join(name))
        .filter(|path| {
            fs::symlink_metadata(path)
                .map(|metadata| metadata.is_file())
                .unwrap_or(false)
        })
}

/// Manifests in `dir` and in its immediate sub-directories, sorted
///
/// Symbolic links are not followed.
pub fn discover_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests: Vec<PathBuf> = manifest_in(dir).collect();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            manifests.extend(manifest_in(&entry.path()));
        }
    }

    manifests.sort();
    Ok(manifests)
}

/// Expands command-line inputs: files are kept, directories are discovered
///
/// A directory without any manifest is an error so a typo does not turn
/// into an empty, successful run.
pub fn resolve_manifest_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let found = discover_manifests(input)?;
            if found.is_empty() {
                return Err(ActionDepsError::ManifestNotFound {
                    path: input.clone(),
                    suggestion: format!(
                        "No action.yml or action.yaml found in \"{}\" or its sub-directories",
                        input.display()
                    ),
                }
                .into());
            }
            resolved.extend(found);
        } else {
            resolved.push(input.clone());
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "runs:\n  using: composite\n").unwrap();
    }

    #[test]
    fn test_discover_root_and_one_level() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("action.yml"));
        touch(&root.join("setup").join("action.yaml"));
        touch(&root.join("build").join("action.yml"));
        touch(&root.join("deep").join("nested").join("action.yml"));
        touch(&root.join("other").join("workflow.yml"));

        let found = discover_manifests(root).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("action.yml"),
                root.join("build").join("action.yml"),
                root.join("setup").join("action.yaml"),
            ]
        );
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_manifests(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_keeps_files_and_expands_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a").join("action.yml"));
        let explicit = root.join("explicit.yml");
        touch(&explicit);

        let resolved =
            resolve_manifest_paths(&[explicit.clone(), root.join("a")]).unwrap();

        assert_eq!(resolved, vec![explicit, root.join("a").join("action.yml")]);
    }

    #[test]
    fn test_resolve_directory_without_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = resolve_manifest_paths(&[temp_dir.path().to_path_buf()]);
        assert!(result.is_err());
    }
}
