use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum manifest size (1 MB)
/// Action manifests are small; anything larger is rejected before parsing
pub const MAX_MANIFEST_SIZE: u64 = 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
/// Rewriting a manifest through a symlink could modify a file outside the
/// repository, so links are refused outright.
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<fs::Metadata> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(metadata)
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Reads a manifest after the regular-file and size checks pass
pub fn read_manifest_file(path: &Path) -> Result<String> {
    let metadata = validate_regular_file(path, "action manifest")?;
    validate_file_size(metadata.len(), path, MAX_MANIFEST_SIZE)?;

    fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_regular_file_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("action.yml");
        fs::write(&file_path, "name: test").unwrap();

        let metadata = validate_regular_file(&file_path, "action manifest").unwrap();
        assert_eq!(metadata.len(), 10);
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "action manifest");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a regular file"));
    }

    #[test]
    fn test_validate_regular_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/action.yml");
        assert!(validate_regular_file(&path, "action manifest").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_regular_file_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.yml");
        let link = temp_dir.path().join("action.yml");
        fs::write(&target, "name: test").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = validate_regular_file(&link, "action manifest").unwrap_err();
        assert!(err.to_string().contains("symbolic link"));
    }

    #[test]
    fn test_validate_file_size_exceeds_limit() {
        let path = PathBuf::from("/test/action.yml");
        let result = validate_file_size(MAX_MANIFEST_SIZE + 1, &path, MAX_MANIFEST_SIZE);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_read_manifest_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("action.yml");
        fs::write(&file_path, "name: test\n").unwrap();

        assert_eq!(read_manifest_file(&file_path).unwrap(), "name: test\n");
    }
}
