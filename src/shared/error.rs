use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - all dependencies up to date, or outdated checks not requested
    Success = 0,
    /// Outdated dependencies were found and `--fail-on-outdated` was set
    OutdatedDependencies = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (API error, network error, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::OutdatedDependencies => write!(f, "Outdated Dependencies (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for action dependency analysis.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
#[derive(Debug, Error)]
pub enum ActionDepsError {
    #[error("Action manifest not found: {path}\n\n💡 Hint: {suggestion}")]
    ManifestNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse action manifest: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file contains valid YAML")]
    ManifestParseError { path: PathBuf, details: String },

    #[error("Invalid runs.using value '{value}' in {path}\n\n💡 Hint: Supported values are: composite, node20, node24, docker")]
    InvalidRunMechanism { path: PathBuf, value: String },

    #[error("Cannot pin '{uses}': no commit SHA is known for the target version\n\n💡 Hint: The release tag could not be resolved to a commit; try again later or pin manually")]
    MissingCommitSha { uses: String },

    #[error("Updated manifest failed validation and was restored: {path}\nDetails: {details}\n\n💡 Hint: The original file content is unchanged")]
    UpdateValidationFailed { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid repository '{value}'\n\n💡 Hint: Use the form owner/repo (e.g. \"actions/checkout\")")]
    InvalidRepository { value: String },

    /// Validation error for configuration and builder inputs
    #[error("Validation error: {message}")]
    Validation { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::OutdatedDependencies.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::OutdatedDependencies),
            "Outdated Dependencies (1)"
        );
        assert_eq!(
            format!("{}", ExitCode::ApplicationError),
            "Application Error (3)"
        );
    }

    #[test]
    fn test_manifest_parse_error_display() {
        let error = ActionDepsError::ManifestParseError {
            path: PathBuf::from("/test/action.yml"),
            details: "mapping values are not allowed here".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to parse action manifest"));
        assert!(display.contains("/test/action.yml"));
        assert!(display.contains("mapping values"));
        assert!(display.contains("💡 Hint:"));
    }

    #[test]
    fn test_invalid_run_mechanism_display() {
        let error = ActionDepsError::InvalidRunMechanism {
            path: PathBuf::from("action.yml"),
            value: "node12".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("'node12'"));
        assert!(display.contains("composite"));
    }

    #[test]
    fn test_missing_commit_sha_display() {
        let error = ActionDepsError::MissingCommitSha {
            uses: "actions/checkout@v4".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("actions/checkout@v4"));
        assert!(display.contains("no commit SHA"));
    }

    #[test]
    fn test_update_validation_failed_display() {
        let error = ActionDepsError::UpdateValidationFailed {
            path: PathBuf::from("/repo/action.yml"),
            details: "did not find expected key".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("/repo/action.yml"));
        assert!(display.contains("did not find expected key"));
        assert!(display.contains("restored"));
    }

    #[test]
    fn test_invalid_repository_display() {
        let error = ActionDepsError::InvalidRepository {
            value: "not-a-repo".to_string(),
        };
        assert!(format!("{}", error).contains("owner/repo"));
    }
}
