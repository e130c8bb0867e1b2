use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
use crate::ports::outbound::OutputPresenter;
use std::path::PathBuf;

/// Where the rendered report goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterType {
    Stdout,
    File(PathBuf),
}

/// Factory for creating output presenters
///
/// Maps the `--output` choice of the CLI to a presenter adapter.
pub struct PresenterFactory;

impl PresenterType {
    /// `--output <path>` selects a file, no flag selects stdout
    pub fn from_output(output: Option<PathBuf>) -> Self {
        output.map_or(PresenterType::Stdout, PresenterType::File)
    }
}

impl PresenterFactory {
    /// Creates a presenter instance for the specified type
    ///
    /// `File` writes the report to the given path, `Stdout` prints it.
    ///
    /// # Examples
    /// ```
    /// use action_deps::application::factories::{PresenterFactory, PresenterType};
    ///
    /// let presenter = PresenterFactory::create(PresenterType::Stdout);
    /// ```
    pub fn create(presenter_type: PresenterType) -> Box<dyn OutputPresenter> {
        match presenter_type {
            PresenterType::Stdout => Box::new(StdoutPresenter::new()),
            PresenterType::File(path) => Box::new(FileSystemWriter::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_file_presenter_writes_report() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        let presenter = PresenterFactory::create(PresenterType::File(path.clone()));

        presenter.present("{\"analysis\":{}}").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"analysis\":{}}"
        );
    }

    #[test]
    fn test_presenter_type_from_output() {
        assert_eq!(PresenterType::from_output(None), PresenterType::Stdout);
        assert_eq!(
            PresenterType::from_output(Some(PathBuf::from("report.txt"))),
            PresenterType::File(PathBuf::from("report.txt"))
        );
    }

    #[test]
    fn test_presenter_type_equality() {
        let stdout1 = PresenterType::Stdout;
        let stdout2 = PresenterType::Stdout;
        assert_eq!(stdout1, stdout2);

        let file1 = PresenterType::File(PathBuf::from("report-a.json"));
        let file2 = PresenterType::File(PathBuf::from("report-a.json"));
        assert_eq!(file1, file2);

        let file3 = PresenterType::File(PathBuf::from("report-b.json"));
        assert_ne!(file1, file3);
    }

    #[test]
    fn test_presenter_type_clone() {
        let original = PresenterType::File(PathBuf::from("report.txt"));
        let cloned = original.clone();
        assert_eq!(original, cloned);
    }
}
