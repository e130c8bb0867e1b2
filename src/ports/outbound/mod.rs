/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, hosting API, cache, console).
pub mod dependency_cache;
pub mod manifest_reader;
pub mod output_presenter;
pub mod progress_reporter;
pub mod remote_lookup;
pub mod report_formatter;

pub use dependency_cache::{get_or_set, latest_version_key, repository_key, DependencyCache};
pub use manifest_reader::ManifestReader;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use remote_lookup::{LatestVersion, RemoteLookupClient, RepositoryMetadata, TagInfo};
pub use report_formatter::ReportFormatter;
