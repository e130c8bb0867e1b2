/// Data Transfer Objects for application layer
///
/// DTOs carry configuration into the analyzer and results out of it,
/// keeping the domain layer isolated from adapters.
mod analyzer_config;
mod output_format;
mod reports;

pub use analyzer_config::{AnalyzerConfig, RepositoryIdentity};
pub use output_format::OutputFormat;
pub use reports::{
    AnalysisReport, ApplyReport, BatchAnalysis, FileFailure, FileOutdated, ManifestDependencies,
    OutdatedReport, PinPlan,
};
