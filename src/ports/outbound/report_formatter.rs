use crate::application::dto::AnalysisReport;
use crate::shared::Result;

/// ReportFormatter port for rendering the outcome of a run
///
/// Implementations turn an [`AnalysisReport`] into the text written to the
/// output destination (human-readable table, JSON, ...).
pub trait ReportFormatter {
    /// Renders the report
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &AnalysisReport) -> Result<String>;
}
