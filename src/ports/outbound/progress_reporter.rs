/// ProgressReporter port for user feedback during long-running lookups
///
/// Outdated checks contact the hosting API once per dependency; the CLI
/// uses this port to show how far along it is.
pub trait ProgressReporter {
    /// Reports a one-off status line
    fn report(&self, message: &str);

    /// Reports `current` of `total` lookups done
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a warning that does not abort the run
    fn report_error(&self, message: &str);

    /// Reports the end of an operation
    fn report_completion(&self, message: &str);
}
