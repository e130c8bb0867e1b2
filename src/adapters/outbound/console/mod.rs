/// Console adapters for user-facing progress
mod progress_reporter;

pub use progress_reporter::StderrProgressReporter;
