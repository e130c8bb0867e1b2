/// Ports module defining interfaces for hexagonal architecture
///
/// Only outbound (driven) ports exist: the analyzer is driven directly by
/// its callers, and reaches the file system, hosting API and cache through
/// the traits defined here.
pub mod outbound;
