/// Domain layer: action dependency model and pure analysis services
///
/// Nothing in this module performs I/O; manifests arrive already parsed and
/// rewrites operate on in-memory text.
pub mod domain;
pub mod services;
