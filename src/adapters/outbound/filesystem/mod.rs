/// Filesystem adapters for manifest reading, discovery and output
mod discovery;
mod file_writer;
mod manifest_reader;

pub use discovery::{discover_manifests, resolve_manifest_paths, MANIFEST_FILE_NAMES};
pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use manifest_reader::YamlManifestReader;
