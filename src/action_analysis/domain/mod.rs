pub mod dependency;
pub mod manifest;
pub mod outdated;
pub mod pinned_update;

pub use dependency::{ActionReference, Dependency, VersionType};
pub use manifest::{ActionManifest, RunMechanism, RunsConfig, Step};
pub use outdated::{OutdatedDependency, UpdateType};
pub use pinned_update::PinnedUpdate;
