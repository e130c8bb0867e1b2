//! action-deps - dependency analysis for composite GitHub Actions
//!
//! This library reads `action.yml` manifests, lists the actions and shell
//! steps a composite action depends on, checks remote actions for newer
//! releases, and rewrites floating references to commit-pinned ones,
//! following hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`action_analysis`): Manifest model, version classification and comparison, reference rewriting
//! - **Application Layer** (`application`): The dependency analyzer, DTOs and adapter factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use action_deps::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let client = GitHubClient::new(GitHubSettings::default().with_token_from_env("GITHUB_TOKEN"))?;
//! let analyzer = DependencyAnalyzer::new(
//!     YamlManifestReader::new(),
//!     Some(client),
//!     Arc::new(NullCache),
//!     AnalyzerConfig::default(),
//! );
//!
//! let path = Path::new("action.yml");
//! let dependencies = analyzer.analyze_manifest(path).await?;
//! let report = analyzer.check_outdated(&dependencies).await;
//!
//! let plan = analyzer.generate_pinned_updates(path, &report.outdated);
//! let applied = analyzer.apply_updates(&plan.updates, true);
//! println!("{} reference(s) would be pinned", applied.applied.len());
//! # Ok(())
//! # }
//! ```

pub mod action_analysis;
pub mod adapters;
pub mod application;
pub mod config;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action_analysis::domain::{
        ActionManifest, ActionReference, Dependency, OutdatedDependency, PinnedUpdate,
        RunMechanism, UpdateType, VersionType,
    };
    pub use crate::action_analysis::services::{UsesRewriter, VersionClassifier, VersionComparator};
    pub use crate::adapters::outbound::cache::{CacheConfig, NullCache, TtlCache};
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        discover_manifests, resolve_manifest_paths, FileSystemWriter, StdoutPresenter,
        YamlManifestReader,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::network::{GitHubClient, GitHubSettings};
    pub use crate::application::analyzer::DependencyAnalyzer;
    pub use crate::application::dto::{
        AnalysisReport, AnalyzerConfig, ApplyReport, BatchAnalysis, FileFailure, FileOutdated,
        OutdatedReport, OutputFormat, PinPlan, RepositoryIdentity,
    };
    pub use crate::ports::outbound::{
        DependencyCache, LatestVersion, ManifestReader, OutputPresenter, ProgressReporter,
        RemoteLookupClient, ReportFormatter, RepositoryMetadata, TagInfo,
    };
    pub use crate::shared::error::{ActionDepsError, ExitCode};
    pub use crate::shared::Result;
}
