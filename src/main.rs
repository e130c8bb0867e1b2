mod cli;

use action_deps::adapters::outbound::cache::{CacheConfig, NullCache, TtlCache};
use action_deps::adapters::outbound::console::StderrProgressReporter;
use action_deps::adapters::outbound::filesystem::{resolve_manifest_paths, YamlManifestReader};
use action_deps::adapters::outbound::network::{GitHubClient, GitHubSettings, DEFAULT_TOKEN_ENV};
use action_deps::application::analyzer::DependencyAnalyzer;
use action_deps::application::dto::{AnalysisReport, AnalyzerConfig, OutputFormat, RepositoryIdentity};
use action_deps::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use action_deps::config::{discover_config, load_config_from_path, ConfigFile};
use action_deps::ports::outbound::{DependencyCache, ProgressReporter};
use action_deps::shared::error::ExitCode;
use action_deps::shared::Result;
use cli::Args;
use std::io::IsTerminal;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_tracing(args.verbose);

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(code.as_i32());
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "action_deps=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    let repository = match &args.repository {
        Some(value) => Some(RepositoryIdentity::parse(value)?),
        None => config.repository_identity()?,
    };
    let format = args
        .format
        .or(config.output_format()?)
        .unwrap_or_default();
    let fail_on_outdated = args.fail_on_outdated || config.fail_on_outdated.unwrap_or(false);

    let paths = resolve_manifest_paths(&args.paths_or_default())?;
    debug!(count = paths.len(), "Resolved manifest paths");

    let ttl_cache = open_cache(&args, &config).await?;
    let cache: Arc<dyn DependencyCache> = match &ttl_cache {
        Some(cache) => Arc::clone(cache) as Arc<dyn DependencyCache>,
        None => Arc::new(NullCache),
    };

    let remote_timeout = args
        .timeout
        .map(Duration::from_secs)
        .or(config.remote_timeout())
        .unwrap_or(Duration::from_secs(10));
    let client = if args.needs_remote() {
        Some(github_client(&config, remote_timeout)?)
    } else {
        None
    };

    let defaults = AnalyzerConfig::default();
    let analyzer_config = AnalyzerConfig {
        repository,
        default_branch: args
            .default_branch
            .clone()
            .or_else(|| config.default_branch.clone())
            .unwrap_or(defaults.default_branch),
        remote_timeout,
        max_concurrent_lookups: config
            .max_concurrent_lookups
            .unwrap_or(defaults.max_concurrent_lookups),
        latest_version_ttl: defaults.latest_version_ttl,
    };
    let analyzer = DependencyAnalyzer::new(YamlManifestReader::new(), client, cache, analyzer_config);

    let progress = if std::io::stderr().is_terminal() {
        StderrProgressReporter::new()
    } else {
        StderrProgressReporter::quiet()
    };

    progress.report(&format!("🔍 Analyzing {} manifest(s)...", paths.len()));
    let analysis = analyzer.analyze_manifests(&paths).await;
    let mut report = AnalysisReport {
        analysis,
        outdated: None,
        updates: None,
    };

    if args.checks_outdated() {
        progress.report("🔍 Checking latest versions...");
        let outdated = analyzer
            .check_outdated_batch(&report.analysis, &progress)
            .await;
        progress.report_completion(&format!(
            "✅ Found {} outdated dependencies",
            outdated.iter().map(|file| file.report.outdated.len()).sum::<usize>()
        ));

        if args.pin {
            let mut updates = Vec::new();
            for file in &outdated {
                let plan = analyzer.generate_pinned_updates(&file.path, &file.report.outdated);
                if plan.skipped > 0 {
                    warn!(
                        path = %file.path.display(),
                        skipped = plan.skipped,
                        "Outdated dependencies without a resolvable commit were not pinned"
                    );
                }
                updates.extend(plan.updates);
            }
            report.updates = Some(analyzer.apply_updates(&updates, args.dry_run));
        }

        report.outdated = Some(outdated);
    }

    if let Some(cache) = &ttl_cache {
        cache.close().await?;
    }

    let colored = format == OutputFormat::Text
        && !args.no_color
        && args.output.is_none()
        && std::io::stdout().is_terminal();
    progress.report(FormatterFactory::progress_message(format));
    let formatter = FormatterFactory::create(format, colored);
    let output = formatter.format(&report)?;

    let presenter = PresenterFactory::create(PresenterType::from_output(args.output.clone()));
    presenter.present(&output)?;

    Ok(exit_code(&report, fail_on_outdated))
}

fn load_config(args: &Args) -> Result<ConfigFile> {
    match &args.config {
        Some(path) => load_config_from_path(path),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(discover_config(&cwd)?.unwrap_or_default())
        }
    }
}

/// `None` when caching is disabled or nothing remote was requested;
/// `--clear-cache` empties the store first
async fn open_cache(args: &Args, config: &ConfigFile) -> Result<Option<Arc<TtlCache>>> {
    let defaults = CacheConfig::default();
    let cache_config = CacheConfig {
        dir: config
            .cache
            .as_ref()
            .and_then(|cache| cache.dir.clone())
            .unwrap_or(defaults.dir),
        default_ttl: config.cache_ttl().unwrap_or(defaults.default_ttl),
        sweep_interval: config.sweep_interval().unwrap_or(defaults.sweep_interval),
    };

    let enabled = args.needs_remote() && !args.no_cache && config.cache_enabled();
    if !enabled && !args.clear_cache {
        return Ok(None);
    }

    let cache = TtlCache::open(cache_config)?;
    if args.clear_cache {
        cache.clear();
        debug!(path = %cache.file_path().display(), "Cleared lookup cache");
    }

    if enabled {
        Ok(Some(Arc::new(cache)))
    } else {
        cache.close().await?;
        Ok(None)
    }
}

fn github_client(config: &ConfigFile, timeout: Duration) -> Result<GitHubClient> {
    let github = config.github.as_ref();
    let token_env = github
        .and_then(|github| github.token_env.as_deref())
        .unwrap_or(DEFAULT_TOKEN_ENV);

    let mut settings = GitHubSettings {
        timeout,
        ..GitHubSettings::default()
    }
    .with_token_from_env(token_env);
    if let Some(api_url) = github.and_then(|github| github.api_url.clone()) {
        settings.api_url = api_url;
    }

    GitHubClient::new(settings)
}

/// Failures win over outdated findings
fn exit_code(report: &AnalysisReport, fail_on_outdated: bool) -> ExitCode {
    if report.has_failures() {
        ExitCode::ApplicationError
    } else if fail_on_outdated && report.outdated_count() > 0 {
        ExitCode::OutdatedDependencies
    } else {
        ExitCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_deps::action_analysis::domain::{Dependency, OutdatedDependency, UpdateType, VersionType};
    use action_deps::application::dto::{ApplyReport, FileFailure, FileOutdated, OutdatedReport};
    use std::path::PathBuf;

    fn outdated_report() -> AnalysisReport {
        let current = Dependency {
            name: "actions/checkout".to_string(),
            uses: "actions/checkout@v3".to_string(),
            version: "v3".to_string(),
            version_type: VersionType::Semantic,
            is_pinned: false,
            description: String::new(),
            author: "actions".to_string(),
            source_url: String::new(),
            marketplace_url: String::new(),
            with_params: Default::default(),
            is_local_action: false,
            is_shell_script: false,
            script_url: None,
        };
        AnalysisReport {
            outdated: Some(vec![FileOutdated {
                path: PathBuf::from("action.yml"),
                report: OutdatedReport {
                    outdated: vec![OutdatedDependency::new(
                        current,
                        "v4.2.2".to_string(),
                        None,
                        UpdateType::Major,
                    )],
                    skipped: 0,
                },
            }]),
            ..AnalysisReport::default()
        }
    }

    #[test]
    fn test_exit_code_success() {
        assert_eq!(exit_code(&AnalysisReport::default(), true), ExitCode::Success);
        assert_eq!(exit_code(&outdated_report(), false), ExitCode::Success);
    }

    #[test]
    fn test_exit_code_outdated() {
        assert_eq!(
            exit_code(&outdated_report(), true),
            ExitCode::OutdatedDependencies
        );
    }

    #[test]
    fn test_exit_code_failures_win() {
        let mut report = outdated_report();
        report.updates = Some(ApplyReport {
            failures: vec![FileFailure::new("action.yml", &anyhow::anyhow!("boom"))],
            ..ApplyReport::default()
        });
        assert_eq!(exit_code(&report, true), ExitCode::ApplicationError);
    }

    #[test]
    fn test_github_client_from_default_config() {
        let client = github_client(&ConfigFile::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }
}
