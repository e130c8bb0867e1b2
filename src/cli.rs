use clap::Parser;
use std::path::PathBuf;

use action_deps::application::dto::OutputFormat;

/// Analyze, check and pin the dependencies of composite GitHub Actions
#[derive(Parser, Debug)]
#[command(name = "action-deps")]
#[command(version)]
#[command(
    about = "Analyze, check and pin the dependencies of composite GitHub Actions",
    long_about = None
)]
pub struct Args {
    /// Manifest files or directories to scan (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Configuration file (defaults to ./action-deps.config.yml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository the manifests belong to, as owner/repo
    #[arg(short, long, value_name = "OWNER/REPO")]
    pub repository: Option<String>,

    /// Branch used for links to shell steps
    #[arg(long, value_name = "BRANCH")]
    pub default_branch: Option<String>,

    /// Check every remote dependency for a newer release
    #[arg(long)]
    pub outdated: bool,

    /// Pin outdated dependencies to the commit of their latest release
    #[arg(long)]
    pub pin: bool,

    /// With --pin, report the rewrites without touching any file
    #[arg(long, requires = "pin")]
    pub dry_run: bool,

    /// Fetch repository descriptions for remote dependencies
    #[arg(long)]
    pub describe: bool,

    /// Do not read or write the lookup cache
    #[arg(long)]
    pub no_cache: bool,

    /// Empty the lookup cache before running
    #[arg(long)]
    pub clear_cache: bool,

    /// Exit with status 1 when outdated dependencies are found
    #[arg(long)]
    pub fail_on_outdated: bool,

    /// Output format: text or json
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Timeout in seconds for each remote lookup
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Disable coloured text output
    #[arg(long)]
    pub no_color: bool,

    /// Show debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// `--pin` needs the outdated check, so it implies `--outdated`
    pub fn checks_outdated(&self) -> bool {
        self.outdated || self.pin
    }

    /// Whether any requested feature talks to the hosting API
    pub fn needs_remote(&self) -> bool {
        self.checks_outdated() || self.describe
    }

    pub fn paths_or_default(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("action-deps").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert!(args.paths.is_empty());
        assert_eq!(args.paths_or_default(), vec![PathBuf::from(".")]);
        assert!(!args.checks_outdated());
        assert!(!args.needs_remote());
        assert!(args.format.is_none());
    }

    #[test]
    fn test_pin_implies_outdated() {
        let args = parse(&["--pin", "--dry-run", "action.yml"]).unwrap();
        assert!(args.checks_outdated());
        assert!(args.needs_remote());
        assert!(args.dry_run);
        assert_eq!(args.paths, vec![PathBuf::from("action.yml")]);
    }

    #[test]
    fn test_dry_run_requires_pin() {
        assert!(parse(&["--dry-run"]).is_err());
    }

    #[test]
    fn test_format_parsing() {
        let args = parse(&["--format", "json"]).unwrap();
        assert_eq!(args.format, Some(OutputFormat::Json));

        let args = parse(&["-f", "TEXT"]).unwrap();
        assert_eq!(args.format, Some(OutputFormat::Text));

        assert!(parse(&["--format", "xml"]).is_err());
    }

    #[test]
    fn test_describe_needs_remote() {
        let args = parse(&["--describe"]).unwrap();
        assert!(args.needs_remote());
        assert!(!args.checks_outdated());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
