use crate::action_analysis::domain::{Dependency, OutdatedDependency, UpdateType};
use crate::application::dto::{AnalysisReport, ApplyReport, FileFailure, FileOutdated};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use owo_colors::{AnsiColors, OwoColorize};

/// TextFormatter adapter for a human-readable report
///
/// One section per manifest, followed by the outdated check, the pin
/// updates and any failures. Colours are optional so the same output can
/// go to a terminal or a file.
pub struct TextFormatter {
    colored: bool,
}

impl TextFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn paint(&self, text: &str, color: AnsiColors) -> String {
        if self.colored {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.colored {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Helper methods for rendering sections
impl TextFormatter {
    fn render_manifests(&self, output: &mut String, report: &AnalysisReport) {
        for manifest in &report.analysis.manifests {
            output.push_str(&self.heading(&format!(
                "📦 {} ({} {})\n",
                manifest.path.display(),
                manifest.dependencies.len(),
                plural(manifest.dependencies.len(), "dependency", "dependencies")
            )));

            if manifest.dependencies.is_empty() {
                output.push_str("   (no composite steps)\n");
            }
            for dependency in &manifest.dependencies {
                self.render_dependency(output, dependency);
            }
            output.push('\n');
        }
    }

    fn render_dependency(&self, output: &mut String, dependency: &Dependency) {
        let pin_marker = if dependency.is_pinned {
            self.paint("pinned", AnsiColors::Green)
        } else {
            self.paint("not pinned", AnsiColors::Yellow)
        };

        if dependency.is_shell_script {
            output.push_str(&format!("   - {} [shell]\n", dependency.name));
        } else {
            let kind = if dependency.is_local_action {
                "local".to_string()
            } else {
                dependency.version_type.to_string()
            };
            output.push_str(&format!(
                "   - {} ({}) [{}, {}]\n",
                dependency.name, dependency.uses, kind, pin_marker
            ));
        }

        if !dependency.description.is_empty() {
            output.push_str(&format!("       {}\n", dependency.description));
        }
        if let Some(url) = &dependency.script_url {
            output.push_str(&format!("       {}\n", url));
        }
    }

    fn render_outdated(&self, output: &mut String, files: &[FileOutdated]) {
        output.push_str(&self.heading("🔍 Outdated dependencies\n"));

        let mut any = false;
        for file in files {
            if file.report.outdated.is_empty() && file.report.skipped == 0 {
                continue;
            }
            any = true;
            output.push_str(&format!("   {}\n", file.path.display()));
            for outdated in &file.report.outdated {
                self.render_outdated_entry(output, outdated);
            }
            if file.report.skipped > 0 {
                output.push_str(&format!(
                    "     {} could not be checked\n",
                    self.paint(&file.report.skipped.to_string(), AnsiColors::Yellow)
                ));
            }
        }

        if !any {
            output.push_str(&format!(
                "   {}\n",
                self.paint("All dependencies are up to date", AnsiColors::Green)
            ));
        }
        output.push('\n');
    }

    fn render_outdated_entry(&self, output: &mut String, outdated: &OutdatedDependency) {
        let color = match outdated.update_type {
            UpdateType::Major => AnsiColors::Red,
            UpdateType::Minor => AnsiColors::Yellow,
            UpdateType::Patch | UpdateType::None => AnsiColors::Cyan,
        };
        let security = if outdated.is_security_update {
            format!(" {}", self.paint("⚠ review", AnsiColors::Red))
        } else {
            String::new()
        };

        output.push_str(&format!(
            "     {} → {} ({}){}\n",
            outdated.current.uses,
            outdated.latest_version,
            self.paint(outdated.update_type.as_str(), color),
            security
        ));
    }

    fn render_updates(&self, output: &mut String, updates: &ApplyReport) {
        let title = if updates.dry_run {
            "📌 Pin updates (dry run, nothing written)\n"
        } else {
            "📌 Pin updates\n"
        };
        output.push_str(&self.heading(title));

        if updates.applied.is_empty() {
            output.push_str("   No references were rewritten\n");
        }
        for update in &updates.applied {
            let location = match update.line_number() {
                Some(line) => format!("{}:{}", update.file_path().display(), line),
                None => update.file_path().display().to_string(),
            };
            output.push_str(&format!(
                "   {}\n     {} → {}\n",
                location,
                update.old_uses(),
                self.paint(update.new_uses(), AnsiColors::Green)
            ));
        }
        if updates.unmatched > 0 {
            output.push_str(&format!(
                "   {} {} no longer found in the manifest\n",
                updates.unmatched,
                plural(updates.unmatched, "reference", "references")
            ));
        }
        output.push('\n');
    }

    fn render_failures(&self, output: &mut String, failures: &[&FileFailure]) {
        output.push_str(&self.heading("❌ Failures\n"));
        for failure in failures {
            output.push_str(&format!(
                "   {}: {}\n",
                failure.path.display(),
                self.paint(&first_line(&failure.error), AnsiColors::Red)
            ));
        }
        output.push('\n');
    }

    fn render_summary(&self, output: &mut String, report: &AnalysisReport) {
        let manifests = report.analysis.manifests.len();
        let mut summary = format!(
            "Summary: {} {}, {} {}",
            manifests,
            plural(manifests, "manifest", "manifests"),
            report.analysis.dependency_count(),
            plural(report.analysis.dependency_count(), "dependency", "dependencies")
        );
        if report.outdated.is_some() {
            summary.push_str(&format!(", {} outdated", report.outdated_count()));
        }
        if let Some(updates) = &report.updates {
            summary.push_str(&format!(", {} pinned", updates.applied.len()));
        }
        output.push_str(&summary);
        output.push('\n');
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        self.render_manifests(&mut output, report);

        if let Some(files) = &report.outdated {
            self.render_outdated(&mut output, files);
        }
        if let Some(updates) = &report.updates {
            self.render_updates(&mut output, updates);
        }

        let failures: Vec<&FileFailure> = report
            .analysis
            .failures
            .iter()
            .chain(report.updates.iter().flat_map(|u| u.failures.iter()))
            .collect();
        if !failures.is_empty() {
            self.render_failures(&mut output, &failures);
        }

        self.render_summary(&mut output, report);
        Ok(output)
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Error messages carry a hint paragraph; the table shows only the headline
fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_analysis::domain::{PinnedUpdate, VersionType};
    use crate::application::dto::{BatchAnalysis, ManifestDependencies, OutdatedReport};
    use std::path::PathBuf;

    fn dependency(name: &str, uses: &str, version: &str, pinned: bool) -> Dependency {
        Dependency {
            name: name.to_string(),
            uses: uses.to_string(),
            version: version.to_string(),
            version_type: VersionType::Semantic,
            is_pinned: pinned,
            description: String::new(),
            author: String::new(),
            source_url: String::new(),
            marketplace_url: String::new(),
            with_params: Default::default(),
            is_local_action: false,
            is_shell_script: false,
            script_url: None,
        }
    }

    fn sample_report() -> AnalysisReport {
        let mut shell = dependency("Shell Script #2", "", "", true);
        shell.is_shell_script = true;
        shell.description = "npm ci".to_string();

        AnalysisReport {
            analysis: BatchAnalysis {
                manifests: vec![ManifestDependencies {
                    path: PathBuf::from("action.yml"),
                    dependencies: vec![
                        dependency("actions/checkout", "actions/checkout@v4", "v4", false),
                        shell,
                    ],
                }],
                failures: vec![],
            },
            outdated: None,
            updates: None,
        }
    }

    #[test]
    fn test_format_dependencies() {
        let output = TextFormatter::default().format(&sample_report()).unwrap();

        assert!(output.contains("📦 action.yml (2 dependencies)"));
        assert!(output.contains("   - actions/checkout (actions/checkout@v4) [semantic, not pinned]"));
        assert!(output.contains("   - Shell Script #2 [shell]"));
        assert!(output.contains("       npm ci"));
        assert!(output.ends_with("Summary: 1 manifest, 2 dependencies\n"));
        assert!(!output.contains("Outdated"));
    }

    #[test]
    fn test_format_outdated_section() {
        let mut report = sample_report();
        report.outdated = Some(vec![FileOutdated {
            path: PathBuf::from("action.yml"),
            report: OutdatedReport {
                outdated: vec![OutdatedDependency::new(
                    dependency("actions/checkout", "actions/checkout@v3", "v3", false),
                    "v4.2.2".to_string(),
                    Some("abc1234".to_string()),
                    UpdateType::Major,
                )],
                skipped: 1,
            },
        }]);

        let output = TextFormatter::default().format(&report).unwrap();

        assert!(output.contains("actions/checkout@v3 → v4.2.2 (major) ⚠ review"));
        assert!(output.contains("1 could not be checked"));
        assert!(output.contains(", 1 outdated"));
    }

    #[test]
    fn test_format_up_to_date() {
        let mut report = sample_report();
        report.outdated = Some(vec![FileOutdated {
            path: PathBuf::from("action.yml"),
            report: OutdatedReport::default(),
        }]);

        let output = TextFormatter::default().format(&report).unwrap();
        assert!(output.contains("All dependencies are up to date"));
    }

    #[test]
    fn test_format_updates_and_failures() {
        let mut report = sample_report();
        let update = PinnedUpdate::new(
            "action.yml",
            "actions/checkout@v4",
            "actions/checkout",
            Some("abc1234"),
            "v4.2.2",
            UpdateType::Patch,
        )
        .unwrap()
        .with_line_number(6);
        report.updates = Some(ApplyReport {
            dry_run: true,
            applied: vec![update],
            unmatched: 1,
            failures: vec![FileFailure::new(
                "other.yml",
                &anyhow::anyhow!("Failed to read file\n\nHint: check permissions"),
            )],
        });

        let output = TextFormatter::default().format(&report).unwrap();

        assert!(output.contains("dry run"));
        assert!(output.contains("action.yml:6"));
        assert!(output.contains("actions/checkout@v4 → actions/checkout@abc1234 # v4.2.2"));
        assert!(output.contains("1 reference no longer found"));
        assert!(output.contains("other.yml: Failed to read file\n"));
        assert!(!output.contains("Hint"));
    }

    #[test]
    fn test_colored_output_contains_escape_codes() {
        let output = TextFormatter::new(true).format(&sample_report()).unwrap();
        assert!(output.contains("\u{1b}["));
    }
}
