use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// The subset of an `action.yml` the dependency engine consumes
#[derive(Debug, Clone, Deserialize)]
pub struct ActionManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub runs: RunsConfig,
    /// Raw file text, kept for line lookups
    #[serde(skip)]
    pub source: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunsConfig {
    #[serde(default)]
    pub using: String,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uses: Option<String>,
    #[serde(default)]
    pub with: BTreeMap<String, serde_yaml_ng::Value>,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub shell: Option<String>,
}

impl Step {
    /// `with:` parameters rendered as plain strings
    pub fn params(&self) -> BTreeMap<String, String> {
        self.with
            .iter()
            .map(|(key, value)| (key.clone(), param_to_string(value)))
            .collect()
    }
}

fn param_to_string(value: &serde_yaml_ng::Value) -> String {
    use serde_yaml_ng::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Accepted values of `runs.using`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMechanism {
    Composite,
    Node20,
    Node24,
    Docker,
}

impl RunMechanism {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "composite" => Some(RunMechanism::Composite),
            "node20" => Some(RunMechanism::Node20),
            "node24" => Some(RunMechanism::Node24),
            "docker" => Some(RunMechanism::Docker),
            _ => None,
        }
    }
}

impl fmt::Display for RunMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RunMechanism::Composite => "composite",
            RunMechanism::Node20 => "node20",
            RunMechanism::Node24 => "node24",
            RunMechanism::Docker => "docker",
        };
        f.write_str(value)
    }
}

impl ActionManifest {
    /// 1-based line of the `ordinal`-th (0-based) step-level `run:` key
    pub fn run_line(&self, ordinal: usize) -> Option<usize> {
        self.source
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let trimmed = line.trim_start();
                let trimmed = trimmed.strip_prefix("- ").unwrap_or(trimmed).trim_start();
                trimmed.starts_with("run:")
            })
            .nth(ordinal)
            .map(|(index, _)| index + 1)
    }
}
