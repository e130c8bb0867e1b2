use crate::action_analysis::domain::{ActionReference, VersionType};

/// Pure predicates over the `@ref` part of an action reference
pub struct VersionClassifier;

impl VersionClassifier {
    /// 7 to 40 lowercase hex characters
    pub fn is_commit_hash(version: &str) -> bool {
        (7..=40).contains(&version.len())
            && version
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// A full 40-character commit SHA
    pub fn is_full_commit_hash(version: &str) -> bool {
        version.len() == 40 && Self::is_commit_hash(version)
    }

    /// Optional `v`, one to three numeric components, optional
    /// `-pre.release` and `+build` suffixes
    ///
    /// Strings that also qualify as a commit hash (seven or more bare digits)
    /// are not semantic versions, so the two classes never overlap.
    pub fn is_semantic_version(version: &str) -> bool {
        !Self::is_commit_hash(version) && numeric_component_count(version).is_some()
    }

    /// Full SHA, or a complete `major.minor.patch`
    ///
    /// `v4` and `v4.1` are semantic but floating: the tag owner moves them.
    pub fn is_pinned(version: &str) -> bool {
        Self::is_full_commit_hash(version) || numeric_component_count(version) == Some(3)
    }

    /// Commit hash first, then semantic version, otherwise a branch or tag name
    pub fn classify(version: &str) -> VersionType {
        if Self::is_commit_hash(version) {
            VersionType::CommitSha
        } else if Self::is_semantic_version(version) {
            VersionType::Semantic
        } else {
            VersionType::BranchName
        }
    }

    /// `./action` or `../shared/action`
    pub fn is_relative_path(uses: &str) -> bool {
        let uses = uses.trim();
        uses.starts_with("./") || uses.starts_with("../")
    }

    /// Splits `owner/repo[/subpath]@ref`
    ///
    /// Relative paths, `docker://` images and anything not shaped like a
    /// remote reference come back unresolved (empty owner and repo).
    pub fn parse_uses(uses: &str) -> ActionReference {
        let uses = uses.trim();
        if Self::is_relative_path(uses) || uses.starts_with("docker://") {
            return ActionReference::unresolved();
        }

        let Some((path, version)) = uses.split_once('@') else {
            return ActionReference::unresolved();
        };
        if version.is_empty() || version.contains(char::is_whitespace) {
            return ActionReference::unresolved();
        }

        let mut segments = path.split('/');
        let owner = segments.next().unwrap_or_default();
        let repo = segments.next().unwrap_or_default();
        if owner.is_empty() || repo.is_empty() {
            return ActionReference::unresolved();
        }

        let rest: Vec<&str> = segments.collect();
        if rest.iter().any(|segment| segment.is_empty()) {
            return ActionReference::unresolved();
        }
        let subpath = (!rest.is_empty()).then(|| rest.join("/"));

        ActionReference {
            owner: owner.to_string(),
            repo: repo.to_string(),
            subpath,
            version: version.to_string(),
            version_type: Self::classify(version),
        }
    }
}

/// Number of numeric components if `version` has a semantic-version shape
fn numeric_component_count(version: &str) -> Option<usize> {
    let version = version.strip_prefix('v').unwrap_or(version);

    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    let (core, pre_release) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    if !build.into_iter().chain(pre_release).all(is_valid_suffix) {
        return None;
    }

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    Some(parts.len())
}

fn is_valid_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
}
