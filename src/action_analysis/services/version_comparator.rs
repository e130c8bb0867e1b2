use crate::action_analysis::domain::UpdateType;

/// Classifies the distance between two version strings
pub struct VersionComparator;

impl VersionComparator {
    /// Compares `current` to `latest` component by component
    ///
    /// A bare major (`v4`) whose line still contains the latest release
    /// (`v4.1.1`) is a patch update: a floating major already resolves to it.
    /// Otherwise both sides are padded to three components and the first
    /// differing position decides the update type.
    pub fn compare(current: &str, latest: &str) -> UpdateType {
        let current = strip_v(current.trim());
        let latest = strip_v(latest.trim());

        if !current.contains('.') && latest.starts_with(&format!("{}.", current)) {
            return UpdateType::Patch;
        }

        let current_parts = padded_components(current);
        let latest_parts = padded_components(latest);

        if current_parts[0] != latest_parts[0] {
            UpdateType::Major
        } else if current_parts[1] != latest_parts[1] {
            UpdateType::Minor
        } else if current_parts[2] != latest_parts[2] {
            UpdateType::Patch
        } else {
            UpdateType::None
        }
    }
}

fn strip_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

fn padded_components(version: &str) -> [&str; 3] {
    let mut parts = ["0"; 3];
    for (slot, part) in parts.iter_mut().zip(version.splitn(3, '.')) {
        *slot = part;
    }
    parts
}
