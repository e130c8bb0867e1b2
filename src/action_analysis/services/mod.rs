pub mod uses_rewriter;
pub mod version_classifier;
pub mod version_comparator;

pub use uses_rewriter::{Rewrite, UsesRewriter};
pub use version_classifier::VersionClassifier;
pub use version_comparator::VersionComparator;
