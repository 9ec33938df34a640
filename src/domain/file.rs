//! Resolved output file

use std::cmp::Ordering;

/// One source file with its computed destination
///
/// Paths are bundle-relative (source) and project-relative (destination),
/// always using `/` separators. Ordering is by source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Path within the bundle (e.g., "commands/review.md")
    pub source: String,

    /// Path within the target project (e.g., ".claude/commands/review.md")
    pub destination: String,

    /// Whether the file goes through the template renderer (false = copied verbatim)
    pub process: bool,
}

impl ResolvedFile {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, process: bool) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            process,
        }
    }
}

impl PartialOrd for ResolvedFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResolvedFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.destination.cmp(&other.destination))
    }
}
