//! Revision identifiers and commit-range enumeration.

use crate::error::Result;
use crate::vcs::Vcs;
use std::fmt;
use std::path::Path;

/// An opaque, immutable identifier for a commit (full hex id).
///
/// Equality is identifier equality; revisions are never mutated, only
/// created by the underlying version-control system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated id for diagnostics.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// List the commits reachable from `new_inclusive` but not from
/// `old_exclusive`, oldest first.
///
/// The underlying tool lists newest-first; the reversal here is load-bearing:
/// replay must follow the order the history was originally authored, or
/// dependent changes fail to reapply. The range is computed once per rewrite
/// run and not mutated afterwards.
pub fn commits_between(
    vcs: &dyn Vcs,
    dir: &Path,
    old_exclusive: &Revision,
    new_inclusive: &Revision,
) -> Result<Vec<Revision>> {
    let mut revisions = vcs.list_revisions(dir, old_exclusive, new_inclusive)?;
    revisions.reverse();
    Ok(revisions)
}
