//! Storage abstraction shared by the concurrency and engine layers

use crate::error::PopulationResult;
use crate::types::{CommitRecord, KeyModification, Version, VersionedValue};

/// Versioned key-value world state with per-key history.
///
/// ## Contract
///
/// - `get` returns the latest committed value of a key, or `None`
/// - `history` returns every committed value of a key, oldest first
/// - `apply` makes a commit visible: for each write it replaces the current
///   value and appends one history entry, atomically per key
/// - versions never go backwards
pub trait Storage: Send + Sync {
    /// Latest committed value of `key`
    fn get(&self, key: &str) -> PopulationResult<Option<VersionedValue>>;

    /// Version of the latest committed value of `key`, 0 if never written
    fn current_version(&self, key: &str) -> PopulationResult<Version> {
        Ok(self.get(key)?.map(|vv| vv.version).unwrap_or(0))
    }

    /// Every committed value of `key` in commit order; empty if never written
    fn history(&self, key: &str) -> PopulationResult<Vec<KeyModification>>;

    /// Apply a committed write set
    fn apply(&self, commit: &CommitRecord) -> PopulationResult<()>;

    /// Highest version applied so far
    fn version(&self) -> Version;
}
