//! Sharded world state
//!
//! Current values and history chains live side by side in one DashMap entry
//! per key, so a commit replaces the current value and appends the history
//! entry under the same shard lock.
//!
//! # Design
//!
//! - DashMap: sharded by key hash, lock-free reads across shards
//! - KeyChain: current value + append-only history for one key
//! - Global version: highest commit version applied
//!
//! # Thread Safety
//!
//! - get()/history(): read guard on the key's shard only
//! - apply(): write guard per key, never two keys at once
//! - Commit ordering across keys is the transaction manager's job

use dashmap::DashMap;
use population_core::{
    CommitRecord, KeyModification, PopulationResult, Storage, Version, VersionedValue,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Current value and full history of one key
#[derive(Debug, Clone, Default)]
pub struct KeyChain {
    /// Latest committed value
    pub(crate) current: Option<VersionedValue>,
    /// Every committed value, oldest first
    pub(crate) history: Vec<KeyModification>,
}

impl KeyChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed write: replace the current value, append to history
    pub fn push(&mut self, value: VersionedValue) {
        self.history.push(KeyModification::from(&value));
        self.current = Some(value);
    }

    /// Number of committed writes
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True if the key was never written
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Sharded world state: DashMap by key, one [`KeyChain`] per key
///
/// # Example
///
/// ```ignore
/// use population_storage::WorldState;
///
/// let state = WorldState::new();
/// state.apply(&commit)?;
/// let current = state.get("1")?;
/// ```
pub struct WorldState {
    /// Per-key chains
    chains: DashMap<String, KeyChain>,
    /// Highest applied commit version
    version: AtomicU64,
}

impl WorldState {
    /// Create empty world state
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
            version: AtomicU64::new(0),
        }
    }

    /// Create with expected number of keys
    pub fn with_capacity(num_keys: usize) -> Self {
        Self {
            chains: DashMap::with_capacity(num_keys),
            version: AtomicU64::new(0),
        }
    }

    /// Set version (used during recovery)
    pub fn set_version(&self, version: Version) {
        self.version.store(version, Ordering::Release);
    }

    /// Number of keys with a current value
    pub fn key_count(&self) -> usize {
        self.chains
            .iter()
            .filter(|entry| entry.value().current.is_some())
            .count()
    }

    /// Total number of history entries across all keys
    pub fn total_history_entries(&self) -> usize {
        self.chains.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if a key has a current value
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.chains
            .get(key)
            .map(|chain| chain.current.is_some())
            .unwrap_or(false)
    }
}

impl Storage for WorldState {
    #[inline]
    fn get(&self, key: &str) -> PopulationResult<Option<VersionedValue>> {
        Ok(self.chains.get(key).and_then(|chain| chain.current.clone()))
    }

    fn history(&self, key: &str) -> PopulationResult<Vec<KeyModification>> {
        Ok(self
            .chains
            .get(key)
            .map(|chain| chain.history.clone())
            .unwrap_or_default())
    }

    fn apply(&self, commit: &CommitRecord) -> PopulationResult<()> {
        for (key, value) in &commit.writes {
            self.chains
                .entry(key.clone())
                .or_insert_with(KeyChain::new)
                .push(commit.versioned(value.clone()));
        }
        self.version.fetch_max(commit.version, Ordering::AcqRel);
        Ok(())
    }

    #[inline]
    fn version(&self) -> Version {
        self.version.load(Ordering::Acquire)
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldState")
            .field("key_count", &self.key_count())
            .field("version", &Storage::version(self))
            .field("history_entries", &self.total_history_entries())
            .finish()
    }
}
