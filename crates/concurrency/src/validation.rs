//! Transaction validation for OCC
//!
//! Rules:
//! - First committer wins, decided on the READ set
//! - A key read as absent is recorded at version 0, so two transactions that
//!   both saw an Id as free cannot both create it
//! - Blind writes (write without read) do not conflict

use population_core::{PopulationError, Storage, Version};
use rustc_hash::FxHashMap;

/// A conflict found during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// Key was read at one version but the committed version is now different
    ReadWriteConflict {
        /// The key that has a conflict
        key: String,
        /// Version recorded in the read set when read
        read_version: Version,
        /// Current version in storage at validation time
        current_version: Version,
    },
}

impl From<ConflictType> for PopulationError {
    fn from(conflict: ConflictType) -> Self {
        match conflict {
            ConflictType::ReadWriteConflict {
                key,
                read_version,
                current_version,
            } => PopulationError::Conflict {
                key,
                read_version,
                current_version,
            },
        }
    }
}

/// Result of transaction validation
///
/// Accumulates all conflicts found. A transaction commits only if
/// `is_valid()` returns true.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Create a validation result with a single conflict
    pub fn conflict(conflict: ConflictType) -> Self {
        ValidationResult {
            conflicts: vec![conflict],
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// Turn into a `Result`, reporting the first conflict
    pub fn into_result(self) -> Result<(), PopulationError> {
        match self.conflicts.into_iter().next() {
            None => Ok(()),
            Some(conflict) => Err(conflict.into()),
        }
    }
}

/// Validate the read set against current storage state
///
/// For each key in the read set, check that the current committed version
/// matches the version read; report a `ReadWriteConflict` otherwise.
/// Conflicts are reported in key order.
pub fn validate_read_set<S: Storage + ?Sized>(
    read_set: &FxHashMap<String, Version>,
    store: &S,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    let mut keys: Vec<&String> = read_set.keys().collect();
    keys.sort();

    for key in keys {
        let read_version = read_set[key];
        let current_version = match store.current_version(key) {
            Ok(v) => v,
            // unreadable counts as changed
            Err(_) => Version::MAX,
        };

        if current_version != read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version,
                current_version,
            });
        }
    }

    result
}
