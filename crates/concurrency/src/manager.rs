//! Commit coordination
//!
//! Commits are serialized by one lock. Inside it, in order:
//! 1. validate the read set (first committer wins)
//! 2. allocate the next version and a strictly increasing timestamp
//! 3. `CommitPipeline::prepare` (durability, strict delivery); an error aborts
//! 4. apply the write set to storage
//! 5. `CommitPipeline::committed` (best-effort delivery)
//!
//! Read-only transactions skip all of it.

use parking_lot::Mutex;
use population_core::{
    ChangeEvent, CommitRecord, PopulationResult, Storage, Timestamp, Version,
};
use tracing::debug;

use crate::transaction::TransactionContext;
use crate::validation::validate_read_set;

/// Hooks run inside the commit critical section
pub trait CommitPipeline {
    /// Runs after validation and before the write set is applied.
    ///
    /// Returning an error aborts the commit; storage is left untouched.
    fn prepare(&self, commit: &CommitRecord, event: Option<&ChangeEvent>) -> PopulationResult<()>;

    /// Runs after the write set is applied. Cannot fail the commit.
    fn committed(&self, commit: &CommitRecord, event: Option<ChangeEvent>);
}

/// Pipeline that does nothing beyond applying to storage
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPipeline;

impl CommitPipeline for NoopPipeline {
    fn prepare(&self, _commit: &CommitRecord, _event: Option<&ChangeEvent>) -> PopulationResult<()> {
        Ok(())
    }

    fn committed(&self, _commit: &CommitRecord, _event: Option<ChangeEvent>) {}
}

/// Serializes commits and assigns versions and timestamps
#[derive(Debug)]
pub struct TransactionManager {
    /// Commit lock; guards the last assigned timestamp
    last_timestamp: Mutex<Timestamp>,
}

impl TransactionManager {
    /// Create a manager; `last_timestamp` is the newest commit time already in storage
    pub fn new(last_timestamp: Timestamp) -> Self {
        TransactionManager {
            last_timestamp: Mutex::new(last_timestamp),
        }
    }

    /// Timestamp of the latest commit
    pub fn last_timestamp(&self) -> Timestamp {
        *self.last_timestamp.lock()
    }

    /// Validate and commit a transaction.
    ///
    /// Returns the version assigned, or `None` for a read-only transaction.
    pub fn commit<S, P>(
        &self,
        txn: TransactionContext<'_>,
        store: &S,
        pipeline: &P,
    ) -> PopulationResult<Option<Version>>
    where
        S: Storage + ?Sized,
        P: CommitPipeline + ?Sized,
    {
        if txn.is_read_only() {
            return Ok(None);
        }

        let parts = txn.into_parts();
        let mut last_timestamp = self.last_timestamp.lock();

        validate_read_set(&parts.read_set, store).into_result()?;

        let version = store.version() + 1;
        let timestamp = std::cmp::max(Timestamp::now(), last_timestamp.successor());
        let commit = CommitRecord {
            tx_id: parts.tx_id,
            version,
            timestamp,
            writes: parts.writes,
        };
        let event = parts.event.map(|e| e.committed(version));

        pipeline.prepare(&commit, event.as_ref())?;
        store.apply(&commit)?;
        *last_timestamp = timestamp;

        debug!(
            tx_id = %commit.tx_id,
            version,
            writes = commit.writes.len(),
            "Transaction committed"
        );

        pipeline.committed(&commit, event);
        Ok(Some(version))
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new(Timestamp::EPOCH)
    }
}
