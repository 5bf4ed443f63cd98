//! Transaction context
//!
//! A `TransactionContext` buffers everything a transaction does until commit:
//! - reads go to committed world state and record the version observed
//!   (0 for absent keys) in the read set
//! - writes are buffered in an ordered write set and are invisible to others
//! - reads of a key the transaction already wrote return the buffered value
//! - at most one event is staged; staging again replaces it
//!
//! History reads see committed history only.

use population_core::{
    ChangeEvent, KeyModification, PopulationError, PopulationResult, Storage, TxId, Version,
};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Lifecycle state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Accepting reads and writes
    Active,
    /// Rolled back; any further use is an error
    Aborted,
}

/// In-flight transaction over a [`Storage`]
pub struct TransactionContext<'a> {
    tx_id: TxId,
    store: &'a dyn Storage,
    start_version: Version,
    read_set: FxHashMap<String, Version>,
    write_set: BTreeMap<String, Vec<u8>>,
    event: Option<ChangeEvent>,
    status: TransactionStatus,
}

impl<'a> TransactionContext<'a> {
    /// Begin a transaction against `store`
    pub fn new(store: &'a dyn Storage) -> Self {
        TransactionContext {
            tx_id: TxId::new(),
            start_version: store.version(),
            store,
            read_set: FxHashMap::default(),
            write_set: BTreeMap::new(),
            event: None,
            status: TransactionStatus::Active,
        }
    }

    /// Transaction id
    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    /// Store version when the transaction began
    pub fn start_version(&self) -> Version {
        self.start_version
    }

    /// Current status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    fn ensure_active(&self) -> PopulationResult<()> {
        match self.status {
            TransactionStatus::Active => Ok(()),
            TransactionStatus::Aborted => Err(PopulationError::invalid_input(format!(
                "transaction {} is no longer active",
                self.tx_id
            ))),
        }
    }

    fn validate_key(key: &str) -> PopulationResult<()> {
        if key.is_empty() {
            return Err(PopulationError::invalid_input("key must not be empty"));
        }
        Ok(())
    }

    /// Read a key
    pub fn get(&mut self, key: &str) -> PopulationResult<Option<Vec<u8>>> {
        self.ensure_active()?;
        if let Some(buffered) = self.write_set.get(key) {
            return Ok(Some(buffered.clone()));
        }

        let current = self.store.get(key)?;
        let version = current.as_ref().map(|vv| vv.version).unwrap_or(0);
        // first observation wins; a later re-read must not mask a change
        self.read_set.entry(key.to_string()).or_insert(version);
        Ok(current.map(|vv| vv.value))
    }

    /// Check whether a key has a value (buffered or committed)
    pub fn exists(&mut self, key: &str) -> PopulationResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Buffer a write
    pub fn put(&mut self, key: &str, value: Vec<u8>) -> PopulationResult<()> {
        self.ensure_active()?;
        Self::validate_key(key)?;
        self.write_set.insert(key.to_string(), value);
        Ok(())
    }

    /// Committed history of a key, oldest first
    pub fn history(&self, key: &str) -> PopulationResult<Vec<KeyModification>> {
        self.ensure_active()?;
        self.store.history(key)
    }

    /// Stage an event to be delivered when the transaction commits
    ///
    /// Fails with `NotificationFailure` if `name` is empty.
    pub fn set_event(&mut self, name: &str, payload: Vec<u8>) -> PopulationResult<()> {
        self.ensure_active()?;
        if name.is_empty() {
            return Err(PopulationError::notification(
                "<unnamed>",
                "event name must not be empty",
            ));
        }
        self.event = Some(ChangeEvent::staged(name, payload, self.tx_id));
        Ok(())
    }

    /// Mark aborted; buffered writes and the staged event are discarded
    pub fn abort(&mut self) {
        self.status = TransactionStatus::Aborted;
        self.write_set.clear();
        self.event = None;
    }

    /// True if nothing needs to be committed
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.event.is_none()
    }

    /// Keys read with the versions observed
    pub fn read_set(&self) -> &FxHashMap<String, Version> {
        &self.read_set
    }

    /// Buffered writes in key order
    pub fn write_set(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.write_set
    }

    /// Staged event, if any
    pub fn event(&self) -> Option<&ChangeEvent> {
        self.event.as_ref()
    }

    /// Split into the parts the commit path consumes
    pub(crate) fn into_parts(self) -> TransactionParts {
        TransactionParts {
            tx_id: self.tx_id,
            read_set: self.read_set,
            writes: self.write_set.into_iter().collect(),
            event: self.event,
        }
    }
}

impl std::fmt::Debug for TransactionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("tx_id", &self.tx_id)
            .field("status", &self.status)
            .field("reads", &self.read_set.len())
            .field("writes", &self.write_set.len())
            .field("has_event", &self.event.is_some())
            .finish()
    }
}

/// Owned pieces of a finished transaction
pub(crate) struct TransactionParts {
    pub(crate) tx_id: TxId,
    pub(crate) read_set: FxHashMap<String, Version>,
    pub(crate) writes: Vec<(String, Vec<u8>)>,
    pub(crate) event: Option<ChangeEvent>,
}
