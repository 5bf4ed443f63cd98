//! Person registry primitive
//!
//! Stateless facade over the Database engine. Each operation runs as one
//! transaction; writes stage a `Change` event carrying the encoded record.
//!
//! # Design
//!
//! PersonRegistry holds only an Arc<Database> reference.
//! Multiple registries sharing the same Database see the same data.
//! Clone is cheap (just Arc clone).
//!
//! # Example
//!
//! ```ignore
//! let db = Arc::new(Database::open(path)?);
//! let registry = PersonRegistry::new(db.clone());
//!
//! registry.add_person(&person)?;
//! let stored = registry.get_person("1")?;
//! let history = registry.get_person_history("1")?;
//! ```

use population_core::{
    decode_history, HistoryEntry, Person, PopulationError, PopulationResult, CHANGE_EVENT,
};
use population_engine::{Database, TransactionContext};
use std::sync::Arc;

/// Person registry primitive
///
/// # Thread Safety
///
/// PersonRegistry is Clone and Send + Sync. Concurrent writes to the same Id
/// are resolved at commit: the first committer wins and the others fail with
/// `Conflict` or, if they start later, `AlreadyExists`.
#[derive(Clone)]
pub struct PersonRegistry {
    /// Database reference (shared)
    db: Arc<Database>,
}

impl PersonRegistry {
    /// Create a new registry facade
    ///
    /// # Arguments
    ///
    /// * `db` - Shared database reference
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Check whether a person is currently stored under `id`
    pub fn person_exists(&self, id: &str) -> PopulationResult<bool> {
        self.db.transaction(|txn| txn.exists(id))
    }

    /// Insert a new person
    ///
    /// # Errors
    ///
    /// * `AlreadyExists` - a person with the same Id is stored
    /// * `NotificationFailure` - the change event could not be delivered
    ///   (strict notification policy); nothing is written
    pub fn add_person(&self, person: &Person) -> PopulationResult<()> {
        self.db.transaction(|txn| {
            if txn.exists(&person.id)? {
                return Err(PopulationError::already_exists(&person.id));
            }
            write_person(txn, person)
        })
    }

    /// Replace every field of an existing person
    ///
    /// # Errors
    ///
    /// * `NotFound` - no person is stored under the Id
    /// * `NotificationFailure` - as for [`PersonRegistry::add_person`]
    pub fn change_person_data(&self, person: &Person) -> PopulationResult<()> {
        self.db.transaction(|txn| {
            if !txn.exists(&person.id)? {
                return Err(PopulationError::not_found(&person.id));
            }
            write_person(txn, person)
        })
    }

    /// Fetch the current record
    ///
    /// # Errors
    ///
    /// * `NotFound` - no person is stored under `id`
    /// * `Decode` - the stored bytes are not a valid record
    pub fn get_person(&self, id: &str) -> PopulationResult<Person> {
        self.db.transaction(|txn| match txn.get(id)? {
            Some(bytes) => Person::from_bytes(&bytes),
            None => Err(PopulationError::not_found(id)),
        })
    }

    /// Every committed version of the record, oldest first
    ///
    /// Empty for an Id that was never written. If any entry fails to decode
    /// the whole read fails with `Decode`.
    pub fn get_person_history(&self, id: &str) -> PopulationResult<Vec<HistoryEntry>> {
        let format = self.db.config().time_format;
        self.db.transaction(|txn| {
            let chain = txn.history(id)?;
            decode_history(&chain, format)
        })
    }
}

/// Stage the change event, then buffer the write
fn write_person(txn: &mut TransactionContext<'_>, person: &Person) -> PopulationResult<()> {
    let bytes = person.to_bytes()?;
    txn.set_event(CHANGE_EVENT, bytes.clone())?;
    txn.put(&person.id, bytes)
}

impl std::fmt::Debug for PersonRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonRegistry").field("db", &self.db).finish()
    }
}
