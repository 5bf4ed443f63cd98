//! Typed API over the executor.
//!
//! [`Population`] is the entry point for embedding the registry: every
//! method builds a [`Command`], executes it and unpacks the expected
//! [`Output`] variant.

use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use population_core::{ChangeEvent, HistoryEntry, Person};
use population_engine::{Database, PopulationConfig};

use crate::convert::convert_result;
use crate::{Command, Error, Executor, Output, Result};

/// Embedded person registry
#[derive(Debug, Clone)]
pub struct Population {
    executor: Executor,
}

impl Population {
    /// Open (or create) a registry in `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = convert_result(Database::open(path))?;
        Ok(Self::from_database(Arc::new(db)))
    }

    /// Open with an explicit configuration
    pub fn open_with_config(path: impl AsRef<Path>, config: PopulationConfig) -> Result<Self> {
        let db = convert_result(Database::open_with_config(path, config))?;
        Ok(Self::from_database(Arc::new(db)))
    }

    /// In-memory registry; nothing is persisted
    pub fn cache() -> Result<Self> {
        let db = convert_result(Database::cache())?;
        Ok(Self::from_database(Arc::new(db)))
    }

    /// In-memory registry with an explicit configuration
    pub fn cache_with_config(config: PopulationConfig) -> Result<Self> {
        let db = convert_result(Database::cache_with_config(config))?;
        Ok(Self::from_database(Arc::new(db)))
    }

    /// Wrap an already open database
    pub fn from_database(db: Arc<Database>) -> Self {
        Population {
            executor: Executor::new(db),
        }
    }

    /// Command executor
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        self.executor.database()
    }

    // =========================================================================
    // Registry Operations (5)
    // =========================================================================

    /// Insert a new person.
    pub fn add_person(&self, person: Person) -> Result<()> {
        match self.executor.execute(Command::AddPerson { person })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("AddPerson")),
        }
    }

    /// Replace an existing person.
    pub fn change_person_data(&self, person: Person) -> Result<()> {
        match self.executor.execute(Command::ChangePersonData { person })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("ChangePersonData")),
        }
    }

    /// Read the current record.
    pub fn get_person(&self, id: &str) -> Result<Person> {
        match self.executor.execute(Command::GetPerson { id: id.to_string() })? {
            Output::Person(person) => Ok(person),
            _ => Err(unexpected("GetPerson")),
        }
    }

    /// Read every committed version of a record, oldest first.
    pub fn get_person_history(&self, id: &str) -> Result<Vec<HistoryEntry>> {
        match self
            .executor
            .execute(Command::GetPersonHistory { id: id.to_string() })?
        {
            Output::History(history) => Ok(history),
            _ => Err(unexpected("GetPersonHistory")),
        }
    }

    /// Check whether a record is stored.
    pub fn person_exists(&self, id: &str) -> Result<bool> {
        match self
            .executor
            .execute(Command::PersonExists { id: id.to_string() })?
        {
            Output::Bool(exists) => Ok(exists),
            _ => Err(unexpected("PersonExists")),
        }
    }

    // =========================================================================
    // Database Operations
    // =========================================================================

    /// Receive `Change` events for every committed write.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.database().subscribe()
    }

    /// Current configuration.
    pub fn config(&self) -> PopulationConfig {
        self.database().config()
    }

    /// Modify the configuration; persisted for disk-backed registries.
    pub fn update_config<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut PopulationConfig),
    {
        convert_result(self.database().update_config(f))
    }

    /// Flush the database to disk.
    pub fn flush(&self) -> Result<()> {
        convert_result(self.database().flush())
    }
}

fn unexpected(command: &str) -> Error {
    Error::Internal {
        reason: format!("Unexpected output for {}", command),
    }
}
