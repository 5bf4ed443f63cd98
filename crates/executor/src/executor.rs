//! Command dispatch.

use std::sync::Arc;

use population_engine::Database;
use tracing::debug;

use crate::bridge::Primitives;
use crate::handlers::person;
use crate::{Command, Output, Result};

/// Runs commands against one database.
#[derive(Debug, Clone)]
pub struct Executor {
    primitives: Arc<Primitives>,
}

impl Executor {
    /// Create an executor over a database
    pub fn new(db: Arc<Database>) -> Self {
        Executor {
            primitives: Arc::new(Primitives::new(db)),
        }
    }

    /// Underlying database
    pub fn database(&self) -> &Arc<Database> {
        &self.primitives.db
    }

    /// Execute a command
    pub fn execute(&self, command: Command) -> Result<Output> {
        let name = command.name();
        let p = &self.primitives;
        let result = match command {
            Command::AddPerson { person } => person::add_person(p, person),
            Command::ChangePersonData { person } => person::change_person_data(p, person),
            Command::GetPerson { id } => person::get_person(p, id),
            Command::GetPersonHistory { id } => person::get_person_history(p, id),
            Command::PersonExists { id } => person::person_exists(p, id),
        };

        match &result {
            Ok(_) => debug!(command = name, "Command executed"),
            Err(e) => debug!(command = name, error = %e, "Command failed"),
        }
        result
    }

    /// Execute a named transaction with positional arguments and return its
    /// serialized payload (empty for writes)
    pub fn submit_transaction<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<Vec<u8>> {
        let command = Command::from_transaction(name, args)?;
        self.execute(command)?.to_payload()
    }

    /// Execute a read-only named transaction and return its payload.
    ///
    /// Write transactions are refused with `InvalidInput`.
    pub fn evaluate_transaction<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<Vec<u8>> {
        let command = Command::from_transaction(name, args)?;
        if command.is_write() {
            return Err(crate::Error::InvalidInput {
                reason: format!("{} modifies state; submit it instead", name),
            });
        }
        self.execute(command)?.to_payload()
    }
}
