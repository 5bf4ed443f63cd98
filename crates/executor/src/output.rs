//! Command results.

use population_core::{HistoryEntry, Person};

use crate::{Error, Result};

/// Result of executing a [`crate::Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Operation succeeded with nothing to return
    Unit,
    /// A person record
    Person(Person),
    /// A record's history, oldest first
    History(Vec<HistoryEntry>),
    /// A yes/no answer
    Bool(bool),
}

impl Output {
    /// Serialize as the payload returned to a submitting client.
    ///
    /// - `Unit`: empty
    /// - `Person`: the record's JSON encoding
    /// - `History`: JSON array of `{"Data":..,"Time":..}`
    /// - `Bool`: `true` or `false`
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        match self {
            Output::Unit => Ok(Vec::new()),
            Output::Person(person) => serde_json::to_vec(person).map_err(serialization),
            Output::History(entries) => serde_json::to_vec(entries).map_err(serialization),
            Output::Bool(value) => Ok(value.to_string().into_bytes()),
        }
    }
}

fn serialization(e: serde_json::Error) -> Error {
    Error::Serialization {
        reason: e.to_string(),
    }
}
