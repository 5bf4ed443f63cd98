//! Commands the executor can run.
//!
//! A command is built either directly or from a named transaction and its
//! positional string arguments, the way a client submits it:
//!
//! | Name | Arguments |
//! |------|-----------|
//! | `AddPerson` | Address, City, Id, Name, Status, Surname, TelephoneNumber |
//! | `ChangePersonData` | same seven fields |
//! | `GetPerson` | Id |
//! | `GetPersonHistory` | Id |
//! | `PersonExists` | Id |

use population_core::Person;

use crate::convert::convert_result;
use crate::{Error, Result};

/// A registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert a new person
    AddPerson {
        /// Record to insert
        person: Person,
    },
    /// Replace an existing person
    ChangePersonData {
        /// Record with the new field values
        person: Person,
    },
    /// Read the current record
    GetPerson {
        /// Id to look up
        id: String,
    },
    /// Read every committed version of a record
    GetPersonHistory {
        /// Id to look up
        id: String,
    },
    /// Check whether a record is stored
    PersonExists {
        /// Id to look up
        id: String,
    },
}

impl Command {
    /// Every transaction name accepted by [`Command::from_transaction`]
    pub const TRANSACTION_NAMES: [&'static str; 5] = [
        "AddPerson",
        "ChangePersonData",
        "GetPerson",
        "GetPersonHistory",
        "PersonExists",
    ];

    /// Transaction name of this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddPerson { .. } => "AddPerson",
            Command::ChangePersonData { .. } => "ChangePersonData",
            Command::GetPerson { .. } => "GetPerson",
            Command::GetPersonHistory { .. } => "GetPersonHistory",
            Command::PersonExists { .. } => "PersonExists",
        }
    }

    /// True if the command can change state
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::AddPerson { .. } | Command::ChangePersonData { .. }
        )
    }

    /// Build a command from a transaction name and positional arguments
    pub fn from_transaction<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Command> {
        match name {
            "AddPerson" => Ok(Command::AddPerson {
                person: person_args(name, args)?,
            }),
            "ChangePersonData" => Ok(Command::ChangePersonData {
                person: person_args(name, args)?,
            }),
            "GetPerson" => Ok(Command::GetPerson {
                id: id_arg(name, args)?,
            }),
            "GetPersonHistory" => Ok(Command::GetPersonHistory {
                id: id_arg(name, args)?,
            }),
            "PersonExists" => Ok(Command::PersonExists {
                id: id_arg(name, args)?,
            }),
            _ => Err(Error::UnknownTransaction {
                name: name.to_string(),
            }),
        }
    }
}

fn person_args<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Person> {
    convert_result(Person::from_fields(args)).map_err(|e| match e {
        Error::InvalidInput { reason } => Error::InvalidInput {
            reason: format!("{}: {}", name, reason),
        },
        other => other,
    })
}

fn id_arg<S: AsRef<str>>(name: &str, args: &[S]) -> Result<String> {
    match args {
        [id] => Ok(id.as_ref().to_string()),
        _ => Err(Error::InvalidInput {
            reason: format!("{}: expected 1 argument (Id), got {}", name, args.len()),
        }),
    }
}
