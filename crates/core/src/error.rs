//! Error taxonomy for the population registry
//!
//! Every layer below the executor reports failures as [`PopulationError`].
//! The variants follow the registry contract:
//!
//! | Condition | Variant |
//! |-----------|---------|
//! | Insert on an existing Id | `AlreadyExists` |
//! | Update/read on a missing Id | `NotFound` |
//! | Stored bytes don't decode into a record | `Decode` |
//! | Underlying I/O failure | `Storage` |
//! | Change event could not be staged or delivered | `NotificationFailure` |
//! | Read set invalidated by a concurrent commit | `Conflict` |
//! | Malformed caller input | `InvalidInput` |
//! | Bad or unreadable configuration | `Config` |
//! | WAL damaged before its tail | `Corruption` |

use std::io;
use thiserror::Error;

/// Result alias used across the workspace.
pub type PopulationResult<T> = std::result::Result<T, PopulationError>;

/// All errors produced by the registry, the engine, and the storage layers.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// A record with this Id is already present.
    #[error("the person with id {id} already exists")]
    AlreadyExists {
        /// Id that collided
        id: String,
    },

    /// No current record for this Id.
    #[error("the person with id {id} does not exist")]
    NotFound {
        /// Id that was looked up
        id: String,
    },

    /// Stored bytes could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        /// What failed to decode and why
        message: String,
    },

    /// Storage is unavailable (I/O failure underneath the world state).
    #[error("storage unavailable: {message}")]
    Storage {
        /// Operation that failed
        message: String,
        /// Underlying I/O error, when there is one
        #[source]
        source: Option<io::Error>,
    },

    /// Change notification could not be staged or delivered.
    #[error("failed to emit event {event}: {reason}")]
    NotificationFailure {
        /// Event name
        event: String,
        /// Why emission failed
        reason: String,
    },

    /// A key read by the transaction changed before it committed.
    #[error("conflict on key {key}: read version {read_version}, current version {current_version}")]
    Conflict {
        /// Key whose version moved
        key: String,
        /// Version observed by the transaction
        read_version: u64,
        /// Version found at commit time
        current_version: u64,
    },

    /// Caller supplied malformed input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the problem
        message: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Durable state is damaged in a way replay cannot skip.
    #[error("data corruption: {message}")]
    Corruption {
        /// Description of the damage
        message: String,
    },
}

impl PopulationError {
    /// Create an `AlreadyExists` error
    pub fn already_exists(id: impl Into<String>) -> Self {
        PopulationError::AlreadyExists { id: id.into() }
    }

    /// Create a `NotFound` error
    pub fn not_found(id: impl Into<String>) -> Self {
        PopulationError::NotFound { id: id.into() }
    }

    /// Create a `Decode` error
    pub fn decode(message: impl Into<String>) -> Self {
        PopulationError::Decode {
            message: message.into(),
        }
    }

    /// Create a `Storage` error without an I/O source
    pub fn storage(message: impl Into<String>) -> Self {
        PopulationError::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Storage` error wrapping an I/O error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        PopulationError::Storage {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a `NotificationFailure` error
    pub fn notification(event: impl Into<String>, reason: impl Into<String>) -> Self {
        PopulationError::NotificationFailure {
            event: event.into(),
            reason: reason.into(),
        }
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PopulationError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        PopulationError::Config {
            message: message.into(),
        }
    }

    /// Create a `Corruption` error
    pub fn corruption(message: impl Into<String>) -> Self {
        PopulationError::Corruption {
            message: message.into(),
        }
    }

    /// True for errors caused by a concurrent writer rather than by the request itself.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PopulationError::Conflict { .. })
    }
}
