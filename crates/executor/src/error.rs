//! Executor error type.
//!
//! Every failure a caller of [`crate::Executor`] can observe. Lower layers
//! report [`population_core::PopulationError`]; `convert.rs` maps it here.

use thiserror::Error;

/// Result alias for executor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Executor error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A person with this Id is already stored.
    #[error("the person with id {id} already exists")]
    AlreadyExists {
        /// Colliding Id
        id: String,
    },

    /// No person is stored under this Id.
    #[error("the person with id {id} does not exist")]
    NotFound {
        /// Missing Id
        id: String,
    },

    /// Stored bytes did not decode.
    #[error("decode error: {reason}")]
    Decode {
        /// Details
        reason: String,
    },

    /// The change event could not be emitted.
    #[error("failed to emit event {event}: {reason}")]
    NotificationFailed {
        /// Event name
        event: String,
        /// Details
        reason: String,
    },

    /// A concurrent transaction committed first.
    #[error("conflict: {reason}")]
    Conflict {
        /// Details
        reason: String,
    },

    /// Arguments are malformed.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Details
        reason: String,
    },

    /// The transaction name is not one the executor knows.
    #[error("unknown transaction: {name}")]
    UnknownTransaction {
        /// Name as submitted
        name: String,
    },

    /// Storage failed underneath the registry.
    #[error("storage unavailable: {reason}")]
    Io {
        /// Details
        reason: String,
    },

    /// Configuration problem.
    #[error("configuration error: {reason}")]
    Config {
        /// Details
        reason: String,
    },

    /// A result could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Details
        reason: String,
    },

    /// Executor invariant broken.
    #[error("internal error: {reason}")]
    Internal {
        /// Details
        reason: String,
    },
}
