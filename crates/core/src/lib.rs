//! Core types and traits for the population registry
//!
//! This crate defines the foundational types used throughout the system:
//! - Person: the record kept in world state, with its canonical encoding
//! - HistoryEntry: a decoded snapshot from a record's history chain
//! - Version / Timestamp / TxId: commit metadata
//! - ChangeEvent: notification staged by a write and delivered at commit
//! - Storage: the world-state abstraction the engine commits into
//! - PopulationError: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod history;
pub mod person;
pub mod traits;
pub mod types;

pub use error::{PopulationError, PopulationResult};
pub use event::{ChangeEvent, CHANGE_EVENT};
pub use history::{decode_history, HistoryEntry, TimeFormat};
pub use person::Person;
pub use traits::Storage;
pub use types::{CommitRecord, KeyModification, Timestamp, TxId, Version, VersionedValue};
