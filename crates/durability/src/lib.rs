//! Durability layer for the population registry
//!
//! Committed write sets are appended to a single-file write-ahead log and
//! replayed into a fresh world state on open.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod wal;

pub use wal::{
    DurabilityMode, TruncateInfo, Wal, WalCorruptionInfo, WalEntry, WalReadResult, WalReader,
    WAL_FILE_NAME,
};
