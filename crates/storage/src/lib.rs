//! World state storage for the population registry
//!
//! Holds the current value and the append-only history chain of every key.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;

pub use sharded::{KeyChain, WorldState};
