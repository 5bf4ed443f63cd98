//! Command execution layer for the population registry
//!
//! - `Command`: the five registry operations, buildable from a transaction
//!   name and positional string arguments
//! - `Executor`: dispatches commands to the person registry
//! - `Output`: typed results and their serialized payloads
//! - `Population`: typed API for embedding
//! - `Error`: what callers see; internal errors are mapped in `convert`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod bridge;
pub mod command;
pub mod convert;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod output;

pub use api::Population;
pub use command::Command;
pub use error::{Error, Result};
pub use executor::Executor;
pub use output::Output;
