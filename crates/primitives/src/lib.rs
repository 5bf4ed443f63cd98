//! Primitives layer for the population registry
//!
//! - Person Registry: insert, update, read, existence check and full history
//!   of person records, each as one transaction with a `Change` event on write
//!
//! All primitives are stateless facades over the Database engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;

pub use registry::PersonRegistry;
