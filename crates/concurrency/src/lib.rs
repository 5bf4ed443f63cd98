//! Optimistic concurrency control for the population registry
//!
//! - `transaction`: buffered reads/writes and the staged change event
//! - `validation`: read-set validation (first committer wins)
//! - `manager`: commit serialization, version and timestamp assignment

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::{CommitPipeline, NoopPipeline, TransactionManager};
pub use transaction::{TransactionContext, TransactionStatus};
pub use validation::{validate_read_set, ConflictType, ValidationResult};
