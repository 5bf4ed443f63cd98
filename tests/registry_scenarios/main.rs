//! Registry scenario tests
//!
//! End-to-end behaviour of the registry through the public `population`
//! package: record semantics, history, change notification, concurrency
//! and persistence.
//!
//! ```bash
//! cargo test --test registry_scenarios
//! ```

mod test_utils;

mod concurrency;
mod history;
mod notification;
mod persistence;
mod records;
mod transactions;
