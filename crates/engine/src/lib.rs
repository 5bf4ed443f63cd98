//! Database engine for the population registry
//!
//! Ties together the world state, optimistic transactions, the WAL and
//! change notification behind one [`Database`] handle.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod notify;

pub use config::{PopulationConfig, CONFIG_FILE_NAME, DEFAULT_EVENT_CHANNEL_CAPACITY};
pub use database::{Database, LOCK_FILE_NAME};
pub use notify::{ChangeSink, ChannelSink, DeliveryError, EventHub, NotificationPolicy, SinkId};

pub use population_concurrency::TransactionContext;
pub use population_durability::{DurabilityMode, WAL_FILE_NAME};
