//! Embedded person registry.
//!
//! Re-exports the public surface of the workspace crates so applications
//! depend on one package:
//!
//! ```ignore
//! use population::{Person, Population};
//!
//! let db = Population::open("./registry")?;
//! db.add_person(Person::from_fields(&["X", "Y", "1", "Ann", "active", "Lee", "555"])?)?;
//! for entry in db.get_person_history("1")? {
//!     println!("{} {}", entry.time, entry.data);
//! }
//! ```

// ============================================================================
// Entry points
// ============================================================================

pub use population_executor::{Command, Error, Executor, Output, Population, Result};

// ============================================================================
// Records and history
// ============================================================================

pub use population_core::{HistoryEntry, Person, TimeFormat};
pub use population_core::{ChangeEvent, CHANGE_EVENT};
pub use population_core::{Timestamp, Version};

// ============================================================================
// Configuration and notification
// ============================================================================

pub use population_engine::{
    ChangeSink, ChannelSink, DeliveryError, DurabilityMode, NotificationPolicy, PopulationConfig,
    SinkId,
};

// ============================================================================
// Lower layers, for callers that need the engine directly
// ============================================================================

pub use population_engine::Database;
pub use population_primitives::PersonRegistry;
