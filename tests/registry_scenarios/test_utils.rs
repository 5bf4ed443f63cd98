//! Shared fixtures

use parking_lot::Mutex;
use population::{ChangeEvent, ChangeSink, DeliveryError, Person, Population};

pub const ANN: [&str; 7] = ["X", "Y", "1", "Ann", "active", "Lee", "555"];

pub fn ann() -> Person {
    Person::from_fields(&ANN).unwrap()
}

pub fn person(id: &str, status: &str) -> Person {
    Person {
        id: id.to_string(),
        status: status.to_string(),
        ..ann()
    }
}

pub fn registry() -> Population {
    Population::cache().unwrap()
}

/// Keeps every event it is handed
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ChangeEvent>>,
}

impl ChangeSink for RecordingSink {
    fn deliver(&self, event: &ChangeEvent) -> Result<(), DeliveryError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Refuses every event
pub struct OfflineSink;

impl ChangeSink for OfflineSink {
    fn deliver(&self, _event: &ChangeEvent) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected("observer offline".to_string()))
    }
}
