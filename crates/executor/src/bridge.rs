//! Bridge from the executor to the engine primitives.

use std::sync::Arc;

use population_engine::Database;
use population_primitives::PersonRegistry;

/// Primitives shared by every handler.
#[derive(Debug, Clone)]
pub struct Primitives {
    /// Database handle
    pub db: Arc<Database>,
    /// Person registry over `db`
    pub registry: PersonRegistry,
}

impl Primitives {
    /// Build the primitives over a database
    pub fn new(db: Arc<Database>) -> Self {
        Primitives {
            registry: PersonRegistry::new(db.clone()),
            db,
        }
    }
}
