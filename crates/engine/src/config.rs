//! Database configuration
//!
//! Stored as `population.toml` in the database directory. A missing file is
//! created with defaults on first open; missing keys take their defaults.
//!
//! ```toml
//! durability = "strict"
//! notification_policy = "strict"
//! time_format = "unix_date"
//! event_channel_capacity = 1024
//! ```

use std::fs;
use std::io;
use std::path::Path;

use population_core::{PopulationError, PopulationResult, TimeFormat};
use population_durability::DurabilityMode;
use serde::{Deserialize, Serialize};

use crate::notify::NotificationPolicy;

/// Config file name inside a database directory
pub const CONFIG_FILE_NAME: &str = "population.toml";

/// Default bound for subscriber channels
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Runtime configuration of a [`crate::Database`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// How commits reach disk
    pub durability: DurabilityMode,
    /// Whether a failed change notification fails the write
    pub notification_policy: NotificationPolicy,
    /// Rendering of history timestamps
    pub time_format: TimeFormat,
    /// Capacity of each `subscribe()` channel
    pub event_channel_capacity: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            durability: DurabilityMode::default(),
            notification_policy: NotificationPolicy::default(),
            time_format: TimeFormat::default(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl PopulationConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> PopulationResult<Self> {
        let config: PopulationConfig =
            toml::from_str(text).map_err(|e| PopulationError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML text
    pub fn to_toml_string(&self) -> PopulationResult<String> {
        toml::to_string(self).map_err(|e| PopulationError::config(e.to_string()))
    }

    /// Load from a file
    pub fn load(path: &Path) -> PopulationResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PopulationError::config(format!("could not read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            PopulationError::Config { message } => {
                PopulationError::config(format!("could not parse '{}': {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Write to a file
    pub fn save(&self, path: &Path) -> PopulationResult<()> {
        let text = self.to_toml_string()?;
        fs::write(path, text)
            .map_err(|e| PopulationError::io(format!("cannot write {}", path.display()), e))
    }

    /// Load `population.toml` from `dir`, writing defaults if it is absent
    pub fn load_or_init(dir: &Path) -> PopulationResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        match fs::metadata(&path) {
            Ok(_) => Self::load(&path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = PopulationConfig::default();
                config.save(&path)?;
                Ok(config)
            }
            Err(e) => Err(PopulationError::io(
                format!("cannot stat {}", path.display()),
                e,
            )),
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> PopulationResult<()> {
        if self.event_channel_capacity == 0 {
            return Err(PopulationError::config(
                "event_channel_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}
