//! History entries: decoded snapshots of a person's committed values

use serde::{Deserialize, Serialize};

use crate::error::PopulationResult;
use crate::person::Person;
use crate::types::{KeyModification, Timestamp};

/// How commit timestamps are rendered in [`HistoryEntry::time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `Thu Mar  7 09:05:01 UTC 2024`
    #[default]
    UnixDate,
    /// `2024-03-07T09:05:01.000042Z`
    Rfc3339,
}

impl TimeFormat {
    /// Render a timestamp in this format
    pub fn render(&self, ts: Timestamp) -> String {
        match self {
            TimeFormat::UnixDate => ts.to_unix_date(),
            TimeFormat::Rfc3339 => ts.to_rfc3339(),
        }
    }
}

/// A person snapshot paired with its commit time. Serializes as `{"Data":..,"Time":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    /// The record as committed
    pub data: Person,
    /// Commit time, rendered as a string
    pub time: String,
}

impl HistoryEntry {
    /// Decode one history chain entry.
    pub fn from_modification(km: &KeyModification, format: TimeFormat) -> PopulationResult<Self> {
        Ok(HistoryEntry {
            data: Person::from_bytes(&km.value)?,
            time: format.render(km.timestamp),
        })
    }
}

/// Decode a whole history chain.
///
/// Any entry that fails to decode aborts the read; a partial history is never returned.
pub fn decode_history(
    chain: &[KeyModification],
    format: TimeFormat,
) -> PopulationResult<Vec<HistoryEntry>> {
    chain
        .iter()
        .map(|km| HistoryEntry::from_modification(km, format))
        .collect()
}
