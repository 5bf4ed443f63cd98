//! Core types: versions, timestamps, transaction ids and versioned values
//!
//! - `Version`: global commit counter, one per committed write transaction
//! - `Timestamp`: commit wall-clock time in microseconds since the Unix epoch
//! - `TxId`: unique transaction identifier (UUID v4)
//! - `VersionedValue`: the current value of a key with its commit metadata
//! - `KeyModification`: one entry in a key's history chain
//! - `CommitRecord`: the write set of one committed transaction

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Commit version. Version 0 means "never written".
pub type Version = u64;

/// Commit time in microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Current wall-clock time
    pub fn now() -> Self {
        let micros = Utc::now().timestamp_micros();
        Timestamp(u64::try_from(micros).unwrap_or(0))
    }

    /// Create from microseconds since the Unix epoch
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Microseconds since the Unix epoch
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// The next representable timestamp (one microsecond later)
    pub fn successor(&self) -> Self {
        Timestamp(self.0.saturating_add(1))
    }

    fn to_datetime(self) -> DateTime<Utc> {
        let micros = i64::try_from(self.0).unwrap_or(i64::MAX);
        Utc.timestamp_micros(micros)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Render in Unix `date` style, e.g. `Thu Mar  7 09:05:01 UTC 2024`
    pub fn to_unix_date(&self) -> String {
        self.to_datetime().format("%a %b %e %H:%M:%S UTC %Y").to_string()
    }

    /// Render as RFC 3339 with microsecond precision
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Unique transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(Uuid);

impl TxId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        TxId(Uuid::new_v4())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        TxId(Uuid::from_bytes(bytes))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for TxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current value of a key with the metadata of the commit that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    /// Encoded value
    pub value: Vec<u8>,
    /// Version of the commit that wrote it
    pub version: Version,
    /// Time of that commit
    pub timestamp: Timestamp,
    /// Transaction that wrote it
    pub tx_id: TxId,
}

/// One committed write of a key, as kept in its history chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    /// Transaction that made the write
    pub tx_id: TxId,
    /// Encoded value written
    pub value: Vec<u8>,
    /// Commit version
    pub version: Version,
    /// Commit time
    pub timestamp: Timestamp,
}

impl From<&VersionedValue> for KeyModification {
    fn from(vv: &VersionedValue) -> Self {
        KeyModification {
            tx_id: vv.tx_id,
            value: vv.value.clone(),
            version: vv.version,
            timestamp: vv.timestamp,
        }
    }
}

/// A committed write set: everything needed to apply (or replay) one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Committing transaction
    pub tx_id: TxId,
    /// Version assigned at commit
    pub version: Version,
    /// Commit time
    pub timestamp: Timestamp,
    /// Key/value writes, in key order
    pub writes: Vec<(String, Vec<u8>)>,
}

impl CommitRecord {
    /// The current value each write produces
    pub fn versioned(&self, value: Vec<u8>) -> VersionedValue {
        VersionedValue {
            value,
            version: self.version,
            timestamp: self.timestamp,
            tx_id: self.tx_id,
        }
    }
}
