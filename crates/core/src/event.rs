//! Change events staged by transactions and delivered to observers

use crate::types::{TxId, Version};

/// Name of the event emitted on every successful insert or update.
pub const CHANGE_EVENT: &str = "Change";

/// A named event carrying an opaque payload.
///
/// Staged inside a transaction and delivered at commit. For person writes the
/// name is [`CHANGE_EVENT`] and the payload is the encoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Event name
    pub name: String,
    /// Event payload
    pub payload: Vec<u8>,
    /// Transaction that staged it
    pub tx_id: TxId,
    /// Commit version, zero until the transaction is committed
    pub version: Version,
}

impl ChangeEvent {
    /// Create a staged (uncommitted) event
    pub fn staged(name: impl Into<String>, payload: Vec<u8>, tx_id: TxId) -> Self {
        ChangeEvent {
            name: name.into(),
            payload,
            tx_id,
            version: 0,
        }
    }

    /// Stamp with the commit version
    pub fn committed(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
