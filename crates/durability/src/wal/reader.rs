//! WAL reader
//!
//! Reads every complete, verified frame in order. Damage at the tail (a torn
//! last write, a bad checksum) ends the read and is reported so the caller can
//! truncate. A frame that verifies but does not decode, or a version that goes
//! backwards, is unrecoverable and fails with `Corruption`.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use population_core::{CommitRecord, PopulationError, PopulationResult, Version};
use tracing::{debug, warn};

use super::entry::{Frame, WalEntry};

/// Where and why a read stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalCorruptionInfo {
    /// Offset of the first unusable byte
    pub offset: u64,
    /// Bytes from `offset` to end of file
    pub discarded_bytes: u64,
    /// What was wrong
    pub reason: String,
}

/// Everything recovered from a WAL file
#[derive(Debug, Clone, Default)]
pub struct WalReadResult {
    /// Committed transactions, oldest first
    pub records: Vec<CommitRecord>,
    /// Length of the valid prefix
    pub valid_len: u64,
    /// Set when the file has a damaged tail
    pub corruption: Option<WalCorruptionInfo>,
}

impl WalReadResult {
    /// Highest version recovered, 0 if none
    pub fn last_version(&self) -> Version {
        self.records.last().map(|r| r.version).unwrap_or(0)
    }
}

/// Result of cutting a damaged tail off a WAL file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncateInfo {
    /// New file length
    pub truncated_at: u64,
    /// Bytes removed
    pub discarded_bytes: u64,
}

/// Reads WAL files
pub struct WalReader;

impl WalReader {
    /// Read all records from `path`; a missing file reads as empty
    pub fn read(path: &Path) -> PopulationResult<WalReadResult> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(WalReadResult::default()),
            Err(e) => {
                return Err(PopulationError::io(
                    format!("cannot read WAL {}", path.display()),
                    e,
                ))
            }
        };
        Self::read_bytes(&bytes)
    }

    /// Read all records from an in-memory WAL image
    pub fn read_bytes(bytes: &[u8]) -> PopulationResult<WalReadResult> {
        let mut result = WalReadResult::default();
        let mut offset = 0usize;
        let mut last_version: Version = 0;

        while offset < bytes.len() {
            match WalEntry::decode_frame(&bytes[offset..]) {
                Frame::Complete { entry, len } => {
                    if entry.version() <= last_version {
                        return Err(PopulationError::corruption(format!(
                            "WAL version {} at offset {} does not follow {}",
                            entry.version(),
                            offset,
                            last_version
                        )));
                    }
                    last_version = entry.version();
                    match entry {
                        WalEntry::Commit(record) => result.records.push(record),
                    }
                    offset += len;
                }
                Frame::Incomplete => {
                    result.corruption = Some(tail_damage(bytes, offset, "incomplete frame"));
                    break;
                }
                Frame::Damaged(reason) => {
                    result.corruption = Some(tail_damage(bytes, offset, reason));
                    break;
                }
                Frame::Undecodable(reason) => {
                    return Err(PopulationError::corruption(format!(
                        "WAL entry at offset {} does not decode: {}",
                        offset, reason
                    )));
                }
            }
        }

        result.valid_len = offset as u64;
        debug!(
            records = result.records.len(),
            valid_len = result.valid_len,
            "WAL read complete"
        );
        Ok(result)
    }

    /// Cut the damaged tail reported in `result`, if any
    pub fn truncate(path: &Path, result: &WalReadResult) -> PopulationResult<Option<TruncateInfo>> {
        let Some(corruption) = &result.corruption else {
            return Ok(None);
        };

        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| PopulationError::io(format!("cannot open WAL {}", path.display()), e))?;
        file.set_len(result.valid_len)
            .and_then(|_| file.sync_all())
            .map_err(|e| PopulationError::io(format!("cannot truncate WAL {}", path.display()), e))?;

        warn!(
            path = %path.display(),
            offset = corruption.offset,
            discarded_bytes = corruption.discarded_bytes,
            reason = %corruption.reason,
            "Truncated damaged WAL tail"
        );

        Ok(Some(TruncateInfo {
            truncated_at: result.valid_len,
            discarded_bytes: corruption.discarded_bytes,
        }))
    }
}

fn tail_damage(bytes: &[u8], offset: usize, reason: impl Into<String>) -> WalCorruptionInfo {
    WalCorruptionInfo {
        offset: offset as u64,
        discarded_bytes: (bytes.len() - offset) as u64,
        reason: reason.into(),
    }
}
