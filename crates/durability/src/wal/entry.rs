//! WAL entry and on-disk framing
//!
//! Frame layout (little endian):
//!
//! ```text
//! +----------------+----------------+---------------------+
//! | payload len u32| crc32 u32      | bincode(WalEntry)   |
//! +----------------+----------------+---------------------+
//! ```
//!
//! The checksum covers the payload only.

use byteorder::{ByteOrder, LittleEndian};
use population_core::{CommitRecord, PopulationError, PopulationResult, Version};
use serde::{Deserialize, Serialize};

/// Bytes before the payload: length + checksum
pub const FRAME_HEADER_LEN: usize = 8;

/// Upper bound on a single payload; larger lengths are treated as damage
pub const MAX_PAYLOAD_LEN: u32 = 64 * 1024 * 1024;

/// One logged unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalEntry {
    /// A committed transaction's write set
    Commit(CommitRecord),
}

impl WalEntry {
    /// Commit version carried by this entry
    pub fn version(&self) -> Version {
        match self {
            WalEntry::Commit(record) => record.version,
        }
    }

    /// Encode as a complete frame
    pub fn encode(&self) -> PopulationResult<Vec<u8>> {
        let payload = bincode::serialize(self)
            .map_err(|e| PopulationError::storage(format!("cannot encode WAL entry: {}", e)))?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| *len <= MAX_PAYLOAD_LEN)
            .ok_or_else(|| {
                PopulationError::storage(format!("WAL entry of {} bytes is too large", payload.len()))
            })?;

        let mut header = [0u8; FRAME_HEADER_LEN];
        LittleEndian::write_u32(&mut header[0..4], len);
        LittleEndian::write_u32(&mut header[4..8], crc32fast::hash(&payload));

        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        frame.extend_from_slice(&header);
        frame.extend_from_slice(&payload);
        Ok(frame)
    }

    /// Decode the frame at the start of `buf`
    pub(crate) fn decode_frame(buf: &[u8]) -> Frame {
        if buf.len() < FRAME_HEADER_LEN {
            return Frame::Incomplete;
        }
        let len = LittleEndian::read_u32(&buf[0..4]);
        let expected_crc = LittleEndian::read_u32(&buf[4..8]);
        if len > MAX_PAYLOAD_LEN {
            return Frame::Damaged(format!("frame length {} exceeds limit", len));
        }

        let end = FRAME_HEADER_LEN + len as usize;
        if buf.len() < end {
            return Frame::Incomplete;
        }
        let payload = &buf[FRAME_HEADER_LEN..end];
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Frame::Damaged(format!(
                "checksum mismatch: expected {:#010x}, got {:#010x}",
                expected_crc, actual_crc
            ));
        }

        match bincode::deserialize::<WalEntry>(payload) {
            Ok(entry) => Frame::Complete { entry, len: end },
            Err(e) => Frame::Undecodable(e.to_string()),
        }
    }
}

/// Outcome of decoding one frame
#[derive(Debug)]
pub(crate) enum Frame {
    /// A whole, verified entry occupying `len` bytes
    Complete { entry: WalEntry, len: usize },
    /// Buffer ends mid-frame
    Incomplete,
    /// Header or checksum is wrong
    Damaged(String),
    /// Checksum holds but the payload is not a valid entry
    Undecodable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use population_core::{Timestamp, TxId};

    fn entry(version: Version) -> WalEntry {
        WalEntry::Commit(CommitRecord {
            tx_id: TxId::new(),
            version,
            timestamp: Timestamp::from_micros(version * 10),
            writes: vec![("1".to_string(), b"{\"Id\":\"1\"}".to_vec())],
        })
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = entry(3);
        let frame = original.encode().unwrap();

        match WalEntry::decode_frame(&frame) {
            Frame::Complete { entry, len } => {
                assert_eq!(entry, original);
                assert_eq!(len, frame.len());
                assert_eq!(entry.version(), 3);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_header_layout() {
        let frame = entry(1).encode().unwrap();
        let len = LittleEndian::read_u32(&frame[0..4]) as usize;
        assert_eq!(len, frame.len() - FRAME_HEADER_LEN);
        assert_eq!(
            LittleEndian::read_u32(&frame[4..8]),
            crc32fast::hash(&frame[FRAME_HEADER_LEN..])
        );
    }

    #[test]
    fn test_truncated_frame_is_incomplete() {
        let frame = entry(1).encode().unwrap();
        assert!(matches!(WalEntry::decode_frame(&frame[..5]), Frame::Incomplete));
        assert!(matches!(
            WalEntry::decode_frame(&frame[..frame.len() - 1]),
            Frame::Incomplete
        ));
    }

    #[test]
    fn test_flipped_byte_is_damaged() {
        let mut frame = entry(1).encode().unwrap();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(matches!(WalEntry::decode_frame(&frame), Frame::Damaged(_)));
    }

    #[test]
    fn test_oversized_length_is_damaged() {
        let mut frame = entry(1).encode().unwrap();
        LittleEndian::write_u32(&mut frame[0..4], MAX_PAYLOAD_LEN + 1);
        assert!(matches!(WalEntry::decode_frame(&frame), Frame::Damaged(_)));
    }

    #[test]
    fn test_valid_checksum_over_garbage_is_undecodable() {
        let payload = [0xFFu8; 3];
        let mut frame = vec![0u8; FRAME_HEADER_LEN];
        LittleEndian::write_u32(&mut frame[0..4], payload.len() as u32);
        LittleEndian::write_u32(&mut frame[4..8], crc32fast::hash(&payload));
        frame.extend_from_slice(&payload);

        assert!(matches!(WalEntry::decode_frame(&frame), Frame::Undecodable(_)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_strict_prefix_is_incomplete(
                value in proptest::collection::vec(any::<u8>(), 0..256),
                cut in any::<prop::sample::Index>(),
            ) {
                let frame = WalEntry::Commit(CommitRecord {
                    tx_id: TxId::new(),
                    version: 1,
                    timestamp: Timestamp::from_micros(1),
                    writes: vec![("k".to_string(), value)],
                })
                .encode()
                .unwrap();

                let at = cut.index(frame.len());
                prop_assert!(matches!(WalEntry::decode_frame(&frame[..at]), Frame::Incomplete));
            }
        }
    }
}
