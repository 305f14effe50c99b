//! Fixed-width binary record codec
//!
//! The charting front end consumes a raw byte stream of 20-byte records:
//! `[i32 epoch-seconds][f32 open][f32 high][f32 low][f32 close]`, no header,
//! no footer, no length prefix (record count = file size / 20). Byte order is
//! explicitly little-endian as a fixed wire convention, not left to the host
//! platform.

/// Size of one encoded record in bytes.
pub const RECORD_SIZE: usize = 20;

/// One decoded chart record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryRecord {
    /// Candle open time, truncated to whole epoch seconds
    pub time_s: i32,
    /// Open price
    pub open: f32,
    /// High price
    pub high: f32,
    /// Low price
    pub low: f32,
    /// Close price
    pub close: f32,
}

impl BinaryRecord {
    /// Encode into the fixed little-endian wire layout.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut bytes = [0u8; RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.time_s.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.open.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.high.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.low.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.close.to_le_bytes());
        bytes
    }

    /// Decode from the fixed little-endian wire layout.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        // Slice bounds are fixed by RECORD_SIZE, so the conversions cannot fail.
        let field = |range: std::ops::Range<usize>| -> [u8; 4] {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[range]);
            buf
        };
        Self {
            time_s: i32::from_le_bytes(field(0..4)),
            open: f32::from_le_bytes(field(4..8)),
            high: f32::from_le_bytes(field(8..12)),
            low: f32::from_le_bytes(field(12..16)),
            close: f32::from_le_bytes(field(16..20)),
        }
    }
}

/// Encode a record sequence into one contiguous buffer of
/// `records.len() * RECORD_SIZE` bytes, preserving order.
pub fn encode_records(records: &[BinaryRecord]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        buffer.extend_from_slice(&record.encode());
    }
    buffer
}
