//! Stored document records
//!
//! ```text
//! +---------------------------+
//! | Canonical document bytes  |
//! +---------------------------+
//! | Checksum                  | (u32 LE, CRC32 of the bytes above)
//! +---------------------------+
//! ```
//!
//! Every read verifies the checksum before decoding.

use crc32fast::Hasher;

use crate::codec::{decode_document, encode_document, CodecError};
use crate::document::Document;

const CHECKSUM_LEN: usize = 4;

/// CRC32 (IEEE) over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Reasons a stored record cannot be read back
#[derive(Debug)]
pub enum RecordError {
    Truncated(usize),
    ChecksumMismatch { expected: u32, actual: u32 },
    Malformed(CodecError),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Truncated(len) => write!(f, "record of {} bytes is truncated", len),
            RecordError::ChecksumMismatch { expected, actual } => write!(
                f,
                "checksum mismatch (expected {:08x}, got {:08x})",
                expected, actual
            ),
            RecordError::Malformed(e) => write!(f, "{}", e),
        }
    }
}

/// Serializes a document with its trailing checksum
pub fn encode_record(doc: &Document) -> Result<Vec<u8>, CodecError> {
    let mut bytes = encode_document(doc)?;
    let checksum = compute_checksum(&bytes);
    bytes.extend_from_slice(&checksum.to_le_bytes());
    Ok(bytes)
}

/// Verifies and decodes a stored record
pub fn decode_record(bytes: &[u8]) -> Result<Document, RecordError> {
    if bytes.len() < CHECKSUM_LEN {
        return Err(RecordError::Truncated(bytes.len()));
    }
    let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let mut stored = [0u8; CHECKSUM_LEN];
    stored.copy_from_slice(trailer);
    let expected = u32::from_le_bytes(stored);
    let actual = compute_checksum(body);
    if expected != actual {
        return Err(RecordError::ChecksumMismatch { expected, actual });
    }
    decode_document(body).map_err(RecordError::Malformed)
}
