//! Codec error types
//!
//! Every variant is an encoding error: either a value broke a model
//! invariant on the way in, or stored bytes are not a canonical encoding.

use std::io;

use thiserror::Error;

use crate::document::ValueType;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("value nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    #[error("failed to write encoded value: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("unexpected marker 0x{byte:02x} at offset {offset}")]
    InvalidMarker { byte: u8, offset: usize },

    #[error("non-canonical number at offset {offset}")]
    InvalidNumber { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("invalid UTF-8 text ending at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("duplicate field '{0}' in encoded document")]
    DuplicateField(String),

    #[error("trailing bytes after encoded value at offset {offset}")]
    TrailingBytes { offset: usize },

    #[error("expected an encoded document, found {0}")]
    NotADocument(ValueType),
}

impl CodecError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::DepthExceeded { .. } => "TESSERA_ENCODING_DEPTH_EXCEEDED",
            CodecError::Io(_) => "TESSERA_ENCODING_IO",
            CodecError::UnexpectedEof { .. }
            | CodecError::UnknownTag { .. }
            | CodecError::InvalidMarker { .. }
            | CodecError::InvalidNumber { .. }
            | CodecError::InvalidEscape { .. }
            | CodecError::InvalidUtf8 { .. }
            | CodecError::DuplicateField(_)
            | CodecError::TrailingBytes { .. }
            | CodecError::NotADocument(_) => "TESSERA_ENCODING_MALFORMED",
        }
    }
}
