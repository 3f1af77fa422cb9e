//! Canonical, order-preserving encoding of values
//!
//! For any two values of the same tag, bytewise comparison of their
//! encodings agrees with the value order. Equal values always produce
//! identical bytes. Keys, index entries and stored records all use this
//! encoding.

mod decoder;
mod encoder;
mod errors;

pub use decoder::{decode_document, decode_value, ValueDecoder};
pub use encoder::{
    encode_bound_prefix, encode_document, encode_value, type_tag, ValueEncoder, MAX_NESTING_DEPTH,
};
pub use errors::{CodecError, CodecResult};
