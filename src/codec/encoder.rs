//! Order-preserving value encoder
//!
//! Layout:
//!
//! ```text
//! Null      0x10
//! Bool      0x20 | 0x00 or 0x01
//! Number    0x30 | magnitude (8, BE) | offset (2, BE) | 0x00              (int)
//!           0x30 | magnitude (8, BE) | 0x0000         | 0x01 | sign (1)   (float)
//! Text      0x40 | escaped bytes | 0x00 0x01
//! Blob      0x50 | escaped bytes | 0x00 0x01
//! Array     0x60 | value* | 0x00
//! Document  0x70 | (0x01 | escaped name | value)* | 0x00
//! ```
//!
//! A number's magnitude is the order key of the largest f64 not above it
//! (zero is always +0.0) and its offset is the exact distance from that f64,
//! nonzero only for integers that f64 cannot represent. Equal numbers share
//! magnitude and offset; the subtype then puts ints before floats, and the
//! sign byte puts -0.0 before 0.0. Byte order therefore matches value order.
//!
//! Escaping writes 0x00 as 0x00 0xFF so the 0x00 0x01 terminator sorts
//! below any continuation. Document fields are written in name order, which
//! makes the encoding independent of insertion order.

use std::io::Write;

use crate::document::{Document, Value, ValueType};

use super::errors::{CodecError, CodecResult};

pub(crate) const TAG_NULL: u8 = 0x10;
pub(crate) const TAG_BOOL: u8 = 0x20;
pub(crate) const TAG_NUMBER: u8 = 0x30;
pub(crate) const TAG_TEXT: u8 = 0x40;
pub(crate) const TAG_BLOB: u8 = 0x50;
pub(crate) const TAG_ARRAY: u8 = 0x60;
pub(crate) const TAG_DOCUMENT: u8 = 0x70;

pub(crate) const END: u8 = 0x00;
pub(crate) const FIELD: u8 = 0x01;
pub(crate) const ESCAPED_ZERO: u8 = 0xFF;
pub(crate) const TERMINATOR: u8 = 0x01;

pub(crate) const SUBTYPE_INT: u8 = 0x00;
pub(crate) const SUBTYPE_FLOAT: u8 = 0x01;

pub(crate) const SIGN_NEGATIVE_ZERO: u8 = 0x00;
pub(crate) const SIGN_OTHER: u8 = 0x01;

const SIGN_BIT: u64 = 1 << 63;

/// Containers nested deeper than this are rejected
pub const MAX_NESTING_DEPTH: usize = 64;

/// Returns the leading tag byte for a value type
pub fn type_tag(value_type: ValueType) -> u8 {
    match value_type {
        ValueType::Null => TAG_NULL,
        ValueType::Bool => TAG_BOOL,
        ValueType::Int | ValueType::Float => TAG_NUMBER,
        ValueType::Text => TAG_TEXT,
        ValueType::Blob => TAG_BLOB,
        ValueType::Array => TAG_ARRAY,
        ValueType::Document => TAG_DOCUMENT,
    }
}

/// Maps f64 bits onto u64 so unsigned order matches IEEE total order
pub(crate) fn float_order_key(f: f64) -> u64 {
    let bits = f.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    }
}

pub(crate) fn float_from_order_key(key: u64) -> f64 {
    if key & SIGN_BIT != 0 {
        f64::from_bits(key ^ SIGN_BIT)
    } else {
        f64::from_bits(!key)
    }
}

/// Splits an integer into the largest f64 not above it and the remainder.
///
/// The remainder is below 2^11 since f64 spacing never exceeds that within
/// the i64 range.
pub(crate) fn split_int(i: i64) -> (f64, u16) {
    let mut floor = i as f64;
    if floor as i128 > i128::from(i) {
        // rounded up; step to the next f64 toward negative infinity
        let bits = floor.to_bits();
        floor = if floor > 0.0 {
            f64::from_bits(bits - 1)
        } else {
            f64::from_bits(bits + 1)
        };
    }
    (floor, (i128::from(i) - floor as i128) as u16)
}

/// Magnitude key and offset shared by every number equal to `value`
fn number_head(value: &Value) -> Option<(u64, u16)> {
    match value {
        Value::Int(i) => {
            let (floor, offset) = split_int(*i);
            Some((float_order_key(floor), offset))
        }
        Value::Float(f) if *f == 0.0 => Some((float_order_key(0.0), 0)),
        Value::Float(f) => Some((float_order_key(*f), 0)),
        _ => None,
    }
}

/// Streams canonical encodings into any writer
pub struct ValueEncoder<W: Write> {
    writer: W,
    max_depth: usize,
}

impl<W: Write> ValueEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_max_depth(writer, MAX_NESTING_DEPTH)
    }

    pub fn with_max_depth(writer: W, max_depth: usize) -> Self {
        Self { writer, max_depth }
    }

    /// Encodes one value
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        self.write_value(value, 0)
    }

    /// Encodes a document in canonical field order
    pub fn encode_document(&mut self, doc: &Document) -> CodecResult<()> {
        self.write_document(doc, 0)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> CodecResult<()> {
        match value {
            Value::Null => self.writer.write_all(&[TAG_NULL])?,
            Value::Bool(b) => self.writer.write_all(&[TAG_BOOL, u8::from(*b)])?,
            Value::Int(_) => {
                self.write_number_head(value)?;
                self.writer.write_all(&[SUBTYPE_INT])?;
            }
            Value::Float(f) => {
                self.write_number_head(value)?;
                let sign = if *f == 0.0 && f.is_sign_negative() {
                    SIGN_NEGATIVE_ZERO
                } else {
                    SIGN_OTHER
                };
                self.writer.write_all(&[SUBTYPE_FLOAT, sign])?;
            }
            Value::Text(s) => {
                self.writer.write_all(&[TAG_TEXT])?;
                self.write_escaped(s.as_bytes())?;
            }
            Value::Blob(b) => {
                self.writer.write_all(&[TAG_BLOB])?;
                self.write_escaped(b)?;
            }
            Value::Array(items) => {
                self.check_depth(depth)?;
                self.writer.write_all(&[TAG_ARRAY])?;
                for item in items {
                    self.write_value(item, depth + 1)?;
                }
                self.writer.write_all(&[END])?;
            }
            Value::Document(doc) => self.write_document(doc, depth)?,
        }
        Ok(())
    }

    fn write_document(&mut self, doc: &Document, depth: usize) -> CodecResult<()> {
        self.check_depth(depth)?;
        self.writer.write_all(&[TAG_DOCUMENT])?;
        for (name, value) in doc.sorted_fields() {
            self.writer.write_all(&[FIELD])?;
            self.write_escaped(name.as_bytes())?;
            self.write_value(value, depth + 1)?;
        }
        self.writer.write_all(&[END])?;
        Ok(())
    }

    fn write_number_head(&mut self, value: &Value) -> CodecResult<()> {
        if let Some((magnitude, offset)) = number_head(value) {
            self.writer.write_all(&[TAG_NUMBER])?;
            self.writer.write_all(&magnitude.to_be_bytes())?;
            self.writer.write_all(&offset.to_be_bytes())?;
        }
        Ok(())
    }

    fn write_escaped(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let mut start = 0;
        for (i, byte) in bytes.iter().enumerate() {
            if *byte == 0 {
                self.writer.write_all(&bytes[start..i])?;
                self.writer.write_all(&[0x00, ESCAPED_ZERO])?;
                start = i + 1;
            }
        }
        self.writer.write_all(&bytes[start..])?;
        self.writer.write_all(&[0x00, TERMINATOR])?;
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> CodecResult<()> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Encodes a value into a fresh buffer
pub fn encode_value(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = ValueEncoder::new(Vec::new());
    encoder.encode(value)?;
    Ok(encoder.into_inner())
}

/// Encodes a document into a fresh buffer
pub fn encode_document(doc: &Document) -> CodecResult<Vec<u8>> {
    let mut encoder = ValueEncoder::new(Vec::new());
    encoder.encode_document(doc)?;
    Ok(encoder.into_inner())
}

/// Key prefix shared by every encoding a range bound on `value` must cover.
///
/// Numbers stop before the subtype, so an int bound also covers the equal
/// float (and 0 covers -0.0) and vice versa. Other values use their full
/// encoding.
pub fn encode_bound_prefix(value: &Value) -> CodecResult<Vec<u8>> {
    match number_head(value) {
        Some((magnitude, offset)) => {
            let mut prefix = Vec::with_capacity(11);
            prefix.push(TAG_NUMBER);
            prefix.extend_from_slice(&magnitude.to_be_bytes());
            prefix.extend_from_slice(&offset.to_be_bytes());
            Ok(prefix)
        }
        None => encode_value(value),
    }
}
