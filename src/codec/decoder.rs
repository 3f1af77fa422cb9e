//! Decoder for the canonical value encoding

use crate::document::{Document, Value};

use super::encoder::{
    float_from_order_key, split_int, END, ESCAPED_ZERO, FIELD, MAX_NESTING_DEPTH,
    SIGN_NEGATIVE_ZERO, SIGN_OTHER, SUBTYPE_FLOAT, SUBTYPE_INT, TAG_ARRAY, TAG_BLOB, TAG_BOOL,
    TAG_DOCUMENT, TAG_NULL, TAG_NUMBER, TAG_TEXT, TERMINATOR,
};
use super::errors::{CodecError, CodecResult};

/// Reads consecutive encoded values from a byte slice
pub struct ValueDecoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ValueDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Decodes the next value
    pub fn read_value(&mut self) -> CodecResult<Value> {
        self.value_at_depth(0)
    }

    fn value_at_depth(&mut self, depth: usize) -> CodecResult<Value> {
        let offset = self.pos;
        let tag = self.read_u8()?;
        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_BOOL => match self.read_u8()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                byte => Err(CodecError::InvalidMarker {
                    byte,
                    offset: self.pos - 1,
                }),
            },
            TAG_NUMBER => self.read_number(),
            TAG_TEXT => {
                let bytes = self.read_escaped()?;
                String::from_utf8(bytes)
                    .map(Value::Text)
                    .map_err(|_| CodecError::InvalidUtf8 { offset: self.pos })
            }
            TAG_BLOB => Ok(Value::Blob(self.read_escaped()?)),
            TAG_ARRAY => {
                check_depth(depth)?;
                let mut items = Vec::new();
                while self.peek()? != END {
                    items.push(self.value_at_depth(depth + 1)?);
                }
                self.pos += 1;
                Ok(Value::Array(items))
            }
            TAG_DOCUMENT => {
                check_depth(depth)?;
                self.read_fields(depth).map(Value::Document)
            }
            tag => Err(CodecError::UnknownTag { tag, offset }),
        }
    }

    fn read_number(&mut self) -> CodecResult<Value> {
        let start = self.pos;
        let magnitude = float_from_order_key(u64::from_be_bytes(self.read_array()?));
        let offset = u16::from_be_bytes(self.read_array()?);
        let invalid = CodecError::InvalidNumber { offset: start };

        match self.read_u8()? {
            SUBTYPE_INT => {
                if !magnitude.is_finite() {
                    return Err(invalid);
                }
                let value = i64::try_from(magnitude as i128 + i128::from(offset))
                    .map_err(|_| CodecError::InvalidNumber { offset: start })?;
                // only the canonical split is accepted, and never a -0.0 magnitude
                let (floor, remainder) = split_int(value);
                if floor.to_bits() != magnitude.to_bits() || remainder != offset {
                    return Err(invalid);
                }
                Ok(Value::Int(value))
            }
            SUBTYPE_FLOAT => {
                if offset != 0 || (magnitude == 0.0 && magnitude.is_sign_negative()) {
                    return Err(invalid);
                }
                match self.read_u8()? {
                    SIGN_OTHER => Ok(Value::Float(magnitude)),
                    SIGN_NEGATIVE_ZERO if magnitude == 0.0 => Ok(Value::Float(-0.0)),
                    byte => Err(CodecError::InvalidMarker {
                        byte,
                        offset: self.pos - 1,
                    }),
                }
            }
            byte => Err(CodecError::InvalidMarker {
                byte,
                offset: self.pos - 1,
            }),
        }
    }

    fn read_fields(&mut self, depth: usize) -> CodecResult<Document> {
        let mut doc = Document::new();
        loop {
            let offset = self.pos;
            match self.read_u8()? {
                END => return Ok(doc),
                FIELD => {
                    let name = String::from_utf8(self.read_escaped()?)
                        .map_err(|_| CodecError::InvalidUtf8 { offset: self.pos })?;
                    let value = self.value_at_depth(depth + 1)?;
                    if doc.contains(&name) {
                        return Err(CodecError::DuplicateField(name));
                    }
                    doc.set(name, value);
                }
                byte => return Err(CodecError::InvalidMarker { byte, offset }),
            }
        }
    }

    fn read_escaped(&mut self) -> CodecResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_u8()?;
            if byte != 0 {
                out.push(byte);
                continue;
            }
            match self.read_u8()? {
                ESCAPED_ZERO => out.push(0),
                TERMINATOR => return Ok(out),
                _ => {
                    return Err(CodecError::InvalidEscape {
                        offset: self.pos - 2,
                    })
                }
            }
        }
    }

    fn peek(&self) -> CodecResult<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(CodecError::UnexpectedEof { offset: self.pos })
    }

    fn read_u8(&mut self) -> CodecResult<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let end = self.pos + N;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or(CodecError::UnexpectedEof {
                offset: self.buf.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }
}

fn check_depth(depth: usize) -> CodecResult<()> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(CodecError::DepthExceeded {
            max: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}

/// Decodes exactly one value; trailing bytes are an error
pub fn decode_value(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = ValueDecoder::new(bytes);
    let value = decoder.read_value()?;
    if !decoder.is_empty() {
        return Err(CodecError::TrailingBytes {
            offset: decoder.position(),
        });
    }
    Ok(value)
}

/// Decodes exactly one document
pub fn decode_document(bytes: &[u8]) -> CodecResult<Document> {
    match decode_value(bytes)? {
        Value::Document(doc) => Ok(doc),
        other => Err(CodecError::NotADocument(other.value_type())),
    }
}
