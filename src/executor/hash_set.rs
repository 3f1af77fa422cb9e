//! Hash-set filter
//!
//! Deduplication keeps a set of 64-bit digests of the canonical document
//! encoding instead of the documents themselves. Two different documents
//! whose digests collide are treated as duplicates; the set trades that
//! risk for a fixed eight bytes per distinct row.
//!
//! The hasher is an accumulator owned by the filter. Every digest runs
//! under a guard that resets it on exit, including on encoding errors, so
//! no state leaks from one document into the next.

use std::collections::hash_map::RandomState;
use std::collections::HashSet;
use std::hash::{BuildHasher, Hasher};
use std::io;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::codec::ValueEncoder;
use crate::document::Document;

use super::errors::ExecutorResult;
use super::operator::Operator;

/// A resettable 64-bit hashing accumulator fed through `io::Write`
pub trait DocumentHasher: io::Write {
    /// Digest of everything written since the last reset
    fn sum64(&self) -> u64;

    fn reset(&mut self);
}

/// SipHash keyed randomly per hasher
pub struct SipDocumentHasher {
    keys: RandomState,
    state: std::collections::hash_map::DefaultHasher,
}

impl SipDocumentHasher {
    pub fn new() -> Self {
        let keys = RandomState::new();
        let state = keys.build_hasher();
        Self { keys, state }
    }
}

impl Default for SipDocumentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for SipDocumentHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DocumentHasher for SipDocumentHasher {
    fn sum64(&self) -> u64 {
        self.state.finish()
    }

    fn reset(&mut self) {
        self.state = self.keys.build_hasher();
    }
}

/// SHA-256 truncated to its first eight bytes
#[derive(Default)]
pub struct Sha256DocumentHasher {
    state: Sha256,
}

impl Sha256DocumentHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl io::Write for Sha256DocumentHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DocumentHasher for Sha256DocumentHasher {
    fn sum64(&self) -> u64 {
        let digest = self.state.clone().finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.state);
    }
}

/// Hasher used by set operators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    #[default]
    Sip,
    Sha256,
}

impl HasherKind {
    pub fn build(&self) -> Box<dyn DocumentHasher> {
        match self {
            HasherKind::Sip => Box::new(SipDocumentHasher::new()),
            HasherKind::Sha256 => Box::new(Sha256DocumentHasher::new()),
        }
    }
}

impl<H: DocumentHasher + ?Sized> DocumentHasher for Box<H> {
    fn sum64(&self) -> u64 {
        (**self).sum64()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Resets the accumulator when the digest scope ends
struct ResetGuard<'h, H: DocumentHasher + ?Sized>(&'h mut H);

impl<H: DocumentHasher + ?Sized> Drop for ResetGuard<'_, H> {
    fn drop(&mut self) {
        self.0.reset();
    }
}

/// Digest of a document's canonical encoding
pub fn document_digest<H: DocumentHasher + ?Sized>(hasher: &mut H, doc: &Document) -> ExecutorResult<u64> {
    let mut guard = ResetGuard(hasher);
    let mut encoder = ValueEncoder::new(&mut *guard.0);
    encoder.encode_document(doc)?;
    Ok(guard.0.sum64())
}

/// Set of document digests
pub struct HashSetFilter<H: DocumentHasher = Box<dyn DocumentHasher>> {
    hasher: H,
    seen: HashSet<u64>,
}

impl<H: DocumentHasher> HashSetFilter<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            seen: HashSet::new(),
        }
    }

    /// Records the document; returns false if an equal digest was seen
    pub fn insert(&mut self, doc: &Document) -> ExecutorResult<bool> {
        let digest = document_digest(&mut self.hasher, doc)?;
        Ok(self.seen.insert(digest))
    }

    pub fn contains(&mut self, doc: &Document) -> ExecutorResult<bool> {
        let digest = document_digest(&mut self.hasher, doc)?;
        Ok(self.seen.contains(&digest))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// Passes the first occurrence of every document
pub struct DistinctOperator<O, H: DocumentHasher = Box<dyn DocumentHasher>> {
    input: O,
    filter: HashSetFilter<H>,
}

impl<O: Operator, H: DocumentHasher> DistinctOperator<O, H> {
    pub fn new(input: O, hasher: H) -> Self {
        Self {
            input,
            filter: HashSetFilter::new(hasher),
        }
    }
}

impl<O: Operator, H: DocumentHasher> Operator for DistinctOperator<O, H> {
    fn next(&mut self) -> ExecutorResult<Option<Document>> {
        while let Some(doc) = self.input.next()? {
            if self.filter.insert(&doc)? {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    fn close(&mut self) {
        self.input.close();
        self.filter.clear();
    }
}
