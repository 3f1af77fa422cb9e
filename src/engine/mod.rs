//! Storage engine interface
//!
//! The query layer only talks to these traits. A backend provides
//! transactions over named byte-key/byte-value stores with ordered
//! iteration. Guarantees every backend must keep:
//!
//! - a `put` followed by a `get` in the same transaction observes the write
//! - iteration is strictly increasing by raw key bytes (decreasing if reversed)
//! - a read-only transaction rejects every mutating call with `ReadOnly`
//! - readers observe the snapshot committed when they began
//!
//! `memory` holds the in-process reference backend.

mod errors;
mod memory;

use std::cmp::Ordering;
use std::ops::Bound;

pub use errors::{EngineError, EngineResult};
pub use memory::MemoryEngine;

/// Entry point of a storage backend
pub trait Engine: Send + Sync {
    /// Starts a transaction. Backends may refuse concurrent writers.
    fn begin(&self, writable: bool) -> EngineResult<Box<dyn Transaction>>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn begin(&self, writable: bool) -> EngineResult<Box<dyn Transaction>> {
        (**self).begin(writable)
    }
}

/// A unit of work over one or more stores.
///
/// Dropping a transaction without committing rolls it back.
pub trait Transaction {
    fn is_writable(&self) -> bool;

    /// Opens an existing store
    fn get_store<'a>(&'a self, name: &str) -> EngineResult<Box<dyn Store<'a> + 'a>>;

    fn create_store(&self, name: &str) -> EngineResult<()>;

    fn drop_store(&self, name: &str) -> EngineResult<()>;

    /// Store names in ascending order
    fn list_stores(&self) -> EngineResult<Vec<String>>;

    /// Publishes the transaction's writes
    fn commit(self: Box<Self>) -> EngineResult<()>;

    fn rollback(self: Box<Self>) -> EngineResult<()>;
}

/// A named, ordered byte-key/byte-value container
pub trait Store<'a> {
    /// Fails with `KeyNotFound` when absent
    fn get(&self, key: &[u8]) -> EngineResult<Vec<u8>>;

    fn put(&self, key: &[u8], value: &[u8]) -> EngineResult<()>;

    /// Fails with `KeyNotFound` when absent
    fn delete(&self, key: &[u8]) -> EngineResult<()>;

    fn iterator(&self, options: IteratorOptions) -> EngineResult<Box<dyn Cursor + 'a>>;

    /// Next value of the store's monotonic counter, starting at 1.
    /// The counter is part of the transaction and rolls back with it.
    fn next_sequence(&self) -> EngineResult<u64>;
}

/// Ordered key/value iteration over a store
pub trait Cursor {
    /// Returns `None` at the end of the range and after `close`
    fn next(&mut self) -> EngineResult<Option<(Vec<u8>, Vec<u8>)>>;

    /// Releases the cursor. Idempotent.
    fn close(&mut self);
}

/// Bounds and direction for [`Store::iterator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IteratorOptions {
    pub reverse: bool,
    /// Only keys starting with this prefix are visited
    pub prefix: Option<Vec<u8>>,
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
}

impl Default for IteratorOptions {
    fn default() -> Self {
        Self {
            reverse: false,
            prefix: None,
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }
}

impl IteratorOptions {
    pub fn range(lower: Bound<Vec<u8>>, upper: Bound<Vec<u8>>) -> Self {
        Self {
            lower,
            upper,
            ..Self::default()
        }
    }

    pub fn prefix(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Folds the prefix into the bounds, returning the effective key range
    pub fn effective_bounds(&self) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
        let Some(prefix) = &self.prefix else {
            return (self.lower.clone(), self.upper.clone());
        };
        let prefix_upper = match prefix_successor(prefix) {
            Some(next) => Bound::Excluded(next),
            None => Bound::Unbounded,
        };
        (
            tighter_lower(self.lower.clone(), Bound::Included(prefix.clone())),
            tighter_upper(self.upper.clone(), prefix_upper),
        )
    }
}

/// Smallest byte string greater than every string that starts with `prefix`.
///
/// Returns `None` when no such string exists (empty or all 0xFF).
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(last) = out.pop() {
        if last < 0xFF {
            out.push(last + 1);
            return Some(out);
        }
    }
    None
}

/// The more restrictive of two lower bounds
pub fn tighter_lower(a: Bound<Vec<u8>>, b: Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    let keep_a = match (&a, &b) {
        (Bound::Unbounded, _) => false,
        (_, Bound::Unbounded) => true,
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.cmp(y) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => matches!(a, Bound::Excluded(_)),
            }
        }
    };
    if keep_a {
        a
    } else {
        b
    }
}

/// The more restrictive of two upper bounds
pub fn tighter_upper(a: Bound<Vec<u8>>, b: Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    let keep_a = match (&a, &b) {
        (Bound::Unbounded, _) => false,
        (_, Bound::Unbounded) => true,
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.cmp(y) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => matches!(a, Bound::Excluded(_)),
            }
        }
    };
    if keep_a {
        a
    } else {
        b
    }
}

/// Returns false when no key can satisfy both bounds
pub fn is_satisfiable(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    match (lower, upper) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
        (Bound::Included(l), Bound::Included(u)) => l <= u,
        (Bound::Included(l) | Bound::Excluded(l), Bound::Included(u) | Bound::Excluded(u)) => {
            l < u
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_successor() {
        assert_eq!(prefix_successor(&[0x30, 0x01]), Some(vec![0x30, 0x02]));
        assert_eq!(prefix_successor(&[0x30, 0xff]), Some(vec![0x31]));
        assert_eq!(prefix_successor(&[0xff, 0xff]), None);
        assert_eq!(prefix_successor(&[]), None);
    }

    #[test]
    fn test_prefix_folds_into_bounds() {
        let options = IteratorOptions {
            prefix: Some(vec![0x10]),
            lower: Bound::Excluded(vec![0x10, 0x05]),
            ..IteratorOptions::default()
        };
        let (lower, upper) = options.effective_bounds();
        assert_eq!(lower, Bound::Excluded(vec![0x10, 0x05]));
        assert_eq!(upper, Bound::Excluded(vec![0x11]));
    }

    #[test]
    fn test_tighter_bounds_prefer_exclusive_on_tie() {
        assert_eq!(
            tighter_lower(Bound::Included(vec![1]), Bound::Excluded(vec![1])),
            Bound::Excluded(vec![1])
        );
        assert_eq!(
            tighter_upper(Bound::Included(vec![5]), Bound::Included(vec![3])),
            Bound::Included(vec![3])
        );
        assert_eq!(
            tighter_upper(Bound::Unbounded, Bound::Excluded(vec![2])),
            Bound::Excluded(vec![2])
        );
    }

    #[test]
    fn test_is_satisfiable() {
        assert!(is_satisfiable(&Bound::Included(vec![1]), &Bound::Included(vec![1])));
        assert!(!is_satisfiable(&Bound::Included(vec![1]), &Bound::Excluded(vec![1])));
        assert!(!is_satisfiable(&Bound::Included(vec![2]), &Bound::Included(vec![1])));
        assert!(is_satisfiable(&Bound::Unbounded, &Bound::Excluded(vec![0])));
    }
}
