//! Value ranges pushed down into scans

use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

use crate::codec::CodecResult;
use crate::document::Value;
use crate::table::KeyRange;

use super::ast::CmpOp;

/// Range over the leading value of a scan's keys
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRange {
    pub lower: Bound<Value>,
    pub upper: Bound<Value>,
}

impl ScanRange {
    /// Unrestricted
    pub fn all() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    pub fn eq(value: Value) -> Self {
        Self {
            lower: Bound::Included(value.clone()),
            upper: Bound::Included(value),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!((&self.lower, &self.upper), (Bound::Unbounded, Bound::Unbounded))
    }

    /// Narrows the range with `key op value`. `Neq` leaves it unchanged.
    pub fn restrict(&mut self, op: CmpOp, value: &Value) {
        match op {
            CmpOp::Eq => {
                self.restrict(CmpOp::Gte, value);
                self.restrict(CmpOp::Lte, value);
            }
            CmpOp::Gt => tighten(&mut self.lower, Bound::Excluded(value.clone()), Ordering::Greater),
            CmpOp::Gte => tighten(&mut self.lower, Bound::Included(value.clone()), Ordering::Greater),
            CmpOp::Lt => tighten(&mut self.upper, Bound::Excluded(value.clone()), Ordering::Less),
            CmpOp::Lte => tighten(&mut self.upper, Bound::Included(value.clone()), Ordering::Less),
            CmpOp::Neq => {}
        }
    }

    /// The equivalent range over encoded keys
    pub fn key_range(&self) -> CodecResult<KeyRange> {
        KeyRange::from_values(&self.lower, &self.upper)
    }
}

/// Replaces `current` with `candidate` when the candidate is more
/// restrictive. `wins` is the ordering a restrictive candidate has
/// relative to the current value.
fn tighten(current: &mut Bound<Value>, candidate: Bound<Value>, wins: Ordering) {
    let replace = match (&*current, &candidate) {
        (Bound::Unbounded, _) => true,
        (_, Bound::Unbounded) => false,
        (Bound::Included(c) | Bound::Excluded(c), Bound::Included(n) | Bound::Excluded(n)) => {
            match n.cmp(c) {
                Ordering::Equal => matches!(candidate, Bound::Excluded(_)),
                ord => ord == wins,
            }
        }
    };
    if replace {
        *current = candidate;
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(v) => write!(f, "[{}", v)?,
            Bound::Excluded(v) => write!(f, "({}", v)?,
            Bound::Unbounded => write!(f, "(-inf")?,
        }
        match &self.upper {
            Bound::Included(v) => write!(f, ", {}]", v),
            Bound::Excluded(v) => write!(f, ", {})", v),
            Bound::Unbounded => write!(f, ", +inf)"),
        }
    }
}
