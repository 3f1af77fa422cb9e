//! Mapping from value bounds to key-byte bounds
//!
//! Keys are canonical encodings, possibly followed by more encoded values
//! (index entries append the primary key). A value bound therefore becomes
//! a bound on the encoded prefix:
//!
//! ```text
//! lower Included(v) -> Included(p)
//! lower Excluded(v) -> Included(succ(p))
//! upper Included(v) -> Excluded(succ(p))
//! upper Excluded(v) -> Excluded(p)
//! ```
//!
//! where `p` is the bound prefix of `v`. A missing side is clamped to the
//! tag range of the other side's value, so a range on numbers never visits
//! text keys.

use std::ops::Bound;

use crate::codec::{encode_bound_prefix, type_tag, CodecResult};
use crate::document::Value;
use crate::engine::{prefix_successor, IteratorOptions};

/// A contiguous range of encoded keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
}

impl KeyRange {
    /// Every key
    pub fn all() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// A range no key satisfies
    pub fn empty() -> Self {
        Self {
            lower: Bound::Included(Vec::new()),
            upper: Bound::Excluded(Vec::new()),
        }
    }

    /// Keys whose leading value equals `value`
    pub fn eq(value: &Value) -> CodecResult<Self> {
        Self::from_values(
            &Bound::Included(value.clone()),
            &Bound::Included(value.clone()),
        )
    }

    /// Keys whose leading value falls between the two bounds
    pub fn from_values(lower: &Bound<Value>, upper: &Bound<Value>) -> CodecResult<Self> {
        let lower_key = match lower {
            Bound::Included(v) => Bound::Included(encode_bound_prefix(v)?),
            Bound::Excluded(v) => match prefix_successor(&encode_bound_prefix(v)?) {
                Some(next) => Bound::Included(next),
                None => return Ok(Self::empty()),
            },
            Bound::Unbounded => match upper {
                Bound::Included(v) | Bound::Excluded(v) => {
                    Bound::Included(vec![type_tag(v.value_type())])
                }
                Bound::Unbounded => Bound::Unbounded,
            },
        };

        let upper_key = match upper {
            Bound::Included(v) => match prefix_successor(&encode_bound_prefix(v)?) {
                Some(next) => Bound::Excluded(next),
                None => Bound::Unbounded,
            },
            Bound::Excluded(v) => Bound::Excluded(encode_bound_prefix(v)?),
            Bound::Unbounded => match lower {
                Bound::Included(v) | Bound::Excluded(v) => {
                    Bound::Excluded(vec![type_tag(v.value_type()) + 1])
                }
                Bound::Unbounded => Bound::Unbounded,
            },
        };

        Ok(Self {
            lower: lower_key,
            upper: upper_key,
        })
    }

    pub fn to_options(&self, reverse: bool) -> IteratorOptions {
        IteratorOptions::range(self.lower.clone(), self.upper.clone()).reversed(reverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_value;
    use crate::engine::is_satisfiable;

    fn contains(range: &KeyRange, value: impl Into<Value>) -> bool {
        let key = encode_value(&value.into()).unwrap();
        let above = match &range.lower {
            Bound::Included(l) => key >= *l,
            Bound::Excluded(l) => key > *l,
            Bound::Unbounded => true,
        };
        let below = match &range.upper {
            Bound::Included(u) => key <= *u,
            Bound::Excluded(u) => key < *u,
            Bound::Unbounded => true,
        };
        above && below
    }

    #[test]
    fn test_equality_range_on_text() {
        let range = KeyRange::eq(&Value::from("abc")).unwrap();
        assert!(contains(&range, "abc"));
        assert!(!contains(&range, "abd"));
        assert!(!contains(&range, "ab"));
        assert!(!contains(&range, "abc\0"));
    }

    #[test]
    fn test_numeric_equality_covers_int_and_float() {
        let range = KeyRange::eq(&Value::Int(3)).unwrap();
        assert!(contains(&range, 3));
        assert!(contains(&range, 3.0));
        assert!(!contains(&range, 4));
    }

    #[test]
    fn test_open_ranges_clamped_to_tag() {
        let range =
            KeyRange::from_values(&Bound::Excluded(Value::Int(10)), &Bound::Unbounded).unwrap();
        assert!(contains(&range, 11));
        assert!(contains(&range, 10.5));
        assert!(!contains(&range, 10));
        assert!(!contains(&range, "text"));

        let range =
            KeyRange::from_values(&Bound::Unbounded, &Bound::Excluded(Value::Int(0))).unwrap();
        assert!(contains(&range, -1));
        assert!(!contains(&range, 0));
        assert!(!contains(&range, Value::Null));
        assert!(!contains(&range, true));
    }

    #[test]
    fn test_bounds_beyond_float_precision() {
        let big = 1i64 << 53;

        let range =
            KeyRange::from_values(&Bound::Excluded(Value::Int(big)), &Bound::Unbounded).unwrap();
        assert!(contains(&range, big + 1));
        assert!(!contains(&range, big));
        assert!(!contains(&range, big as f64));

        let range =
            KeyRange::from_values(&Bound::Unbounded, &Bound::Excluded(Value::Int(big + 1))).unwrap();
        assert!(contains(&range, big));
        assert!(contains(&range, big as f64));
        assert!(!contains(&range, big + 1));

        let range = KeyRange::eq(&Value::Int(big + 1)).unwrap();
        assert!(contains(&range, big + 1));
        assert!(!contains(&range, big));
        assert!(!contains(&range, big + 2));
    }

    #[test]
    fn test_zero_bounds_cover_negative_zero() {
        let range = KeyRange::eq(&Value::Int(0)).unwrap();
        assert!(contains(&range, 0));
        assert!(contains(&range, 0.0));
        assert!(contains(&range, -0.0));

        let range =
            KeyRange::from_values(&Bound::Excluded(Value::Float(-0.0)), &Bound::Unbounded).unwrap();
        assert!(!contains(&range, 0));
        assert!(!contains(&range, 0.0));
        assert!(contains(&range, f64::MIN_POSITIVE));
    }

    #[test]
    fn test_inclusive_upper() {
        let range = KeyRange::from_values(
            &Bound::Included(Value::from("b")),
            &Bound::Included(Value::from("d")),
        )
        .unwrap();
        assert!(contains(&range, "b"));
        assert!(contains(&range, "c"));
        assert!(contains(&range, "d"));
        assert!(!contains(&range, "da"));
        assert!(!contains(&range, "a"));
    }

    #[test]
    fn test_empty_range() {
        let range = KeyRange::empty();
        assert!(!is_satisfiable(&range.lower, &range.upper));
    }
}
