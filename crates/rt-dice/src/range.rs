//! Inclusive integer ranges.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// An inclusive integer interval. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Lower bound (inclusive).
    pub min: i64,
    /// Upper bound (inclusive).
    pub max: i64,
}

impl Range {
    /// Build a range from two bounds in either order.
    pub fn new(a: i64, b: i64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// A range containing exactly one number.
    pub fn single(n: i64) -> Self {
        Self { min: n, max: n }
    }

    /// Sum of two ranges: the range of `x + y` for `x` in self, `y` in other.
    pub fn add(self, other: Range) -> Self {
        Self::new(self.min + other.min, self.max + other.max)
    }

    /// Scale both bounds. A negative factor swaps them.
    pub fn multiply(self, factor: i64) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }

    /// The smallest range covering both ranges.
    pub fn union(self, other: Range) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns true if `n` lies within the range.
    pub fn contains(&self, n: i64) -> bool {
        self.min <= n && n <= self.max
    }

    /// Returns true if the two ranges share at least one number.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Number of integers in the range.
    pub fn len(&self) -> u64 {
        self.max.abs_diff(self.min) + 1
    }

    /// Always false: a range holds at least one number.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every integer in the range, in ascending order.
    pub fn members(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }
}

impl From<i64> for Range {
    fn from(n: i64) -> Self {
        Self::single(n)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_ordered() {
        let r = Range::new(9, 2);
        assert_eq!((r.min, r.max), (2, 9));
    }

    #[test]
    fn add_and_multiply() {
        let r = Range::new(1, 6).add(Range::new(1, 4));
        assert_eq!(r, Range::new(2, 10));
        assert_eq!(Range::new(1, 6).multiply(-2), Range::new(-12, -2));
    }

    #[test]
    fn union_covers_both() {
        assert_eq!(Range::new(1, 3).union(Range::new(7, 9)), Range::new(1, 9));
    }

    #[test]
    fn members_are_inclusive() {
        let members: Vec<i64> = Range::new(3, 5).members().collect();
        assert_eq!(members, vec![3, 4, 5]);
        assert_eq!(Range::single(4).members().count(), 1);
    }

    #[test]
    fn contains_and_overlaps() {
        let r = Range::new(3, 5);
        assert!(r.contains(3));
        assert!(r.contains(5));
        assert!(!r.contains(6));
        assert!(r.overlaps(&Range::new(5, 9)));
        assert!(!r.overlaps(&Range::new(6, 9)));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn display() {
        assert_eq!(Range::new(1, 20).to_string(), "[1,20]");
    }
}
