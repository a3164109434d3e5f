//! Score intervals for range and count queries.

use crate::error::{Result, SortedSetError};
use serde::{Deserialize, Serialize};
use std::ops::Bound;

/// An interval of scores with independently inclusive, exclusive, or open ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: Bound<f64>,
    pub max: Bound<f64>,
}

impl ScoreRange {
    pub fn new(min: Bound<f64>, max: Bound<f64>) -> Self {
        Self { min, max }
    }

    /// `[min, max]`
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self::new(Bound::Included(min), Bound::Included(max))
    }

    /// Every score.
    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// Rejects NaN bounds. Infinite bounds are allowed.
    pub fn validate(&self) -> Result<()> {
        for bound in [self.min, self.max] {
            if let Bound::Included(v) | Bound::Excluded(v) = bound {
                if v.is_nan() {
                    return Err(SortedSetError::InvalidScore(v));
                }
            }
        }
        Ok(())
    }

    /// `true` if `score` is not below the lower end.
    #[inline]
    pub fn above_min(&self, score: f64) -> bool {
        match self.min {
            Bound::Included(m) => score >= m,
            Bound::Excluded(m) => score > m,
            Bound::Unbounded => true,
        }
    }

    /// `true` if `score` is not above the upper end.
    #[inline]
    pub fn below_max(&self, score: f64) -> bool {
        match self.max {
            Bound::Included(m) => score <= m,
            Bound::Excluded(m) => score < m,
            Bound::Unbounded => true,
        }
    }

    #[inline]
    pub fn contains(&self, score: f64) -> bool {
        self.above_min(score) && self.below_max(score)
    }

    /// `true` if no score can satisfy both ends.
    pub fn is_empty(&self) -> bool {
        let (lo, lo_open) = match self.min {
            Bound::Included(v) => (v, false),
            Bound::Excluded(v) => (v, true),
            Bound::Unbounded => return false,
        };
        let (hi, hi_open) = match self.max {
            Bound::Included(v) => (v, false),
            Bound::Excluded(v) => (v, true),
            Bound::Unbounded => return false,
        };
        lo > hi || (lo == hi && (lo_open || hi_open))
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_contains_ends() {
        let r = ScoreRange::inclusive(1.0, 3.0);
        assert!(r.contains(1.0));
        assert!(r.contains(3.0));
        assert!(!r.contains(3.5));
    }

    #[test]
    fn test_exclusive_ends() {
        let r = ScoreRange::new(Bound::Excluded(1.0), Bound::Excluded(3.0));
        assert!(!r.contains(1.0));
        assert!(r.contains(2.0));
        assert!(!r.contains(3.0));
    }

    #[test]
    fn test_emptiness() {
        assert!(ScoreRange::inclusive(5.0, 1.0).is_empty());
        assert!(!ScoreRange::inclusive(2.0, 2.0).is_empty());
        assert!(ScoreRange::new(Bound::Excluded(2.0), Bound::Included(2.0)).is_empty());
        assert!(!ScoreRange::all().is_empty());
    }

    #[test]
    fn test_nan_bound_rejected() {
        let r = ScoreRange::new(Bound::Included(f64::NAN), Bound::Unbounded);
        assert!(r.validate().is_err());
        assert!(ScoreRange::inclusive(f64::NEG_INFINITY, f64::INFINITY)
            .validate()
            .is_ok());
    }
}
