//! HardSoftScore - Two-level score with hard and soft constraints

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A score with separate hard and soft constraint levels.
///
/// Hard constraints must be satisfied for an assignment to be feasible.
/// Soft constraints are optimization objectives.
///
/// When comparing scores:
/// 1. Hard scores are compared first
/// 2. Soft scores are only compared when hard scores are equal
///
/// # Examples
///
/// ```
/// use bunkplan_core::HardSoftScore;
///
/// let score1 = HardSoftScore::of(-1, 400);  // 1 hard constraint broken
/// let score2 = HardSoftScore::of(0, 120);   // Feasible but weak objective
///
/// // Feasible assignments always beat infeasible ones
/// assert!(score2 > score1);
///
/// let score3 = HardSoftScore::of(0, 180);
/// assert!(score3 > score2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    /// The zero score.
    pub const ZERO: HardSoftScore = HardSoftScore { hard: 0, soft: 0 };

    /// Creates a new HardSoftScore.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftScore { hard, soft }
    }

    /// Creates a score with only a hard component.
    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore { hard, soft: 0 }
    }

    /// Creates a score with only a soft component.
    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore { hard: 0, soft }
    }

    /// Returns the hard score component.
    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    /// Returns the soft score component.
    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }

    /// Returns true when no hard constraint is broken.
    #[inline]
    pub const fn is_feasible(&self) -> bool {
        self.hard >= 0
    }
}

impl Ord for HardSoftScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.hard.cmp(&other.hard) {
            Ordering::Equal => self.soft.cmp(&other.soft),
            other => other,
        }
    }
}

impl PartialOrd for HardSoftScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for HardSoftScore {
    type Output = HardSoftScore;

    fn add(self, rhs: Self) -> Self {
        HardSoftScore::of(self.hard + rhs.hard, self.soft + rhs.soft)
    }
}

impl AddAssign for HardSoftScore {
    fn add_assign(&mut self, rhs: Self) {
        self.hard += rhs.hard;
        self.soft += rhs.soft;
    }
}

impl Sub for HardSoftScore {
    type Output = HardSoftScore;

    fn sub(self, rhs: Self) -> Self {
        HardSoftScore::of(self.hard - rhs.hard, self.soft - rhs.soft)
    }
}

impl SubAssign for HardSoftScore {
    fn sub_assign(&mut self, rhs: Self) {
        self.hard -= rhs.hard;
        self.soft -= rhs.soft;
    }
}

impl Neg for HardSoftScore {
    type Output = HardSoftScore;

    fn neg(self) -> Self {
        HardSoftScore::of(-self.hard, -self.soft)
    }
}

impl Sum for HardSoftScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(HardSoftScore::ZERO, Add::add)
    }
}

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftScore({}, {})", self.hard, self.soft)
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_dominates_soft() {
        assert!(HardSoftScore::of(0, -1000) > HardSoftScore::of(-1, 1000));
        assert!(HardSoftScore::of(0, 2) > HardSoftScore::of(0, 1));
    }

    #[test]
    fn feasibility_tracks_hard_level() {
        assert!(HardSoftScore::of(0, -5).is_feasible());
        assert!(!HardSoftScore::of(-1, 100).is_feasible());
    }

    #[test]
    fn arithmetic() {
        let a = HardSoftScore::of(-1, 10);
        let b = HardSoftScore::of(-2, 5);
        assert_eq!(a + b, HardSoftScore::of(-3, 15));
        assert_eq!(a - b, HardSoftScore::of(1, 5));
        assert_eq!(-a, HardSoftScore::of(1, -10));

        let sum: HardSoftScore = [a, b].into_iter().sum();
        assert_eq!(sum, HardSoftScore::of(-3, 15));
    }

    #[test]
    fn display_format() {
        assert_eq!(HardSoftScore::of(-2, 37).to_string(), "-2hard/37soft");
        assert_eq!(HardSoftScore::ZERO.to_string(), "0hard/0soft");
    }
}
