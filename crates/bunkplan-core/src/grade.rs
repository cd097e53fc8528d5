//! The grade adjacency rule.
//!
//! A bunk may only mix grade levels that are at most one step apart. The
//! rule is evaluated over the *set of distinct grades* present in a bunk,
//! not over camper pairs, so a bunk of thirty grade-4 campers and one
//! grade-6 camper produces exactly one violation.
//!
//! Bunks flagged exempt (all-grades bunks) skip the rule entirely; that
//! flag is the only exemption. Bunks holding the youngest or oldest cohort
//! are deliberately not special-cased.
//!
//! # Examples
//!
//! ```
//! use bunkplan_core::grade::{self, GradeLevel};
//!
//! let grades = [GradeLevel(4), GradeLevel(6)];
//! let violations = grade::find_violations(&grades);
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].gap, 2);
//! assert_eq!(grade::missing_grades(&grades), vec![GradeLevel(5)]);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A grade level; 0 is the youngest cohort.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GradeLevel(pub u8);

impl GradeLevel {
    /// Returns the raw grade number.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grade {}", self.0)
    }
}

impl fmt::Debug for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GradeLevel({})", self.0)
    }
}

/// A pair of grades too far apart to share a bunk.
///
/// `lower < upper` always holds; `gap` is their distance and `missing`
/// lists the absent grades strictly between them, for rendering messages
/// like "bunk has grades 4 and 7 but is missing 5, 6".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeGapViolation {
    pub lower: GradeLevel,
    pub upper: GradeLevel,
    pub gap: u8,
    pub missing: Vec<GradeLevel>,
}

impl fmt::Display for GradeGapViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} and {} are {} apart",
            self.lower, self.upper, self.gap
        )?;
        if !self.missing.is_empty() {
            let missing: Vec<String> =
                self.missing.iter().map(|g| g.0.to_string()).collect();
            write!(f, " (missing {})", missing.join(", "))?;
        }
        Ok(())
    }
}

/// Returns true when the two grades may coexist in one bunk.
///
/// Reflexive and symmetric: a grade is adjacent to itself and to its
/// immediate neighbors.
#[inline]
pub fn are_grades_adjacent(a: GradeLevel, b: GradeLevel) -> bool {
    grade_gap(a, b) <= 1
}

/// Returns the absolute distance between two grades.
#[inline]
pub fn grade_gap(a: GradeLevel, b: GradeLevel) -> u8 {
    a.0.abs_diff(b.0)
}

/// Reports every pair of distinct grade values with a gap of two or more.
///
/// The input is collapsed to its distinct values first; duplicates never
/// add violations. Empty and single-grade inputs yield none. With more
/// than two distinct grades, all offending pairs are reported, ordered by
/// `(lower, upper)`.
pub fn find_violations(grades: &[GradeLevel]) -> Vec<GradeGapViolation> {
    let distinct: BTreeSet<GradeLevel> = grades.iter().copied().collect();
    let distinct: Vec<GradeLevel> = distinct.into_iter().collect();

    let mut violations = Vec::new();
    for (i, &lower) in distinct.iter().enumerate() {
        for &upper in &distinct[i + 1..] {
            let gap = grade_gap(lower, upper);
            if gap >= 2 {
                violations.push(GradeGapViolation {
                    lower,
                    upper,
                    gap,
                    missing: between(lower, upper)
                        .filter(|g| !distinct.contains(g))
                        .collect(),
                });
            }
        }
    }
    violations
}

/// Lists the grades strictly inside the observed span that are absent
/// from the input, ascending.
///
/// For exactly two distinct values this is every integer strictly between
/// them: `missing_grades(&[4, 7]) == [5, 6]`. Adjacent or equal grades
/// yield an empty list.
pub fn missing_grades(grades: &[GradeLevel]) -> Vec<GradeLevel> {
    let distinct: BTreeSet<GradeLevel> = grades.iter().copied().collect();
    let (Some(&lo), Some(&hi)) = (distinct.first(), distinct.last()) else {
        return Vec::new();
    };
    between(lo, hi).filter(|g| !distinct.contains(g)).collect()
}

/// Grades strictly between `lo` and `hi`, ascending.
fn between(lo: GradeLevel, hi: GradeLevel) -> impl Iterator<Item = GradeLevel> {
    (lo.0.saturating_add(1)..hi.0).map(GradeLevel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn g(v: u8) -> GradeLevel {
        GradeLevel(v)
    }

    #[test]
    fn adjacency_accepts_neighbors() {
        assert!(are_grades_adjacent(g(4), g(4)));
        assert!(are_grades_adjacent(g(4), g(5)));
        assert!(are_grades_adjacent(g(5), g(4)));
        assert!(!are_grades_adjacent(g(4), g(6)));
    }

    #[test]
    fn no_violations_for_trivial_inputs() {
        assert!(find_violations(&[]).is_empty());
        assert!(find_violations(&[g(4)]).is_empty());
        assert!(find_violations(&[g(4), g(4), g(4)]).is_empty());
        assert!(find_violations(&[g(4), g(5)]).is_empty());
    }

    #[test]
    fn reports_single_gap_pair() {
        let violations = find_violations(&[g(4), g(6)]);
        assert_eq!(
            violations,
            vec![GradeGapViolation {
                lower: g(4),
                upper: g(6),
                gap: 2,
                missing: vec![g(5)],
            }]
        );
    }

    #[test]
    fn duplicates_collapse_to_distinct_values() {
        let violations = find_violations(&[g(6), g(4), g(6), g(4), g(4)]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].gap, 2);
    }

    #[test]
    fn three_distinct_grades_report_all_offending_pairs() {
        let violations = find_violations(&[g(3), g(5), g(7)]);
        let pairs: Vec<(u8, u8)> = violations
            .iter()
            .map(|v| (v.lower.0, v.upper.0))
            .collect();
        assert_eq!(pairs, vec![(3, 5), (3, 7), (5, 7)]);
    }

    #[test]
    fn missing_grades_lists_the_hole() {
        assert_eq!(missing_grades(&[g(4), g(6)]), vec![g(5)]);
        assert_eq!(missing_grades(&[g(4), g(7)]), vec![g(5), g(6)]);
        assert_eq!(missing_grades(&[g(4), g(5)]), Vec::<GradeLevel>::new());
        assert_eq!(missing_grades(&[g(5), g(5)]), Vec::<GradeLevel>::new());
        assert_eq!(missing_grades(&[]), Vec::<GradeLevel>::new());
    }

    #[test]
    fn missing_grades_skips_present_values() {
        // Span 3..=7 with 5 present: only 4 and 6 are missing.
        assert_eq!(missing_grades(&[g(3), g(5), g(7)]), vec![g(4), g(6)]);
    }

    #[test]
    fn violation_renders_missing_grades() {
        let violation = &find_violations(&[g(4), g(7)])[0];
        assert_eq!(
            violation.to_string(),
            "grade 4 and grade 7 are 3 apart (missing 5, 6)"
        );
    }

    proptest! {
        #[test]
        fn adjacency_is_symmetric(a in 0u8..=16, b in 0u8..=16) {
            prop_assert_eq!(
                are_grades_adjacent(g(a), g(b)),
                are_grades_adjacent(g(b), g(a))
            );
            prop_assert_eq!(grade_gap(g(a), g(b)), grade_gap(g(b), g(a)));
        }

        #[test]
        fn adjacency_is_reflexive(a in 0u8..=16) {
            prop_assert!(are_grades_adjacent(g(a), g(a)));
            prop_assert_eq!(grade_gap(g(a), g(a)), 0);
        }

        #[test]
        fn single_distinct_value_never_violates(a in 0u8..=16, n in 1usize..8) {
            let grades = vec![g(a); n];
            prop_assert!(find_violations(&grades).is_empty());
        }
    }
}
