//! Hard constraint checks with structured violations.
//!
//! A violation is data, not a log line: it names the bunk, the campers or
//! grades involved, and for grade gaps the missing intermediate grades,
//! so callers can fix input instead of retrying blindly.

use std::fmt;

use bunkplan_core::grade::{self, GradeLevel};
use bunkplan_core::{BunkId, Camper, CamperId, SessionId};
use serde::{Deserialize, Serialize};

/// A broken hard constraint instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintViolation {
    /// More campers assigned than the bunk holds.
    CapacityExceeded {
        bunk: BunkId,
        assigned: usize,
        capacity: usize,
    },
    /// Camper gender differs from the bunk's designation.
    GenderMismatch { bunk: BunkId, camper: CamperId },
    /// Camper or bunk is not part of the session being solved.
    SessionMismatch {
        bunk: BunkId,
        camper: CamperId,
        session: SessionId,
    },
    /// Two grade levels in the bunk are at least two steps apart.
    GradeGap {
        bunk: BunkId,
        lower: GradeLevel,
        upper: GradeLevel,
        gap: u8,
        missing: Vec<GradeLevel>,
    },
    /// The bunk holds more distinct grade levels than its spread policy
    /// allows.
    GradeSpanExceeded {
        bunk: BunkId,
        distinct: usize,
        allowed: u8,
    },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::CapacityExceeded {
                bunk,
                assigned,
                capacity,
            } => write!(f, "{bunk} holds {assigned} campers but fits {capacity}"),
            ConstraintViolation::GenderMismatch { bunk, camper } => {
                write!(f, "{camper} does not match the gender designation of {bunk}")
            }
            ConstraintViolation::SessionMismatch {
                bunk,
                camper,
                session,
            } => write!(f, "{camper} in {bunk} is outside {session}"),
            ConstraintViolation::GradeGap {
                bunk,
                lower,
                upper,
                gap,
                missing,
            } => {
                write!(f, "{bunk} mixes {lower} and {upper} ({gap} apart")?;
                if missing.is_empty() {
                    write!(f, ")")
                } else {
                    let missing: Vec<String> =
                        missing.iter().map(|g| g.value().to_string()).collect();
                    write!(f, ", missing {})", missing.join(", "))
                }
            }
            ConstraintViolation::GradeSpanExceeded {
                bunk,
                distinct,
                allowed,
            } => write!(
                f,
                "{bunk} holds {distinct} distinct grades but may span {allowed}"
            ),
        }
    }
}

/// Checks one bunk's occupants against every hard constraint.
///
/// `grade_adjacency_enabled` gates the grade rule; exempt bunks skip it
/// regardless. Violations come back in a fixed order (capacity, gender,
/// session, grade) for deterministic reporting.
pub fn check_bunk(
    bunk: &bunkplan_core::Bunk,
    occupants: &[&Camper],
    session: SessionId,
    grade_adjacency_enabled: bool,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    if occupants.len() > bunk.capacity.get() {
        violations.push(ConstraintViolation::CapacityExceeded {
            bunk: bunk.id,
            assigned: occupants.len(),
            capacity: bunk.capacity.get(),
        });
    }

    for camper in occupants {
        if !bunk.accepts_gender(camper.gender) {
            violations.push(ConstraintViolation::GenderMismatch {
                bunk: bunk.id,
                camper: camper.id,
            });
        }
    }

    for camper in occupants {
        if !camper.attends(session) || !bunk.active_in(session) {
            violations.push(ConstraintViolation::SessionMismatch {
                bunk: bunk.id,
                camper: camper.id,
                session,
            });
        }
    }

    if grade_adjacency_enabled && !bunk.exempt {
        let grades: Vec<GradeLevel> = occupants.iter().map(|c| c.grade).collect();
        for violation in grade::find_violations(&grades) {
            violations.push(ConstraintViolation::GradeGap {
                bunk: bunk.id,
                lower: violation.lower,
                upper: violation.upper,
                gap: violation.gap,
                missing: violation.missing,
            });
        }

        // The spread policy caps distinct grade levels independently of
        // the adjacency rule; with the usual span of 2 the adjacency rule
        // subsumes it, but wider bunks still get the cap.
        let distinct: std::collections::BTreeSet<GradeLevel> =
            grades.iter().copied().collect();
        if distinct.len() > bunk.grade_span as usize {
            violations.push(ConstraintViolation::GradeSpanExceeded {
                bunk: bunk.id,
                distinct: distinct.len(),
                allowed: bunk.grade_span,
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::Gender;
    use bunkplan_test::{bunk, camper, FIXTURE_SESSION};

    #[test]
    fn full_bunk_at_capacity_is_fine() {
        let b = bunk(10, 2, Some(Gender::Female), false);
        let campers = [
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 4, Gender::Female, "9.01"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        assert!(check_bunk(&b, &occupants, FIXTURE_SESSION, true).is_empty());
    }

    #[test]
    fn overfull_bunk_reports_counts() {
        let b = bunk(10, 1, None, false);
        let campers = [
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 4, Gender::Female, "9.01"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        let violations = check_bunk(&b, &occupants, FIXTURE_SESSION, true);
        assert_eq!(
            violations,
            vec![ConstraintViolation::CapacityExceeded {
                bunk: b.id,
                assigned: 2,
                capacity: 1,
            }]
        );
    }

    #[test]
    fn gender_mismatch_names_the_camper() {
        let b = bunk(10, 4, Some(Gender::Female), false);
        let campers = [camper(1, 4, Gender::Male, "9.00")];
        let occupants: Vec<&Camper> = campers.iter().collect();
        let violations = check_bunk(&b, &occupants, FIXTURE_SESSION, true);
        assert!(matches!(
            violations[0],
            ConstraintViolation::GenderMismatch { camper, .. } if camper == CamperId(1)
        ));
    }

    #[test]
    fn grade_gap_carries_missing_grades() {
        let b = bunk(10, 8, None, false);
        let campers = [
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 7, Gender::Female, "12.00"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        let violations = check_bunk(&b, &occupants, FIXTURE_SESSION, true);
        assert_eq!(
            violations,
            vec![ConstraintViolation::GradeGap {
                bunk: b.id,
                lower: GradeLevel(4),
                upper: GradeLevel(7),
                gap: 3,
                missing: vec![GradeLevel(5), GradeLevel(6)],
            }]
        );
    }

    #[test]
    fn exempt_bunk_skips_grade_rule_only() {
        let b = bunk(10, 8, None, true);
        let campers = [
            camper(1, 2, Gender::Female, "7.00"),
            camper(2, 7, Gender::Female, "12.00"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        assert!(check_bunk(&b, &occupants, FIXTURE_SESSION, true).is_empty());
    }

    #[test]
    fn disabled_rule_skips_grade_check() {
        let b = bunk(10, 8, None, false);
        let campers = [
            camper(1, 2, Gender::Female, "7.00"),
            camper(2, 7, Gender::Female, "12.00"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        assert!(check_bunk(&b, &occupants, FIXTURE_SESSION, false).is_empty());
    }

    #[test]
    fn spread_policy_caps_distinct_grades() {
        let mut b = bunk(10, 8, None, false);
        b.grade_span = 1;
        let campers = [
            camper(1, 4, Gender::Female, "9.00"),
            camper(2, 5, Gender::Female, "10.00"),
        ];
        let occupants: Vec<&Camper> = campers.iter().collect();
        // Grades 4 and 5 are adjacent, but a span-1 bunk may hold only
        // one distinct grade.
        let violations = check_bunk(&b, &occupants, FIXTURE_SESSION, true);
        assert_eq!(
            violations,
            vec![ConstraintViolation::GradeSpanExceeded {
                bunk: b.id,
                distinct: 2,
                allowed: 1,
            }]
        );
    }

    #[test]
    fn violation_display_is_actionable() {
        let v = ConstraintViolation::GradeGap {
            bunk: BunkId(10),
            lower: GradeLevel(4),
            upper: GradeLevel(7),
            gap: 3,
            missing: vec![GradeLevel(5), GradeLevel(6)],
        };
        assert_eq!(
            v.to_string(),
            "bunk-10 mixes grade 4 and grade 7 (3 apart, missing 5, 6)"
        );
    }
}
