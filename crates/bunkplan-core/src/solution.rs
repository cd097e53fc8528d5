//! Assignment solution types.
//!
//! An [`AssignmentSolution`] is produced by one solver invocation and is
//! immutable afterwards; the next solve supersedes it rather than mutating
//! it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{BunkId, CamperId, RequestId};
use crate::score::HardSoftScore;

/// Which of a camper's requests the assignment satisfies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamperSatisfaction {
    pub satisfied: Vec<RequestId>,
    pub unsatisfied: Vec<RequestId>,
}

impl CamperSatisfaction {
    /// Returns true when at least one request is satisfied.
    pub fn any_satisfied(&self) -> bool {
        !self.satisfied.is_empty()
    }
}

/// The outcome of one solver invocation.
///
/// The mapping is total over eligible campers: every camper is either in
/// `assignments` or listed in `unassigned` (no eligible bunk existed).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSolution {
    /// Camper to bunk, for every camper the solver could place.
    pub assignments: BTreeMap<CamperId, BunkId>,
    /// Campers with no eligible bunk, reported rather than dropped.
    pub unassigned: Vec<CamperId>,
    /// True when no hard constraint is broken.
    pub feasible: bool,
    /// The achieved objective value.
    pub score: HardSoftScore,
    /// Per-camper satisfied and unsatisfied requests.
    pub satisfaction: BTreeMap<CamperId, CamperSatisfaction>,
}

impl AssignmentSolution {
    /// Returns the assigned bunk for a camper, if any.
    pub fn bunk_of(&self, camper: CamperId) -> Option<BunkId> {
        self.assignments.get(&camper).copied()
    }

    /// Returns the number of placed campers.
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// Returns the campers with zero satisfied requests, out of those
    /// that made any request at all.
    pub fn campers_left_wanting(&self) -> Vec<CamperId> {
        self.satisfaction
            .iter()
            .filter(|(_, s)| !s.any_satisfied() && !s.unsatisfied.is_empty())
            .map(|(&c, _)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_counts() {
        let mut assignments = BTreeMap::new();
        assignments.insert(CamperId(1), BunkId(10));
        assignments.insert(CamperId(2), BunkId(10));

        let solution = AssignmentSolution {
            assignments,
            unassigned: vec![CamperId(3)],
            feasible: true,
            score: HardSoftScore::of(0, 50),
            satisfaction: BTreeMap::new(),
        };

        assert_eq!(solution.bunk_of(CamperId(1)), Some(BunkId(10)));
        assert_eq!(solution.bunk_of(CamperId(3)), None);
        assert_eq!(solution.assigned_count(), 2);
    }

    #[test]
    fn campers_left_wanting_ignores_requestless_campers() {
        let mut satisfaction = BTreeMap::new();
        satisfaction.insert(
            CamperId(1),
            CamperSatisfaction {
                satisfied: vec![],
                unsatisfied: vec![RequestId(1)],
            },
        );
        satisfaction.insert(CamperId(2), CamperSatisfaction::default());
        satisfaction.insert(
            CamperId(3),
            CamperSatisfaction {
                satisfied: vec![RequestId(2)],
                unsatisfied: vec![],
            },
        );

        let solution = AssignmentSolution {
            assignments: BTreeMap::new(),
            unassigned: vec![],
            feasible: true,
            score: HardSoftScore::ZERO,
            satisfaction,
        };

        assert_eq!(solution.campers_left_wanting(), vec![CamperId(1)]);
    }
}
