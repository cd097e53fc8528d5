//! Incremental score director over a working assignment.

use std::collections::{BTreeMap, BTreeSet};

use bunkplan_config::SolverSettings;
use bunkplan_core::{
    AssignmentSolution, CamperSatisfaction, HardSoftScore, Request,
};

use crate::constraint::{self, ConstraintViolation};
use crate::objective;
use crate::roster::SessionRoster;

/// Owns the working camper→bunk assignment and keeps its score current.
///
/// Scoring is incremental: a single move recomputes only the two touched
/// bunks' hard terms and the soft terms of campers whose satisfaction
/// could have changed (the mover, both bunks' occupants, and requesters
/// targeting the mover). [`ScoreDirector::calculate_full`] recomputes
/// everything from scratch and is the oracle the incremental path must
/// agree with.
///
/// # Examples
///
/// ```
/// use bunkplan_config::SolverSettings;
/// use bunkplan_core::Gender;
/// use bunkplan_scoring::{ScoreDirector, SessionRoster};
/// use bunkplan_test::{bunk, bunk_with, camper, session};
///
/// let roster = SessionRoster::new(
///     session(1, 2026),
///     vec![
///         camper(1, 4, Gender::Female, "9.00"),
///         camper(2, 4, Gender::Female, "9.02"),
///     ],
///     vec![
///         bunk(10, 8, Some(Gender::Female), false),
///         bunk(11, 8, Some(Gender::Female), false),
///     ],
///     vec![bunk_with(1, 1, 2, 5)],
/// );
/// let settings = SolverSettings::default();
/// let mut director = ScoreDirector::new(&roster, &settings);
///
/// director.move_camper(0, Some(0));
/// let apart = director.move_camper(1, Some(1));
/// let together = director.move_camper(1, Some(0));
/// assert!(together > apart);
/// ```
#[derive(Debug, Clone)]
pub struct ScoreDirector<'a> {
    roster: &'a SessionRoster,
    settings: &'a SolverSettings,
    /// Camper index → bunk index.
    assignment: Vec<Option<usize>>,
    /// Bunk index → camper indices, unordered.
    occupants: Vec<Vec<usize>>,
    bunk_hard: Vec<i64>,
    camper_soft: Vec<i64>,
    hard_total: i64,
    soft_total: i64,
}

impl<'a> ScoreDirector<'a> {
    /// Creates a director with every camper unassigned.
    pub fn new(roster: &'a SessionRoster, settings: &'a SolverSettings) -> Self {
        Self::with_assignment(roster, settings, vec![None; roster.campers().len()])
    }

    /// Creates a director seeded with an existing assignment.
    ///
    /// # Panics
    ///
    /// Panics if `assignment` length differs from the roster camper count.
    pub fn with_assignment(
        roster: &'a SessionRoster,
        settings: &'a SolverSettings,
        assignment: Vec<Option<usize>>,
    ) -> Self {
        assert_eq!(
            assignment.len(),
            roster.campers().len(),
            "assignment length must match roster camper count"
        );
        let mut director = ScoreDirector {
            roster,
            settings,
            assignment,
            occupants: vec![Vec::new(); roster.bunks().len()],
            bunk_hard: vec![0; roster.bunks().len()],
            camper_soft: vec![0; roster.campers().len()],
            hard_total: 0,
            soft_total: 0,
        };
        director.rebuild_caches();
        director
    }

    /// The roster this director scores against.
    pub fn roster(&self) -> &'a SessionRoster {
        self.roster
    }

    /// The current working assignment, camper index → bunk index.
    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    /// The current bunk of a camper.
    pub fn bunk_of(&self, camper_idx: usize) -> Option<usize> {
        self.assignment[camper_idx]
    }

    /// Campers currently in a bunk, unordered.
    pub fn occupants(&self, bunk_idx: usize) -> &[usize] {
        &self.occupants[bunk_idx]
    }

    /// The cached score of the working assignment.
    pub fn score(&self) -> HardSoftScore {
        HardSoftScore::of(self.hard_total, self.soft_total)
    }

    /// Replaces the whole assignment and rebuilds the caches.
    pub fn set_assignment(&mut self, assignment: Vec<Option<usize>>) {
        assert_eq!(assignment.len(), self.roster.campers().len());
        self.assignment = assignment;
        self.rebuild_caches();
    }

    /// Moves one camper, rescoring incrementally.
    ///
    /// Returns the new score. Moving a camper back restores the previous
    /// score exactly; the solver uses that for undo.
    pub fn move_camper(&mut self, camper_idx: usize, to: Option<usize>) -> HardSoftScore {
        let from = self.assignment[camper_idx];
        if from == to {
            return self.score();
        }

        if let Some(b) = from {
            self.occupants[b].retain(|&c| c != camper_idx);
        }
        self.assignment[camper_idx] = to;
        if let Some(b) = to {
            self.occupants[b].push(camper_idx);
        }

        for bunk_idx in [from, to].into_iter().flatten() {
            let fresh = self.compute_bunk_hard(bunk_idx);
            self.hard_total += fresh - self.bunk_hard[bunk_idx];
            self.bunk_hard[bunk_idx] = fresh;
        }

        let mut affected: BTreeSet<usize> = BTreeSet::new();
        affected.insert(camper_idx);
        for bunk_idx in [from, to].into_iter().flatten() {
            affected.extend(self.occupants[bunk_idx].iter().copied());
        }
        for &ri in self.roster.requests_targeting(camper_idx) {
            let requester = self.roster.requests()[ri].requester;
            if let Some(idx) = self.roster.camper_idx(requester) {
                affected.insert(idx);
            }
        }

        for idx in affected {
            let fresh = self.compute_camper_soft(idx);
            self.soft_total += fresh - self.camper_soft[idx];
            self.camper_soft[idx] = fresh;
        }

        self.score()
    }

    /// Recomputes the score from scratch, ignoring every cache.
    ///
    /// The incremental path must always agree with this.
    pub fn calculate_full(&self) -> HardSoftScore {
        let hard: i64 = (0..self.roster.bunks().len())
            .map(|b| self.compute_bunk_hard(b))
            .sum();
        let soft: i64 = (0..self.roster.campers().len())
            .map(|c| self.compute_camper_soft(c))
            .sum();
        HardSoftScore::of(hard, soft)
    }

    /// Enumerates every hard-constraint violation in the working
    /// assignment, in bunk index order.
    pub fn violations(&self) -> Vec<ConstraintViolation> {
        let session = self.roster.session().id;
        let enabled = self.settings.constraint.grade_adjacency_enabled;
        (0..self.roster.bunks().len())
            .flat_map(|bunk_idx| {
                let occupants: Vec<&bunkplan_core::Camper> = self.occupants[bunk_idx]
                    .iter()
                    .map(|&c| self.roster.camper(c))
                    .collect();
                constraint::check_bunk(
                    self.roster.bunk(bunk_idx),
                    &occupants,
                    session,
                    enabled,
                )
            })
            .collect()
    }

    /// Reports each camper's satisfied and unsatisfied requests under the
    /// working assignment.
    pub fn satisfaction(&self) -> BTreeMap<bunkplan_core::CamperId, CamperSatisfaction> {
        (0..self.roster.campers().len())
            .map(|camper_idx| {
                let mut report = CamperSatisfaction::default();
                for &ri in self.roster.requests_of(camper_idx) {
                    let request = &self.roster.requests()[ri];
                    if self.is_satisfied(request) {
                        report.satisfied.push(request.id);
                    } else {
                        report.unsatisfied.push(request.id);
                    }
                }
                (self.roster.camper(camper_idx).id, report)
            })
            .collect()
    }

    /// Freezes the working assignment into an immutable solution.
    pub fn to_solution(&self) -> AssignmentSolution {
        let mut assignments = BTreeMap::new();
        let mut unassigned = Vec::new();
        for (camper_idx, bunk_idx) in self.assignment.iter().enumerate() {
            let camper = self.roster.camper(camper_idx).id;
            match bunk_idx {
                Some(b) => {
                    assignments.insert(camper, self.roster.bunk(*b).id);
                }
                None => unassigned.push(camper),
            }
        }
        let score = self.score();
        AssignmentSolution {
            assignments,
            unassigned,
            feasible: score.hard() == 0,
            score,
            satisfaction: self.satisfaction(),
        }
    }

    /// The soft score reachable if every request were satisfied.
    pub fn objective_upper_bound(&self) -> i64 {
        objective::objective_upper_bound(self.roster, &self.settings.objective)
    }

    fn is_satisfied(&self, request: &Request) -> bool {
        request.is_satisfied(
            |camper| {
                self.roster
                    .camper_idx(camper)
                    .and_then(|idx| self.assignment[idx])
                    .map(|b| self.roster.bunk(b).id)
            },
            |camper, band| {
                let Some(idx) = self.roster.camper_idx(camper) else {
                    return false;
                };
                let Some(bunk_idx) = self.assignment[idx] else {
                    return false;
                };
                self.occupants[bunk_idx]
                    .iter()
                    .any(|&o| o != idx && band.contains(self.roster.camper(o).age))
            },
        )
    }

    fn compute_camper_soft(&self, camper_idx: usize) -> i64 {
        let request_indices = self.roster.requests_of(camper_idx);
        if request_indices.is_empty() {
            return 0;
        }
        let satisfied: Vec<&Request> = request_indices
            .iter()
            .map(|&ri| &self.roster.requests()[ri])
            .filter(|r| self.is_satisfied(r))
            .collect();
        if satisfied.is_empty() {
            return -self.settings.constraint.unsatisfied_camper_penalty;
        }
        objective::camper_objective(&satisfied, &self.settings.objective)
    }

    fn compute_bunk_hard(&self, bunk_idx: usize) -> i64 {
        let occupants: Vec<&bunkplan_core::Camper> = self.occupants[bunk_idx]
            .iter()
            .map(|&c| self.roster.camper(c))
            .collect();
        constraint::check_bunk(
            self.roster.bunk(bunk_idx),
            &occupants,
            self.roster.session().id,
            self.settings.constraint.grade_adjacency_enabled,
        )
        .iter()
        .map(violation_weight)
        .sum()
    }

    fn rebuild_caches(&mut self) {
        for occupants in &mut self.occupants {
            occupants.clear();
        }
        for (camper_idx, bunk_idx) in self.assignment.iter().enumerate() {
            if let Some(b) = *bunk_idx {
                self.occupants[b].push(camper_idx);
            }
        }
        for bunk_idx in 0..self.roster.bunks().len() {
            self.bunk_hard[bunk_idx] = self.compute_bunk_hard(bunk_idx);
        }
        for camper_idx in 0..self.roster.campers().len() {
            self.camper_soft[camper_idx] = self.compute_camper_soft(camper_idx);
        }
        self.hard_total = self.bunk_hard.iter().sum();
        self.soft_total = self.camper_soft.iter().sum();
    }
}

/// Hard-score weight of one violation. Capacity counts its excess so the
/// search can tell "one over" from "five over"; everything else counts 1.
fn violation_weight(violation: &ConstraintViolation) -> i64 {
    match violation {
        ConstraintViolation::CapacityExceeded {
            assigned, capacity, ..
        } => -((assigned - capacity) as i64),
        _ => -1,
    }
}
