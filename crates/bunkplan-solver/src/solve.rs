//! The solver entry point.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use bunkplan_config::{ConfigError, SolverSettings};
use bunkplan_core::{AssignmentSolution, HardSoftScore};
use bunkplan_scoring::{ConstraintViolation, ScoreDirector, SessionRoster};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::construction::first_fit_decreasing;
use crate::local_search::{LocalSearch, DEFAULT_LATE_ACCEPTANCE_SIZE};
use crate::stats::SolverStats;
use crate::termination::{
    StepCountTermination, Termination, TimeTermination, UnimprovedTimeTermination,
};

/// Error raised before any search runs.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The settings fail their cross-field invariants.
    #[error("invalid solver settings: {0}")]
    InvalidSettings(#[from] ConfigError),
}

/// The outcome of one solve.
///
/// Infeasibility and timeout are not errors: the solution carries its
/// feasibility flag, `violations` enumerates the broken hard-constraint
/// instances when infeasible, and `proved_optimal`/`stopped_early` say
/// whether the search ended on a proof or on a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub solution: AssignmentSolution,
    /// The best score reached the objective upper bound with no hard
    /// violations; no better assignment exists.
    pub proved_optimal: bool,
    /// The search ended on a budget (time, steps, plateau or stop
    /// signal) rather than on a proof.
    pub stopped_early: bool,
    /// Broken hard constraints of the returned assignment; empty when
    /// feasible.
    pub violations: Vec<ConstraintViolation>,
    pub stats: SolverStats,
}

impl SolveResult {
    /// Returns true when no hard constraint is broken.
    pub fn feasible(&self) -> bool {
        self.solution.feasible
    }
}

/// Deterministic bounded-time assignment solver.
///
/// # Examples
///
/// ```
/// use bunkplan_config::SolverSettings;
/// use bunkplan_core::Gender;
/// use bunkplan_scoring::SessionRoster;
/// use bunkplan_solver::Solver;
/// use bunkplan_test::{bunk, bunk_with, camper, session};
///
/// let roster = SessionRoster::new(
///     session(1, 2026),
///     vec![
///         camper(1, 4, Gender::Female, "9.00"),
///         camper(2, 4, Gender::Female, "9.02"),
///     ],
///     vec![bunk(10, 8, Some(Gender::Female), false)],
///     vec![bunk_with(1, 1, 2, 5), bunk_with(2, 2, 1, 5)],
/// );
///
/// let solver = Solver::new(SolverSettings::default()).unwrap();
/// let result = solver.solve(&roster);
/// assert!(result.feasible());
/// assert!(result.proved_optimal);
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    settings: SolverSettings,
}

impl Solver {
    /// Creates a solver, validating the settings first.
    pub fn new(settings: SolverSettings) -> Result<Self, SolveError> {
        settings.validate()?;
        Ok(Solver { settings })
    }

    /// The validated settings this solver runs with.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Solves to completion or budget exhaustion.
    pub fn solve(&self, roster: &SessionRoster) -> SolveResult {
        self.solve_with_stop(roster, None, None)
    }

    /// Solves with an optional external stop flag and improvement
    /// observer.
    ///
    /// Raising the flag abandons the search at the next step; the best
    /// assignment found so far is still returned. The observer fires on
    /// every new best score, for cheap mid-solve progress reporting.
    pub fn solve_with_stop(
        &self,
        roster: &SessionRoster,
        stop: Option<&AtomicBool>,
        on_improvement: Option<&(dyn Fn(HardSoftScore) + Sync)>,
    ) -> SolveResult {
        let start = Instant::now();
        info!(
            event = "solve_start",
            session = %roster.session().id,
            campers = roster.campers().len(),
            bunks = roster.bunks().len(),
            requests = roster.requests().len(),
        );

        self.precheck(roster);

        let mut stats = SolverStats::default();
        let mut director = ScoreDirector::new(roster, &self.settings);
        first_fit_decreasing(&mut director, &mut stats);

        let bound = HardSoftScore::of(0, director.objective_upper_bound());
        let mut search = LocalSearch {
            rng: ChaCha8Rng::seed_from_u64(self.settings.solver.random_seed),
            late_size: DEFAULT_LATE_ACCEPTANCE_SIZE,
            start,
            stop,
            terminations: self.terminations(),
            bound,
            on_improvement,
            pending_undo: None,
        };
        let outcome = search.run(&mut director, &mut stats);

        director.set_assignment(outcome.best_assignment);
        let solution = director.to_solution();
        let violations = if solution.feasible {
            Vec::new()
        } else {
            director.violations()
        };
        stats.set_elapsed(start.elapsed());

        info!(
            event = "solve_end",
            score = %solution.score,
            feasible = solution.feasible,
            proved_optimal = outcome.reached_bound,
            steps = stats.step_count,
            moves_evaluated = stats.moves_evaluated,
            elapsed_ms = stats.elapsed_ms,
        );

        SolveResult {
            solution,
            proved_optimal: outcome.reached_bound,
            stopped_early: !outcome.reached_bound,
            violations,
            stats,
        }
    }

    /// Logs provable structural problems before any search time is
    /// spent. These surface again as violations or unassigned campers in
    /// the result; the search still runs to produce the least-bad
    /// assignment.
    fn precheck(&self, roster: &SessionRoster) {
        let unplaceable = (0..roster.campers().len())
            .filter(|&c| roster.eligible_bunks(c).next().is_none())
            .count();
        if unplaceable > 0 {
            warn!(
                event = "unplaceable_campers",
                count = unplaceable,
                "campers with no eligible bunk will be reported unassigned"
            );
        }

        let placeable = roster.campers().len() - unplaceable;
        let capacity = roster.active_capacity();
        if placeable > capacity {
            warn!(
                event = "capacity_shortfall",
                campers = placeable,
                capacity,
                "session capacity cannot hold every camper; solve will be infeasible"
            );
        }
    }

    fn terminations(&self) -> Vec<Box<dyn Termination + Send>> {
        let mut terminations: Vec<Box<dyn Termination + Send>> =
            vec![Box::new(TimeTermination::new(self.settings.time_limit()))];
        if let Some(limit) = self.settings.solver.step_limit {
            terminations.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = self.settings.unimproved_time_limit() {
            terminations.push(Box::new(UnimprovedTimeTermination::new(limit)));
        }
        terminations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::{BunkId, CamperId, Gender, GradeLevel, RequestId};
    use bunkplan_test::{bunk, bunk_with, camper, session};

    fn quick_settings() -> SolverSettings {
        let mut settings = SolverSettings::default();
        settings.solver.step_limit = Some(2_000);
        settings
    }

    #[test]
    fn mutual_pair_lands_together() {
        let roster = SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 4, Gender::Female, "9.02"),
                camper(3, 5, Gender::Female, "10.00"),
                camper(4, 5, Gender::Female, "10.04"),
            ],
            vec![
                bunk(10, 2, Some(Gender::Female), false),
                bunk(11, 2, Some(Gender::Female), false),
            ],
            vec![bunk_with(1, 1, 2, 5), bunk_with(2, 2, 1, 5)],
        );

        let solver = Solver::new(quick_settings()).unwrap();
        let result = solver.solve(&roster);

        assert!(result.feasible());
        assert_eq!(
            result.solution.bunk_of(CamperId(1)),
            result.solution.bunk_of(CamperId(2))
        );
        let satisfaction = &result.solution.satisfaction[&CamperId(1)];
        assert_eq!(satisfaction.satisfied, vec![RequestId(1)]);
    }

    #[test]
    fn grade_gap_bunk_reports_infeasibility() {
        // One bunk, grades 4 and 6, nobody in grade 5: every total
        // assignment breaks the adjacency rule.
        let roster = SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 6, Gender::Female, "11.00"),
            ],
            vec![bunk(10, 2, Some(Gender::Female), false)],
            vec![],
        );

        let solver = Solver::new(quick_settings()).unwrap();
        let result = solver.solve(&roster);

        assert!(!result.feasible());
        assert!(!result.proved_optimal);
        assert_eq!(
            result.violations,
            vec![ConstraintViolation::GradeGap {
                bunk: BunkId(10),
                lower: GradeLevel(4),
                upper: GradeLevel(6),
                gap: 2,
                missing: vec![GradeLevel(5)],
            }]
        );
    }

    #[test]
    fn exempt_bunk_accepts_the_same_mix() {
        let roster = SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 6, Gender::Female, "11.00"),
            ],
            vec![bunk(10, 2, Some(Gender::Female), true)],
            vec![],
        );

        let solver = Solver::new(quick_settings()).unwrap();
        let result = solver.solve(&roster);
        assert!(result.feasible());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn identical_inputs_solve_identically() {
        let build = || {
            SessionRoster::new(
                session(1, 2026),
                vec![
                    camper(1, 4, Gender::Female, "9.00"),
                    camper(2, 4, Gender::Female, "9.01"),
                    camper(3, 4, Gender::Female, "9.02"),
                    camper(4, 5, Gender::Female, "10.00"),
                    camper(5, 5, Gender::Female, "10.01"),
                    camper(6, 5, Gender::Female, "10.02"),
                ],
                vec![
                    bunk(10, 3, Some(Gender::Female), false),
                    bunk(11, 3, Some(Gender::Female), false),
                ],
                vec![
                    bunk_with(1, 1, 2, 5),
                    bunk_with(2, 3, 1, 4),
                    bunk_with(3, 4, 5, 5),
                    bunk_with(4, 6, 4, 3),
                ],
            )
        };

        let solver = Solver::new(quick_settings()).unwrap();
        let first = solver.solve(&build());
        let second = solver.solve(&build());
        assert_eq!(first.solution, second.solution);
        assert_eq!(first.proved_optimal, second.proved_optimal);
    }

    #[test]
    fn camper_without_eligible_bunk_is_reported_unassigned() {
        let roster = SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 4, Gender::Male, "9.01"),
            ],
            vec![bunk(10, 4, Some(Gender::Female), false)],
            vec![],
        );

        let solver = Solver::new(quick_settings()).unwrap();
        let result = solver.solve(&roster);
        assert_eq!(result.solution.unassigned, vec![CamperId(2)]);
        assert_eq!(
            result.solution.bunk_of(CamperId(1)),
            Some(BunkId(10))
        );
    }

    #[test]
    fn invalid_settings_are_rejected_up_front() {
        let settings = SolverSettings::default().with_multipliers(1, 5, 10);
        assert!(Solver::new(settings).is_err());
    }

    #[test]
    fn stop_flag_abandons_the_search() {
        use std::sync::atomic::AtomicBool;

        let roster = SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 4, Gender::Female, "9.01"),
            ],
            vec![
                bunk(10, 2, Some(Gender::Female), false),
                bunk(11, 2, Some(Gender::Female), false),
            ],
            // Target 99 is not on the roster, so the request can never be
            // satisfied and the bound stays out of reach; only the stop
            // flag ends the search quickly.
            vec![bunk_with(1, 1, 99, 4)],
        );

        let stop = AtomicBool::new(true);

        let mut settings = SolverSettings::default();
        settings.solver.time_limit_seconds = 3600;
        let solver = Solver::new(settings).unwrap();
        let result = solver.solve_with_stop(&roster, Some(&stop), None);
        assert!(result.stopped_early);
        // The construction-phase assignment is still returned.
        assert_eq!(result.solution.assigned_count(), 2);
    }
}
