//! Bunkplan Solver - Bounded-time assignment search
//!
//! Runs a construction heuristic followed by late-acceptance local search
//! over a [`bunkplan_scoring::ScoreDirector`], under a hard wall-clock
//! budget. The search is deterministic for identical inputs and settings:
//! move order is driven by a seeded RNG and every tie-break is fixed.
//!
//! Infeasibility and timeout are result variants, not errors: a solve
//! always returns the best assignment found, a feasibility flag, the
//! violated hard-constraint instances when infeasible, and whether
//! optimality was proved or the search stopped on a budget.
//!
//! [`SolverService`] runs solves on blocking threads with a stop signal,
//! keeping the request path free while a session is being solved.

pub mod service;
pub mod solve;
pub mod stats;
pub mod termination;

mod construction;
mod local_search;

pub use service::{SolveJob, SolverService, SolverStatus};
pub use solve::{SolveError, SolveResult, Solver};
pub use stats::SolverStats;
pub use termination::{
    SearchProgress, StepCountTermination, Termination, TimeTermination, UnimprovedTimeTermination,
};
