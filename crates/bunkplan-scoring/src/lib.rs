//! Bunkplan Scoring - Constraint formulation and objective evaluation
//!
//! Translates one session's campers, bunks and requests into:
//! - hard constraints (capacity, gender, session eligibility, grade
//!   adjacency) whose violations make an assignment infeasible and are
//!   reported as structured values, and
//! - the soft objective: per-camper diminishing-returns scoring over
//!   satisfied requests plus a penalty for campers left entirely
//!   unsatisfied.
//!
//! [`ScoreDirector`] owns a working assignment and rescores incrementally
//! per move; [`ScoreDirector::calculate_full`] is the recalculation oracle
//! the incremental path is tested against.

pub mod constraint;
pub mod director;
pub mod objective;
pub mod roster;

pub use constraint::ConstraintViolation;
pub use director::ScoreDirector;
pub use objective::{camper_objective, objective_upper_bound, rank_requests};
pub use roster::SessionRoster;
