//! Bunkplan Core - Domain types for camp bunk assignment
//!
//! This crate provides the fundamental types shared by the solver, the
//! social graph, and the HTTP layer:
//! - Identifiers and roster entities (campers, bunks, sessions)
//! - Typed social-preference requests and their satisfaction semantics
//! - The camp-age fixed-point format
//! - The grade adjacency rule
//! - The two-level hard/soft score
//! - Assignment solution types

pub mod age;
pub mod domain;
pub mod error;
pub mod grade;
pub mod ids;
pub mod request;
pub mod score;
pub mod solution;

pub use age::{AgeBand, CampAge};
pub use domain::{Bunk, Camper, Gender, Session};
pub use error::{ModelError, Result};
pub use grade::GradeLevel;
pub use ids::{BunkId, CamperId, RequestId, SessionId};
pub use request::{Request, RequestKind, RequestSource};
pub use score::HardSoftScore;
pub use solution::{AssignmentSolution, CamperSatisfaction};
