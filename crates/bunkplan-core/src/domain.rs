//! Roster entities: campers, bunks and sessions.
//!
//! These are read-only inputs for one solve. The external sync pipeline
//! mutates them between solves; the core never writes them back.

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::age::CampAge;
use crate::grade::GradeLevel;
use crate::ids::{BunkId, CamperId, SessionId};

/// Camper gender, matched against a bunk's designation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
}

/// A camper eligible for assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camper {
    pub id: CamperId,
    pub name: String,
    pub grade: GradeLevel,
    pub gender: Gender,
    pub age: CampAge,
    /// Sessions this camper attends.
    pub sessions: Vec<SessionId>,
}

impl Camper {
    /// Returns true when the camper attends the given session.
    pub fn attends(&self, session: SessionId) -> bool {
        self.sessions.contains(&session)
    }
}

/// A capacity-bounded group campers are assigned to for a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bunk {
    pub id: BunkId,
    pub name: String,
    pub capacity: NonZeroUsize,
    /// Gender designation; `None` accepts any gender.
    pub gender: Option<Gender>,
    /// How many consecutive grade levels this bunk may span.
    pub grade_span: u8,
    /// All-grades bunks skip the grade adjacency rule. This is the only
    /// exemption; extreme-cohort bunks are not exempt.
    pub exempt: bool,
    /// Sessions this bunk is active in.
    pub sessions: Vec<SessionId>,
}

impl Bunk {
    /// Returns true when the bunk is active in the given session.
    pub fn active_in(&self, session: SessionId) -> bool {
        self.sessions.contains(&session)
    }

    /// Returns true when the bunk accepts a camper of the given gender.
    pub fn accepts_gender(&self, gender: Gender) -> bool {
        self.gender.is_none() || self.gender == Some(gender)
    }
}

/// A bounded period with its own roster of campers and bunks.
///
/// Scopes both a solver run and the social graph: graphs are cached per
/// `(session, year)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub year: u16,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}
