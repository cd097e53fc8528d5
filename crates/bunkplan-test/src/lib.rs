//! Shared test fixtures for bunkplan crates.
//!
//! Provides compact constructors for rosters so tests read as scenarios,
//! not as struct literals.
//!
//! # Example
//!
//! ```
//! use bunkplan_test::{camper, bunk, session, bunk_with};
//! use bunkplan_core::Gender;
//!
//! let s = session(1, 2026);
//! let campers = vec![
//!     camper(1, 4, Gender::Female, "9.06"),
//!     camper(2, 4, Gender::Female, "9.08"),
//! ];
//! let bunks = vec![bunk(10, 8, Some(Gender::Female), false)];
//! let requests = vec![bunk_with(1, 1, 2, 5)];
//! assert_eq!(campers.len(), 2);
//! # let _ = (s, bunks, requests);
//! ```

use std::num::NonZeroUsize;

use bunkplan_core::{
    AgeBand, Bunk, BunkId, CampAge, Camper, CamperId, Gender, GradeLevel, Request,
    RequestId, RequestKind, RequestSource, Session, SessionId,
};
use chrono::NaiveDate;

/// Session id used by every fixture entity.
pub const FIXTURE_SESSION: SessionId = SessionId(1);

/// Creates a session with a fixed two-week July window.
pub fn session(id: u64, year: u16) -> Session {
    Session {
        id: SessionId(id),
        year,
        name: format!("Session {id}"),
        starts_on: NaiveDate::from_ymd_opt(year as i32, 7, 1).unwrap(),
        ends_on: NaiveDate::from_ymd_opt(year as i32, 7, 14).unwrap(),
    }
}

/// Creates a camper attending [`FIXTURE_SESSION`].
///
/// `age` uses the camp-age `Y.MM` format, e.g. `"10.03"`.
pub fn camper(id: u64, grade: u8, gender: Gender, age: &str) -> Camper {
    Camper {
        id: CamperId(id),
        name: format!("Camper {id}"),
        grade: GradeLevel(grade),
        gender,
        age: age.parse::<CampAge>().unwrap(),
        sessions: vec![FIXTURE_SESSION],
    }
}

/// Creates a bunk active in [`FIXTURE_SESSION`].
pub fn bunk(id: u64, capacity: usize, gender: Option<Gender>, exempt: bool) -> Bunk {
    Bunk {
        id: BunkId(id),
        name: format!("Bunk {id}"),
        capacity: NonZeroUsize::new(capacity).unwrap(),
        gender,
        grade_span: 2,
        exempt,
        sessions: vec![FIXTURE_SESSION],
    }
}

/// Creates a mutual bunk-with request.
pub fn bunk_with(id: u64, requester: u64, target: u64, weight: u32) -> Request {
    Request::new(
        RequestId(id),
        CamperId(requester),
        RequestKind::BunkWith {
            target: CamperId(target),
        },
        weight,
        RequestSource::BunkRequestField,
    )
    .unwrap()
}

/// Creates an exclusion request.
pub fn not_bunk_with(id: u64, requester: u64, target: u64, weight: u32) -> Request {
    Request::new(
        RequestId(id),
        CamperId(requester),
        RequestKind::NotBunkWith {
            target: CamperId(target),
        },
        weight,
        RequestSource::BunkingNotes,
    )
    .unwrap()
}

/// Creates a socialize-with request.
pub fn socialize_with(id: u64, requester: u64, target: u64, weight: u32) -> Request {
    Request::new(
        RequestId(id),
        CamperId(requester),
        RequestKind::SocializeWith {
            target: CamperId(target),
        },
        weight,
        RequestSource::BunkingNotes,
    )
    .unwrap()
}

/// Creates an age-preference request for ages `min..=max` (camp-age strings).
pub fn age_preference(id: u64, requester: u64, min: &str, max: &str, weight: u32) -> Request {
    let band = AgeBand::new(
        min.parse::<CampAge>().unwrap(),
        max.parse::<CampAge>().unwrap(),
    )
    .unwrap();
    Request::new(
        RequestId(id),
        CamperId(requester),
        RequestKind::AgePreference { band },
        weight,
        RequestSource::AgePreferenceField,
    )
    .unwrap()
}
