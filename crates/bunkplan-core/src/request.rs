//! Typed social-preference requests.
//!
//! Requests arrive from the ingestion pipeline already classified and
//! deduplicated; the core never parses free text. Each request carries a
//! positive priority weight and a provenance tag naming the raw intake
//! field it was derived from. Provenance order is the deterministic
//! tie-break when ranking equally weighted requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::age::AgeBand;
use crate::error::ModelError;
use crate::ids::{BunkId, CamperId, RequestId};

/// The typed payload of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestKind {
    /// Mutual bunk-with: satisfied when requester and target share a bunk.
    BunkWith { target: CamperId },
    /// Exclusion: satisfied when requester and target do not share a bunk.
    NotBunkWith { target: CamperId },
    /// Satisfied when at least one bunkmate's age falls in the band.
    AgePreference { band: AgeBand },
    /// Same predicate as bunk-with, conventionally lower weight; kept as a
    /// distinct kind so graph consumers can tell the edges apart.
    SocializeWith { target: CamperId },
}

impl RequestKind {
    /// Returns the target camper for camper-directed kinds.
    pub fn target_camper(&self) -> Option<CamperId> {
        match self {
            RequestKind::BunkWith { target }
            | RequestKind::NotBunkWith { target }
            | RequestKind::SocializeWith { target } => Some(*target),
            RequestKind::AgePreference { .. } => None,
        }
    }

    /// Short label for logs and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::BunkWith { .. } => "bunk_with",
            RequestKind::NotBunkWith { .. } => "not_bunk_with",
            RequestKind::AgePreference { .. } => "age_preference",
            RequestKind::SocializeWith { .. } => "socialize_with",
        }
    }

    /// Evaluates this kind for `requester` against a camper→bunk mapping.
    ///
    /// `bunk_of` resolves a camper's current bunk; `bunkmate_in_band`
    /// answers whether any *other* camper in the requester's bunk has an
    /// age inside the band. The objective builder and the social graph
    /// both go through this one predicate, so their satisfied flags can
    /// never disagree.
    pub fn is_satisfied(
        &self,
        requester: CamperId,
        bunk_of: impl Fn(CamperId) -> Option<BunkId>,
        bunkmate_in_band: impl Fn(CamperId, AgeBand) -> bool,
    ) -> bool {
        match *self {
            RequestKind::BunkWith { target } | RequestKind::SocializeWith { target } => {
                match (bunk_of(requester), bunk_of(target)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            RequestKind::NotBunkWith { target } => {
                match (bunk_of(requester), bunk_of(target)) {
                    (Some(a), Some(b)) => a != b,
                    // An unplaced party is not co-bunked with anyone.
                    _ => true,
                }
            }
            RequestKind::AgePreference { band } => {
                bunk_of(requester).is_some() && bunkmate_in_band(requester, band)
            }
        }
    }
}

/// Which raw intake field a request was derived from.
///
/// Variant order is the deterministic tie-break for equally weighted
/// requests: earlier variants rank first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    /// The structured share-bunk-with field.
    BunkRequestField,
    /// Classified out of free-text bunking notes.
    BunkingNotes,
    /// The structured age-preference field.
    AgePreferenceField,
    /// Entered by office staff.
    Staff,
}

/// A typed, weighted social-preference request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub requester: CamperId,
    pub kind: RequestKind,
    /// Positive base priority; scaled by the objective multipliers.
    pub weight: u32,
    pub source: RequestSource,
}

impl Request {
    /// Creates a request, rejecting zero weights.
    pub fn new(
        id: RequestId,
        requester: CamperId,
        kind: RequestKind,
        weight: u32,
        source: RequestSource,
    ) -> Result<Self, ModelError> {
        if weight == 0 {
            return Err(ModelError::ZeroWeight { request: id.value() });
        }
        Ok(Request {
            id,
            requester,
            kind,
            weight,
            source,
        })
    }

    /// Evaluates this request against a camper→bunk mapping.
    ///
    /// See [`RequestKind::is_satisfied`].
    pub fn is_satisfied(
        &self,
        bunk_of: impl Fn(CamperId) -> Option<BunkId>,
        bunkmate_in_band: impl Fn(CamperId, AgeBand) -> bool,
    ) -> bool {
        self.kind
            .is_satisfied(self.requester, bunk_of, bunkmate_in_band)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} by {} (weight {})",
            self.id,
            self.kind.label(),
            self.requester,
            self.weight
        )
    }
}
