//! The indexed, solve-scoped view of one session's data.

use std::collections::HashMap;

use bunkplan_core::{Bunk, BunkId, Camper, CamperId, Request, Session};
use tracing::debug;

/// One session's campers, bunks and requests under dense indices.
///
/// Campers and bunks are sorted by id so index order is deterministic for
/// identical inputs. Requests are deduplicated by id (first occurrence
/// wins) and restricted to requesters present on the roster. Eligibility
/// (gender match plus session membership on both sides) is precomputed
/// per camper and bunk.
#[derive(Debug, Clone)]
pub struct SessionRoster {
    session: Session,
    campers: Vec<Camper>,
    bunks: Vec<Bunk>,
    requests: Vec<Request>,
    camper_index: HashMap<CamperId, usize>,
    bunk_index: HashMap<BunkId, usize>,
    /// Per camper index: indices into `requests` made by that camper.
    requests_by_camper: Vec<Vec<usize>>,
    /// Per camper index: indices into `requests` that target that camper.
    requests_targeting: Vec<Vec<usize>>,
    /// `eligible[camper][bunk]`
    eligible: Vec<Vec<bool>>,
}

impl SessionRoster {
    /// Builds the roster.
    ///
    /// Campers not attending the session and bunks not active in it are
    /// kept (and flagged ineligible everywhere) rather than dropped, so
    /// an assignment that references them reports a session-eligibility
    /// violation instead of silently losing people.
    pub fn new(
        session: Session,
        mut campers: Vec<Camper>,
        mut bunks: Vec<Bunk>,
        requests: Vec<Request>,
    ) -> Self {
        campers.sort_by_key(|c| c.id);
        campers.dedup_by_key(|c| c.id);
        bunks.sort_by_key(|b| b.id);
        bunks.dedup_by_key(|b| b.id);

        let camper_index: HashMap<CamperId, usize> =
            campers.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let bunk_index: HashMap<BunkId, usize> =
            bunks.iter().enumerate().map(|(i, b)| (b.id, i)).collect();

        let given = requests.len();
        let mut kept = Vec::with_capacity(requests.len());
        let mut seen = std::collections::HashSet::new();
        for request in requests {
            if !camper_index.contains_key(&request.requester) {
                continue;
            }
            if seen.insert(request.id) {
                kept.push(request);
            }
        }
        kept.sort_by_key(|r| r.id);
        if kept.len() < given {
            debug!(
                event = "requests_filtered",
                given,
                kept = kept.len(),
                "dropped duplicate or off-roster requests"
            );
        }

        let mut requests_by_camper = vec![Vec::new(); campers.len()];
        let mut requests_targeting = vec![Vec::new(); campers.len()];
        for (ri, request) in kept.iter().enumerate() {
            requests_by_camper[camper_index[&request.requester]].push(ri);
            if let Some(target) = request.kind.target_camper() {
                if let Some(&ti) = camper_index.get(&target) {
                    requests_targeting[ti].push(ri);
                }
            }
        }

        let eligible = campers
            .iter()
            .map(|camper| {
                bunks
                    .iter()
                    .map(|bunk| {
                        bunk.accepts_gender(camper.gender)
                            && camper.attends(session.id)
                            && bunk.active_in(session.id)
                    })
                    .collect()
            })
            .collect();

        SessionRoster {
            session,
            campers,
            bunks,
            requests: kept,
            camper_index,
            bunk_index,
            requests_by_camper,
            requests_targeting,
            eligible,
        }
    }

    /// The session this roster is scoped to.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// All campers, in index order.
    pub fn campers(&self) -> &[Camper] {
        &self.campers
    }

    /// All bunks, in index order.
    pub fn bunks(&self) -> &[Bunk] {
        &self.bunks
    }

    /// All requests, deduplicated, in id order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// The camper at a dense index.
    pub fn camper(&self, idx: usize) -> &Camper {
        &self.campers[idx]
    }

    /// The bunk at a dense index.
    pub fn bunk(&self, idx: usize) -> &Bunk {
        &self.bunks[idx]
    }

    /// Resolves a camper id to its dense index.
    pub fn camper_idx(&self, id: CamperId) -> Option<usize> {
        self.camper_index.get(&id).copied()
    }

    /// Resolves a bunk id to its dense index.
    pub fn bunk_idx(&self, id: BunkId) -> Option<usize> {
        self.bunk_index.get(&id).copied()
    }

    /// Indices of requests made by the camper at `idx`.
    pub fn requests_of(&self, idx: usize) -> &[usize] {
        &self.requests_by_camper[idx]
    }

    /// Indices of requests targeting the camper at `idx`.
    pub fn requests_targeting(&self, idx: usize) -> &[usize] {
        &self.requests_targeting[idx]
    }

    /// Whether the camper may be placed in the bunk at all.
    pub fn is_eligible(&self, camper_idx: usize, bunk_idx: usize) -> bool {
        self.eligible[camper_idx][bunk_idx]
    }

    /// Bunk indices the camper is eligible for, ascending.
    pub fn eligible_bunks(&self, camper_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.eligible[camper_idx]
            .iter()
            .enumerate()
            .filter_map(|(b, &ok)| ok.then_some(b))
    }

    /// Total capacity across bunks the session can actually use.
    pub fn active_capacity(&self) -> usize {
        self.bunks
            .iter()
            .filter(|b| b.active_in(self.session.id))
            .map(|b| b.capacity.get())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::Gender;
    use bunkplan_test::{bunk, bunk_with, camper, session};

    fn roster() -> SessionRoster {
        SessionRoster::new(
            session(1, 2026),
            vec![
                camper(2, 4, Gender::Female, "9.06"),
                camper(1, 4, Gender::Female, "9.02"),
                camper(3, 4, Gender::Male, "9.04"),
            ],
            vec![
                bunk(20, 8, Some(Gender::Male), false),
                bunk(10, 8, Some(Gender::Female), false),
            ],
            vec![
                bunk_with(1, 1, 2, 5),
                bunk_with(2, 2, 1, 5),
                bunk_with(1, 1, 2, 5), // duplicate id, dropped
                bunk_with(3, 99, 1, 5), // unknown requester, dropped
            ],
        )
    }

    #[test]
    fn campers_and_bunks_sort_by_id() {
        let r = roster();
        assert_eq!(r.camper(0).id, CamperId(1));
        assert_eq!(r.camper(1).id, CamperId(2));
        assert_eq!(r.bunk(0).id, BunkId(10));
        assert_eq!(r.bunk(1).id, BunkId(20));
    }

    #[test]
    fn requests_are_deduplicated_and_scoped() {
        let r = roster();
        assert_eq!(r.requests().len(), 2);
        assert_eq!(r.requests_of(0), &[0]);
        assert_eq!(r.requests_targeting(0), &[1]);
    }

    #[test]
    fn eligibility_tracks_gender() {
        let r = roster();
        // Camper 1 (female) fits bunk 10 (female) only.
        assert!(r.is_eligible(0, 0));
        assert!(!r.is_eligible(0, 1));
        // Camper 3 (male) fits bunk 20 (male) only.
        assert!(!r.is_eligible(2, 0));
        assert!(r.is_eligible(2, 1));
        assert_eq!(r.eligible_bunks(2).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn off_session_camper_is_ineligible_everywhere() {
        let mut outsider = camper(5, 4, Gender::Female, "9.00");
        outsider.sessions = vec![bunkplan_core::SessionId(99)];
        let r = SessionRoster::new(
            session(1, 2026),
            vec![outsider],
            vec![bunk(10, 8, Some(Gender::Female), false)],
            vec![],
        );
        assert_eq!(r.eligible_bunks(0).count(), 0);
    }
}
