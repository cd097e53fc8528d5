//! Shared application state.

use std::collections::HashMap;
use std::sync::Arc;

use bunkplan_config::SolverSettings;
use bunkplan_core::{Bunk, BunkId, Camper, CamperId, Request, Session, SessionId};
use bunkplan_graph::{GraphCache, GraphKey, MoveHandler, RosterProvider, RosterSnapshot};
use bunkplan_solver::SolverService;
use parking_lot::RwLock;

/// One session's uploaded roster, the service-side stand-in for the
/// external record store.
#[derive(Debug, Clone)]
pub struct StoredRoster {
    pub session: Session,
    pub campers: Vec<Camper>,
    pub bunks: Vec<Bunk>,
    pub requests: Vec<Request>,
    /// Current camper→bunk assignment, updated by moves and solves.
    pub mapping: HashMap<CamperId, BunkId>,
}

/// Shared state behind every handler.
pub struct AppState {
    rosters: RwLock<HashMap<SessionId, StoredRoster>>,
    cache: Arc<GraphCache>,
    mover: MoveHandler,
    solver: SolverService,
    settings: SolverSettings,
}

impl AppState {
    /// Creates state with the given solver settings.
    pub fn new(settings: SolverSettings) -> Self {
        let cache = Arc::new(GraphCache::new());
        Self {
            rosters: RwLock::new(HashMap::new()),
            mover: MoveHandler::new(cache.clone()),
            cache,
            solver: SolverService::new(),
            settings,
        }
    }

    /// The shared graph cache.
    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    /// The move handler bound to the shared cache.
    pub fn mover(&self) -> &MoveHandler {
        &self.mover
    }

    /// The background solver service.
    pub fn solver(&self) -> &SolverService {
        &self.solver
    }

    /// The solver settings configured at startup.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Stores (or replaces) a session's roster. The session's cached
    /// graph is dropped: it was built from the previous upload.
    pub fn put_roster(&self, roster: StoredRoster) {
        let key = GraphKey::new(roster.session.id, roster.session.year);
        self.rosters.write().insert(roster.session.id, roster);
        self.cache.remove(&key);
    }

    /// Reads a session's roster.
    pub fn roster(&self, session: SessionId) -> Option<StoredRoster> {
        self.rosters.read().get(&session).cloned()
    }

    /// Records a camper's new bunk in the stored mapping, so a future
    /// graph rebuild starts from the post-move state.
    pub fn record_move(&self, session: SessionId, camper: CamperId, bunk: BunkId) {
        if let Some(roster) = self.rosters.write().get_mut(&session) {
            roster.mapping.insert(camper, bunk);
        }
    }

    /// Replaces a session's mapping wholesale (after a solve completes).
    pub fn record_assignment(&self, session: SessionId, mapping: HashMap<CamperId, BunkId>) {
        if let Some(roster) = self.rosters.write().get_mut(&session) {
            roster.mapping = mapping;
        }
    }
}

impl RosterProvider for AppState {
    fn snapshot(&self, key: &GraphKey) -> Option<RosterSnapshot> {
        let rosters = self.rosters.read();
        let roster = rosters.get(&key.session)?;
        if roster.session.year != key.year {
            return None;
        }
        Some(RosterSnapshot {
            campers: roster.campers.clone(),
            bunks: roster.bunks.clone(),
            requests: roster.requests.clone(),
            mapping: roster.mapping.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::Gender;
    use bunkplan_test::{bunk, camper, session};

    fn stored() -> StoredRoster {
        StoredRoster {
            session: session(1, 2026),
            campers: vec![camper(1, 4, Gender::Female, "9.00")],
            bunks: vec![bunk(10, 8, None, false)],
            requests: vec![],
            mapping: HashMap::new(),
        }
    }

    #[test]
    fn snapshot_requires_matching_year() {
        let state = AppState::new(SolverSettings::default());
        state.put_roster(stored());

        let right_year = GraphKey::new(SessionId(1), 2026);
        assert!(state.snapshot(&right_year).is_some());

        let wrong_year = GraphKey::new(SessionId(1), 2031);
        assert!(state.snapshot(&wrong_year).is_none());
    }

    #[test]
    fn re_upload_drops_the_cached_graph() {
        let state = AppState::new(SolverSettings::default());
        state.put_roster(stored());

        let key = GraphKey::new(SessionId(1), 2026);
        let snapshot = state.snapshot(&key).unwrap();
        let graph = bunkplan_graph::build_graph(
            key,
            &snapshot.campers,
            &snapshot.bunks,
            &snapshot.requests,
            &snapshot.mapping,
        );
        state.cache().insert(key, graph);
        assert_eq!(state.cache().len(), 1);

        state.put_roster(stored());
        assert!(state.cache().is_empty());
    }

    #[test]
    fn record_move_updates_the_mapping() {
        let state = AppState::new(SolverSettings::default());
        state.put_roster(stored());
        state.record_move(SessionId(1), CamperId(1), BunkId(10));
        assert_eq!(
            state.roster(SessionId(1)).unwrap().mapping[&CamperId(1)],
            BunkId(10)
        );
    }

    #[test]
    fn record_assignment_replaces_the_mapping_wholesale() {
        let state = AppState::new(SolverSettings::default());
        state.put_roster(stored());
        state.record_move(SessionId(1), CamperId(1), BunkId(10));

        state.record_assignment(SessionId(1), HashMap::new());
        assert!(state.roster(SessionId(1)).unwrap().mapping.is_empty());
    }
}
