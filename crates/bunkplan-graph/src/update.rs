//! The incremental move handler.
//!
//! Applies a single camper's bunk move against the cached graph for a
//! `(session, year)`, building the graph first on a cache miss. The miss
//! path is functionally identical to a hit, just slower; callers learn
//! which one they got through [`MoveOutcome::rebuilt`].

use std::collections::HashMap;
use std::sync::Arc;

use bunkplan_core::{Bunk, BunkId, Camper, CamperId, Request};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::builder::build_graph;
use crate::cache::GraphCache;
use crate::error::GraphError;
use crate::graph::{AffectedEdge, GraphKey};

/// Roster data needed to build a graph on a cache miss.
#[derive(Debug, Clone)]
pub struct RosterSnapshot {
    pub campers: Vec<Camper>,
    pub bunks: Vec<Bunk>,
    pub requests: Vec<Request>,
    /// The current camper→bunk assignment.
    pub mapping: HashMap<CamperId, BunkId>,
}

/// Source of roster snapshots, backed by the record store.
pub trait RosterProvider {
    /// Returns the roster for a key, or `None` when the session is
    /// unknown.
    fn snapshot(&self, key: &GraphKey) -> Option<RosterSnapshot>;
}

/// The result of one move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub person: CamperId,
    pub old_bunk: Option<BunkId>,
    pub new_bunk: BunkId,
    /// Edges whose satisfied flag flipped, with before and after state.
    pub affected_edges: Vec<AffectedEdge>,
    /// Cache entry version after the move.
    pub version: u64,
    /// True when the graph had to be built for this call.
    pub rebuilt: bool,
}

/// Applies single-camper moves against the shared graph cache.
#[derive(Debug, Clone)]
pub struct MoveHandler {
    cache: Arc<GraphCache>,
}

impl MoveHandler {
    pub fn new(cache: Arc<GraphCache>) -> Self {
        Self { cache }
    }

    /// The cache this handler mutates.
    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    /// Moves `person` to `new_bunk` in the graph for `key`.
    ///
    /// On a cache miss the graph is built from `provider` and cached
    /// first. The person and bunk are validated before any mutation, so
    /// a failed move leaves the entry untouched. Mutations for the same
    /// key serialize on the entry's lock; other keys are unaffected.
    pub fn apply_move(
        &self,
        provider: &dyn RosterProvider,
        key: GraphKey,
        person: CamperId,
        new_bunk: BunkId,
    ) -> Result<MoveOutcome, GraphError> {
        let (slot, rebuilt) = match self.cache.get(&key) {
            Some(slot) => (slot, false),
            None => {
                let snapshot = provider
                    .snapshot(&key)
                    .ok_or(GraphError::UnknownSession { key })?;
                let graph = build_graph(
                    key,
                    &snapshot.campers,
                    &snapshot.bunks,
                    &snapshot.requests,
                    &snapshot.mapping,
                );
                (self.cache.insert(key, graph), true)
            }
        };

        let mut guard = slot.write();
        let diff = guard.try_mutate(|graph| graph.apply_move(person, new_bunk))?;
        let version = guard.version();
        drop(guard);

        info!(
            event = "move_applied",
            key = %key,
            person = %person,
            new_bunk = %new_bunk,
            affected = diff.affected_edges.len(),
            rebuilt,
        );

        Ok(MoveOutcome {
            person: diff.person,
            old_bunk: diff.old_bunk,
            new_bunk: diff.new_bunk,
            affected_edges: diff.affected_edges,
            version,
            rebuilt,
        })
    }
}
