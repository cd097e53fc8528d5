//! The session-scoped graph cache.
//!
//! Entries are keyed by `(session, year)`. Each entry is its own lock, so
//! mutations for one key serialize against each other while other keys
//! proceed untouched; a failure while operating on one entry can never
//! corrupt another session's graph. Every mutation bumps the entry's
//! version counter, letting lock-free readers detect staleness and retry.

use std::collections::HashMap;
use std::sync::Arc;

use bunkplan_core::CamperId;
use parking_lot::RwLock;
use tracing::debug;

use crate::graph::{GraphKey, SocialGraph};

/// A cached graph with its mutation counter.
#[derive(Debug)]
pub struct CacheSlot {
    graph: SocialGraph,
    version: u64,
}

impl CacheSlot {
    fn new(graph: SocialGraph) -> Self {
        Self { graph, version: 1 }
    }

    /// The cached graph.
    pub fn graph(&self) -> &SocialGraph {
        &self.graph
    }

    /// The current version; bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mutates the graph, bumping the version counter.
    ///
    /// Going through this method is what keeps version counting honest:
    /// there is no other way to get a mutable graph reference.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut SocialGraph) -> T) -> T {
        let result = f(&mut self.graph);
        self.version += 1;
        result
    }

    /// Mutates the graph through a fallible operation, bumping the
    /// version only when it succeeds. A rejected operation must leave
    /// the graph untouched for this to be sound; [`SocialGraph`]'s
    /// mutators validate before writing.
    pub fn try_mutate<T, E>(
        &mut self,
        f: impl FnOnce(&mut SocialGraph) -> Result<T, E>,
    ) -> Result<T, E> {
        let result = f(&mut self.graph)?;
        self.version += 1;
        Ok(result)
    }
}

/// Shared cache of social graphs, keyed by `(session, year)`.
///
/// # Examples
///
/// ```
/// use bunkplan_graph::{build_graph, GraphCache, GraphKey};
/// use bunkplan_core::SessionId;
/// use std::collections::HashMap;
///
/// let cache = GraphCache::new();
/// let key = GraphKey::new(SessionId(1), 2026);
/// assert!(cache.get(&key).is_none());
///
/// let graph = build_graph(key, &[], &[], &[], &HashMap::new());
/// cache.insert(key, graph);
/// assert!(cache.get(&key).is_some());
/// ```
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: RwLock<HashMap<GraphKey, Arc<RwLock<CacheSlot>>>>,
}

impl GraphCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the slot for a key.
    pub fn get(&self, key: &GraphKey) -> Option<Arc<RwLock<CacheSlot>>> {
        self.entries.read().get(key).cloned()
    }

    /// Inserts a freshly built graph, replacing any previous entry for
    /// the key. The new slot starts at version 1.
    pub fn insert(&self, key: GraphKey, graph: SocialGraph) -> Arc<RwLock<CacheSlot>> {
        let slot = Arc::new(RwLock::new(CacheSlot::new(graph)));
        self.entries.write().insert(key, slot.clone());
        debug!(event = "graph_cached", key = %key);
        slot
    }

    /// Removes one entry, returning true when it existed.
    pub fn remove(&self, key: &GraphKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Number of cached graphs.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every entry whose graph contains a node for `person`,
    /// returning how many were affected. Callers decide whether to
    /// rebuild eagerly or let the next lookup fault the graph back in.
    pub fn invalidate_for_person(&self, person: CamperId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, slot| !slot.read().graph().contains_person(person));
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(
                event = "graph_invalidated",
                person = %person,
                entries = dropped,
            );
        }
        dropped
    }

    /// Reads through a closure, retrying if the entry's version moved
    /// while the value was being computed. Returns `None` on a miss.
    pub fn read_consistent<T>(
        &self,
        key: &GraphKey,
        f: impl Fn(&SocialGraph) -> T,
    ) -> Option<T> {
        let slot = self.get(key)?;
        loop {
            let (version, value) = {
                let guard = slot.read();
                (guard.version(), f(guard.graph()))
            };
            if slot.read().version() == version {
                return Some(value);
            }
        }
    }
}
