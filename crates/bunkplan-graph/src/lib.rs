//! Bunkplan Graph - Per-session social graph with incremental updates
//!
//! For each `(session, year)` the graph holds a node per camper, a node
//! per bunk and a marker node per age-preference band, connected by one
//! typed, weighted edge per request. Every edge carries a `satisfied`
//! flag computed against the current camper→bunk mapping, so "what
//! changes if I move this person" is answerable from the graph alone.
//!
//! Graphs live in a [`GraphCache`] keyed by `(session, year)`, with a
//! version counter bumped on every mutation and targeted invalidation by
//! person. [`MoveHandler`] applies a single camper's move to a cached
//! graph in place, recomputing only the edges whose satisfaction could
//! have changed; the result is exactly what a full rebuild from the
//! post-move mapping would produce.

pub mod builder;
pub mod cache;
pub mod error;
pub mod graph;
pub mod update;

pub use builder::build_graph;
pub use cache::{CacheSlot, GraphCache};
pub use error::GraphError;
pub use graph::{AffectedEdge, Edge, GraphKey, MoveDiff, NodeRef, SocialGraph};
pub use update::{MoveHandler, MoveOutcome, RosterProvider, RosterSnapshot};
