//! The social graph data structure.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use bunkplan_core::{AgeBand, BunkId, CampAge, CamperId, RequestId, RequestKind, SessionId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::GraphError;

/// Cache key: one graph per session per year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphKey {
    pub session: SessionId,
    pub year: u16,
}

impl GraphKey {
    pub fn new(session: SessionId, year: u16) -> Self {
        Self { session, year }
    }
}

impl fmt::Display for GraphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.year)
    }
}

/// Identity of a graph node an edge can point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeRef {
    Camper { id: CamperId },
    Bunk { id: BunkId },
    /// Marker node for an age-preference request's band.
    AgeBand { request: RequestId },
}

/// A camper node with its current bunk assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CamperNode {
    pub id: CamperId,
    pub bunk: Option<BunkId>,
    pub age: CampAge,
}

/// A bunk node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BunkNode {
    pub id: BunkId,
    pub name: String,
    pub capacity: usize,
}

/// One edge per request: typed, weighted, with a satisfied flag computed
/// against the current camper→bunk mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub request: RequestId,
    pub kind: RequestKind,
    pub weight: u32,
    pub requester: CamperId,
    pub target: NodeRef,
    pub satisfied: bool,
}

/// An edge whose satisfied flag flipped during a move, with both the
/// pre-move and post-move state so the diff is unambiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffectedEdge {
    pub request: RequestId,
    pub kind: RequestKind,
    pub weight: u32,
    pub requester: CamperId,
    pub target: NodeRef,
    pub was_satisfied: bool,
    pub satisfied: bool,
}

/// The exact result of applying one move to a graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveDiff {
    pub person: CamperId,
    pub old_bunk: Option<BunkId>,
    pub new_bunk: BunkId,
    /// Edges whose satisfaction status changed, in stable edge order.
    pub affected_edges: Vec<AffectedEdge>,
}

/// The social graph for one `(session, year)`.
///
/// Owned exclusively by its cache entry; mutated in place only through
/// [`SocialGraph::apply_move`], otherwise replaced wholesale by a fresh
/// build. Node maps are insertion-ordered so identical inputs produce
/// identical iteration order.
#[derive(Clone, Debug, PartialEq)]
pub struct SocialGraph {
    key: GraphKey,
    campers: IndexMap<CamperId, CamperNode>,
    bunks: IndexMap<BunkId, BunkNode>,
    bands: IndexMap<RequestId, AgeBand>,
    edges: Vec<Edge>,
    /// Per camper: indices of edges touching it as requester or target.
    incident: HashMap<CamperId, SmallVec<[usize; 4]>>,
    /// Indices of age-preference edges, whose satisfaction depends on
    /// whole-bunk membership rather than a single target.
    age_edges: Vec<usize>,
    /// Current occupants per bunk.
    members: HashMap<BunkId, BTreeSet<CamperId>>,
}

impl SocialGraph {
    pub(crate) fn new(
        key: GraphKey,
        campers: IndexMap<CamperId, CamperNode>,
        bunks: IndexMap<BunkId, BunkNode>,
        bands: IndexMap<RequestId, AgeBand>,
        edges: Vec<Edge>,
    ) -> Self {
        let mut incident: HashMap<CamperId, SmallVec<[usize; 4]>> = HashMap::new();
        let mut age_edges = Vec::new();
        for (idx, edge) in edges.iter().enumerate() {
            incident.entry(edge.requester).or_default().push(idx);
            match edge.target {
                NodeRef::Camper { id } => {
                    if id != edge.requester {
                        incident.entry(id).or_default().push(idx);
                    }
                }
                NodeRef::AgeBand { .. } => age_edges.push(idx),
                NodeRef::Bunk { .. } => {}
            }
        }

        let mut members: HashMap<BunkId, BTreeSet<CamperId>> = HashMap::new();
        for node in campers.values() {
            if let Some(bunk) = node.bunk {
                members.entry(bunk).or_default().insert(node.id);
            }
        }

        let mut graph = SocialGraph {
            key,
            campers,
            bunks,
            bands,
            edges,
            incident,
            age_edges,
            members,
        };
        graph.recompute_all();
        graph
    }

    /// The `(session, year)` this graph belongs to.
    pub fn key(&self) -> GraphKey {
        self.key
    }

    /// Returns true when the person has a camper node.
    pub fn contains_person(&self, person: CamperId) -> bool {
        self.campers.contains_key(&person)
    }

    /// Returns true when the bunk has a node.
    pub fn contains_bunk(&self, bunk: BunkId) -> bool {
        self.bunks.contains_key(&bunk)
    }

    /// The person's current bunk, if placed.
    pub fn bunk_of(&self, person: CamperId) -> Option<BunkId> {
        self.campers.get(&person).and_then(|n| n.bunk)
    }

    /// Camper nodes in insertion order.
    pub fn campers(&self) -> impl Iterator<Item = &CamperNode> {
        self.campers.values()
    }

    /// Bunk nodes in insertion order.
    pub fn bunks(&self) -> impl Iterator<Item = &BunkNode> {
        self.bunks.values()
    }

    /// All edges in build order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The band behind an age-preference marker node.
    pub fn band(&self, request: RequestId) -> Option<AgeBand> {
        self.bands.get(&request).copied()
    }

    /// Current satisfied flag per request, for diffing against rebuilds.
    pub fn satisfied_flags(&self) -> BTreeMap<RequestId, bool> {
        self.edges
            .iter()
            .map(|e| (e.request, e.satisfied))
            .collect()
    }

    /// Moves one person to a new bunk, recomputing the satisfied flag of
    /// every edge the move can influence: the person's incident edges,
    /// plus age-preference edges of campers in the vacated and entered
    /// bunks (their bunkmate sets changed too).
    ///
    /// Returns the edges whose flag actually flipped. The post-move graph
    /// is identical to a fresh build from the post-move mapping.
    pub fn apply_move(
        &mut self,
        person: CamperId,
        new_bunk: BunkId,
    ) -> Result<MoveDiff, GraphError> {
        if !self.contains_person(person) {
            return Err(GraphError::PersonNotInGraph {
                person,
                key: self.key,
            });
        }
        if !self.contains_bunk(new_bunk) {
            return Err(GraphError::BunkNotInGraph {
                bunk: new_bunk,
                key: self.key,
            });
        }

        let old_bunk = self.campers[&person].bunk;

        // Candidate edges, gathered before the mutation: the person's own
        // edges plus age edges of everyone sharing either bunk.
        let mut candidates: BTreeSet<usize> = self
            .incident
            .get(&person)
            .map(|edges| edges.iter().copied().collect())
            .unwrap_or_default();
        for &idx in &self.age_edges {
            let requester = self.edges[idx].requester;
            let in_old = old_bunk
                .and_then(|b| self.members.get(&b))
                .is_some_and(|m| m.contains(&requester));
            let in_new = self
                .members
                .get(&new_bunk)
                .is_some_and(|m| m.contains(&requester));
            if in_old || in_new {
                candidates.insert(idx);
            }
        }

        if let Some(b) = old_bunk {
            if let Some(members) = self.members.get_mut(&b) {
                members.remove(&person);
            }
        }
        self.members.entry(new_bunk).or_default().insert(person);
        self.campers[&person].bunk = Some(new_bunk);

        let mut affected_edges = Vec::new();
        for idx in candidates {
            let fresh = self.eval_edge(&self.edges[idx]);
            let edge = &mut self.edges[idx];
            if fresh != edge.satisfied {
                affected_edges.push(AffectedEdge {
                    request: edge.request,
                    kind: edge.kind,
                    weight: edge.weight,
                    requester: edge.requester,
                    target: edge.target,
                    was_satisfied: edge.satisfied,
                    satisfied: fresh,
                });
                edge.satisfied = fresh;
            }
        }

        Ok(MoveDiff {
            person,
            old_bunk,
            new_bunk,
            affected_edges,
        })
    }

    fn eval_edge(&self, edge: &Edge) -> bool {
        edge.kind.is_satisfied(
            edge.requester,
            |camper| self.campers.get(&camper).and_then(|n| n.bunk),
            |camper, band| {
                let Some(bunk) = self.campers.get(&camper).and_then(|n| n.bunk) else {
                    return false;
                };
                self.members
                    .get(&bunk)
                    .is_some_and(|members| {
                        members.iter().any(|&m| {
                            m != camper
                                && self
                                    .campers
                                    .get(&m)
                                    .is_some_and(|n| band.contains(n.age))
                        })
                    })
            },
        )
    }

    fn recompute_all(&mut self) {
        let flags: Vec<bool> = self.edges.iter().map(|e| self.eval_edge(e)).collect();
        for (edge, flag) in self.edges.iter_mut().zip(flags) {
            edge.satisfied = flag;
        }
    }
}
