//! Building a social graph from roster data.

use std::collections::HashMap;

use bunkplan_core::{Bunk, BunkId, Camper, CamperId, Request, RequestKind};
use indexmap::IndexMap;
use tracing::debug;

use crate::graph::{BunkNode, CamperNode, Edge, GraphKey, NodeRef, SocialGraph};

/// Builds the graph for one `(session, year)`.
///
/// A pure function of its inputs: a camper node per session member (in id
/// order), a bunk node per session bunk, a marker node per age-preference
/// request, and one edge per request whose requester is in the session.
/// Edge `satisfied` flags are computed against `mapping`, the current
/// camper→bunk assignment. Building twice from the same inputs yields
/// identical graphs.
///
/// A camper-directed edge keeps its target id even when the target is
/// not a session member; the absent target simply counts as unplaced
/// when satisfaction is evaluated.
pub fn build_graph(
    key: GraphKey,
    campers: &[Camper],
    bunks: &[Bunk],
    requests: &[Request],
    mapping: &HashMap<CamperId, BunkId>,
) -> SocialGraph {
    let mut camper_nodes: Vec<&Camper> = campers
        .iter()
        .filter(|c| c.attends(key.session))
        .collect();
    camper_nodes.sort_by_key(|c| c.id);

    let mut bunk_nodes: Vec<&Bunk> = bunks
        .iter()
        .filter(|b| b.active_in(key.session))
        .collect();
    bunk_nodes.sort_by_key(|b| b.id);

    let bunk_ids: IndexMap<BunkId, BunkNode> = bunk_nodes
        .iter()
        .map(|b| {
            (
                b.id,
                BunkNode {
                    id: b.id,
                    name: b.name.clone(),
                    capacity: b.capacity.get(),
                },
            )
        })
        .collect();

    let camper_ids: IndexMap<CamperId, CamperNode> = camper_nodes
        .iter()
        .map(|c| {
            let bunk = mapping
                .get(&c.id)
                .copied()
                .filter(|b| bunk_ids.contains_key(b));
            (
                c.id,
                CamperNode {
                    id: c.id,
                    bunk,
                    age: c.age,
                },
            )
        })
        .collect();

    let mut bands = IndexMap::new();
    let mut edges = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut requests: Vec<&Request> = requests.iter().collect();
    requests.sort_by_key(|r| r.id);
    for request in requests {
        if !camper_ids.contains_key(&request.requester) || !seen.insert(request.id) {
            continue;
        }
        let target = match request.kind {
            RequestKind::BunkWith { target }
            | RequestKind::NotBunkWith { target }
            | RequestKind::SocializeWith { target } => NodeRef::Camper { id: target },
            RequestKind::AgePreference { band } => {
                bands.insert(request.id, band);
                NodeRef::AgeBand {
                    request: request.id,
                }
            }
        };
        edges.push(Edge {
            request: request.id,
            kind: request.kind,
            weight: request.weight,
            requester: request.requester,
            target,
            satisfied: false, // computed by the graph constructor
        });
    }

    let graph = SocialGraph::new(key, camper_ids, bunk_ids, bands, edges);
    debug!(
        event = "graph_built",
        key = %key,
        campers = graph.campers().count(),
        bunks = graph.bunks().count(),
        edges = graph.edges().len(),
    );
    graph
}
