//! The diminishing-returns objective.
//!
//! Each camper's satisfied requests are ranked by priority and scaled by
//! a positional multiplier table (first request largest), so spreading
//! satisfaction across many campers beats stacking it on a few. Campers
//! whose every request goes unsatisfied charge a penalty large enough to
//! dominate the multiplier terms.

use bunkplan_config::ObjectiveSettings;
use bunkplan_core::Request;

use crate::roster::SessionRoster;

/// Sorts requests into their deterministic ranking order: weight
/// descending, then provenance order, then request id.
pub fn rank_requests<'r>(requests: impl IntoIterator<Item = &'r Request>) -> Vec<&'r Request> {
    let mut ranked: Vec<&Request> = requests.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then(a.source.cmp(&b.source))
            .then(a.id.cmp(&b.id))
    });
    ranked
}

/// Scores one camper's satisfied requests.
///
/// The requests are ranked ([`rank_requests`]) and each position scaled
/// by the multiplier table: with multipliers `(10, 5, 1)`, three
/// satisfied requests of equal base priority `P` score `10P + 5P + 1P`.
pub fn camper_objective(satisfied: &[&Request], objective: &ObjectiveSettings) -> i64 {
    rank_requests(satisfied.iter().copied())
        .iter()
        .enumerate()
        .map(|(position, request)| {
            objective.multiplier_for_position(position) * request.weight as i64
        })
        .sum()
}

/// The soft score an assignment could reach if every request were
/// satisfied: no camper penalties and every camper's full request list
/// counted. Reaching this bound with a zero hard score proves the
/// solution optimal.
pub fn objective_upper_bound(roster: &SessionRoster, objective: &ObjectiveSettings) -> i64 {
    (0..roster.campers().len())
        .map(|camper_idx| {
            let all: Vec<&Request> = roster
                .requests_of(camper_idx)
                .iter()
                .map(|&ri| &roster.requests()[ri])
                .collect();
            camper_objective(&all, objective)
        })
        .sum()
}
