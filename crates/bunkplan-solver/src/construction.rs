//! Construction heuristic: first fit decreasing.
//!
//! Campers are placed one by one, hardest first (most requests, then
//! lowest id), each into the eligible bunk that yields the best score at
//! that point. Every camper with at least one eligible bunk ends up
//! assigned; the local search phase never unassigns anyone, so the
//! mapping stays total from here on.

use bunkplan_scoring::ScoreDirector;
use tracing::debug;

use crate::stats::SolverStats;

/// Places every placeable camper, returning the number assigned.
pub fn first_fit_decreasing(director: &mut ScoreDirector<'_>, stats: &mut SolverStats) -> usize {
    let roster = director.roster();

    let mut order: Vec<usize> = (0..roster.campers().len()).collect();
    order.sort_by_key(|&c| (std::cmp::Reverse(roster.requests_of(c).len()), c));

    let mut placed = 0;
    for camper_idx in order {
        let mut best: Option<(bunkplan_core::HardSoftScore, usize)> = None;
        for bunk_idx in roster.eligible_bunks(camper_idx) {
            let score = director.move_camper(camper_idx, Some(bunk_idx));
            stats.record_move(false);
            if best.map(|(s, _)| score > s).unwrap_or(true) {
                best = Some((score, bunk_idx));
            }
            director.move_camper(camper_idx, None);
        }
        if let Some((_, bunk_idx)) = best {
            director.move_camper(camper_idx, Some(bunk_idx));
            stats.moves_accepted += 1;
            placed += 1;
        }
    }

    debug!(
        event = "construction_done",
        placed,
        score = %director.score(),
    );
    placed
}
