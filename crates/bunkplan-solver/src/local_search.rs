//! Late-acceptance local search over change and swap moves.
//!
//! A change move reassigns one camper to another eligible bunk; a swap
//! move exchanges two campers across bunks. A move is accepted when its
//! score is at least the current score or at least the score from
//! `late_size` steps ago (the late acceptance criterion), otherwise it is
//! undone. Candidate order comes from a seeded RNG, so runs are
//! reproducible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use bunkplan_core::HardSoftScore;
use bunkplan_scoring::ScoreDirector;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::stats::SolverStats;
use crate::termination::{SearchProgress, Termination};

/// Default late acceptance ring size.
pub(crate) const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

/// Outcome of the local search phase.
pub(crate) struct SearchOutcome {
    pub best_assignment: Vec<Option<usize>>,
    pub best_score: HardSoftScore,
    /// The objective upper bound was reached; the result is optimal.
    pub reached_bound: bool,
    /// An external stop was requested.
    pub stopped: bool,
}

pub(crate) struct LocalSearch<'s> {
    pub rng: ChaCha8Rng,
    pub late_size: usize,
    pub start: Instant,
    pub stop: Option<&'s AtomicBool>,
    pub terminations: Vec<Box<dyn Termination + Send>>,
    /// Score that proves optimality when reached.
    pub bound: HardSoftScore,
    /// Invoked on every new best score, for progress reporting.
    pub on_improvement: Option<&'s (dyn Fn(HardSoftScore) + Sync)>,
    pub pending_undo: Option<Undo>,
}

impl<'s> LocalSearch<'s> {
    /// Improves the director's working assignment until a termination
    /// fires, the stop flag is raised, or the bound is reached.
    pub fn run(
        &mut self,
        director: &mut ScoreDirector<'_>,
        stats: &mut SolverStats,
    ) -> SearchOutcome {
        let roster = director.roster();

        // Campers that can move at all, with their eligible bunks.
        let movable: Vec<(usize, Vec<usize>)> = (0..roster.campers().len())
            .filter_map(|c| {
                let bunks: Vec<usize> = roster.eligible_bunks(c).collect();
                (bunks.len() > 1).then_some((c, bunks))
            })
            .collect();

        let mut current = director.score();
        let mut best_assignment = director.assignment().to_vec();
        let mut best_score = current;
        let mut late_scores = vec![current; self.late_size];
        let mut step: u64 = 0;
        let mut stopped = false;

        if best_score >= self.bound {
            return SearchOutcome {
                best_assignment,
                best_score,
                reached_bound: true,
                stopped: false,
            };
        }
        if movable.is_empty() {
            debug!(event = "local_search_skipped", reason = "no movable campers");
            return SearchOutcome {
                best_assignment,
                best_score,
                reached_bound: false,
                stopped: false,
            };
        }

        loop {
            if let Some(flag) = self.stop {
                if flag.load(Ordering::SeqCst) {
                    stopped = true;
                    break;
                }
            }
            let progress = SearchProgress {
                elapsed: self.start.elapsed(),
                best_score,
                step,
            };
            if self
                .terminations
                .iter_mut()
                .any(|t| t.should_stop(&progress))
            {
                break;
            }

            let new_score = if self.rng.random_bool(0.5) {
                match self.change_move(director, &movable) {
                    Some(score) => score,
                    None => continue,
                }
            } else {
                match self.swap_move(director, &movable) {
                    Some(score) => score,
                    None => continue,
                }
            };

            let late_idx = (step as usize) % self.late_size;
            let accepted = new_score >= current || new_score >= late_scores[late_idx];
            stats.record_move(accepted);

            if accepted {
                current = new_score;
                late_scores[late_idx] = new_score;
                if new_score > best_score {
                    best_score = new_score;
                    best_assignment.copy_from_slice(director.assignment());
                    trace!(event = "new_best", score = %best_score, step);
                    if let Some(observer) = self.on_improvement {
                        observer(best_score);
                    }
                    if best_score >= self.bound {
                        step += 1;
                        stats.record_step();
                        break;
                    }
                }
            } else {
                self.undo(director);
            }

            step += 1;
            stats.record_step();
        }

        SearchOutcome {
            best_assignment,
            best_score,
            reached_bound: best_score >= self.bound,
            stopped,
        }
    }

    fn change_move(
        &mut self,
        director: &mut ScoreDirector<'_>,
        movable: &[(usize, Vec<usize>)],
    ) -> Option<HardSoftScore> {
        let (camper, bunks) = &movable[self.rng.random_range(0..movable.len())];
        let to = bunks[self.rng.random_range(0..bunks.len())];
        let from = director.bunk_of(*camper);
        if from == Some(to) {
            return None;
        }
        self.pending_undo = Some(Undo::Change {
            camper: *camper,
            from,
        });
        Some(director.move_camper(*camper, Some(to)))
    }

    fn swap_move(
        &mut self,
        director: &mut ScoreDirector<'_>,
        movable: &[(usize, Vec<usize>)],
    ) -> Option<HardSoftScore> {
        let (c1, bunks1) = &movable[self.rng.random_range(0..movable.len())];
        let (c2, bunks2) = &movable[self.rng.random_range(0..movable.len())];
        let (b1, b2) = match (director.bunk_of(*c1), director.bunk_of(*c2)) {
            (Some(b1), Some(b2)) if b1 != b2 => (b1, b2),
            _ => return None,
        };
        if !bunks1.contains(&b2) || !bunks2.contains(&b1) {
            return None;
        }
        director.move_camper(*c1, Some(b2));
        let score = director.move_camper(*c2, Some(b1));
        self.pending_undo = Some(Undo::Swap {
            c1: *c1,
            b1,
            c2: *c2,
            b2,
        });
        Some(score)
    }

    fn undo(&mut self, director: &mut ScoreDirector<'_>) {
        match self.pending_undo.take() {
            Some(Undo::Change { camper, from }) => {
                director.move_camper(camper, from);
            }
            Some(Undo::Swap { c1, b1, c2, b2 }) => {
                director.move_camper(c2, Some(b2));
                director.move_camper(c1, Some(b1));
            }
            None => {}
        }
    }
}

pub(crate) enum Undo {
    Change {
        camper: usize,
        from: Option<usize>,
    },
    Swap {
        c1: usize,
        b1: usize,
        c2: usize,
        b2: usize,
    },
}
