//! Termination conditions for the search loop.

use std::time::{Duration, Instant};

use bunkplan_core::HardSoftScore;

/// Snapshot of search state handed to termination checks.
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    /// Time since the solve started.
    pub elapsed: Duration,
    /// Best score found so far.
    pub best_score: HardSoftScore,
    /// Local search steps taken.
    pub step: u64,
}

/// Decides when the search loop must stop.
pub trait Termination {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool;
}

/// Terminates after a wall-clock limit.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use bunkplan_solver::termination::TimeTermination;
///
/// let term = TimeTermination::new(Duration::from_secs(30));
/// let term = TimeTermination::seconds(30);
/// # let _ = term;
/// ```
#[derive(Debug, Clone)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Termination for TimeTermination {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool {
        progress.elapsed >= self.limit
    }
}

/// Terminates after a fixed number of local search steps.
///
/// Unlike the wall-clock budget this is machine-independent, so a solve
/// bounded only by steps is exactly reproducible.
#[derive(Debug, Clone)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Termination for StepCountTermination {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool {
        progress.step >= self.limit
    }
}

/// Terminates when the best score has not improved for a duration.
///
/// Useful for time-boxed solves that have plateaued: the hard budget
/// still applies, but the solver gives the time back when it is clearly
/// done improving.
#[derive(Debug)]
pub struct UnimprovedTimeTermination {
    limit: Duration,
    last_best: Option<HardSoftScore>,
    last_improvement: Option<Instant>,
}

impl UnimprovedTimeTermination {
    /// Creates a termination that stops after `limit` without improvement.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            last_best: None,
            last_improvement: None,
        }
    }

    /// Creates a termination with the limit in seconds.
    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl Termination for UnimprovedTimeTermination {
    fn should_stop(&mut self, progress: &SearchProgress) -> bool {
        let now = Instant::now();
        match self.last_best {
            None => {
                self.last_best = Some(progress.best_score);
                self.last_improvement = Some(now);
                false
            }
            Some(last) if progress.best_score > last => {
                self.last_best = Some(progress.best_score);
                self.last_improvement = Some(now);
                false
            }
            Some(_) => self
                .last_improvement
                .map(|t| now.duration_since(t) >= self.limit)
                .unwrap_or(false),
        }
    }
}
