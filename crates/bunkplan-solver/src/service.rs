//! Background solver service.
//!
//! Solving is CPU-bound and may run for tens of seconds, so it executes
//! on a blocking thread, never on the request path. Each solve is a job
//! with a stop signal; callers whose session data changes mid-solve are
//! expected to stop and restart rather than race two solves for the same
//! session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bunkplan_config::SolverSettings;
use bunkplan_core::{HardSoftScore, SessionId};
use bunkplan_scoring::SessionRoster;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::solve::{SolveError, SolveResult, Solver};

/// Status of a solving job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    NotSolving,
    Solving,
}

/// A solving job that can be queried for current state.
#[derive(Debug)]
pub struct SolveJob {
    pub id: String,
    pub session: SessionId,
    pub status: SolverStatus,
    /// Best score found so far, updated while the solve runs.
    pub best_score: Option<HardSoftScore>,
    /// Final result, present once the job finishes.
    pub result: Option<SolveResult>,
    stop_flag: Arc<AtomicBool>,
}

impl SolveJob {
    fn new(id: String, session: SessionId) -> Self {
        Self {
            id,
            session,
            status: SolverStatus::Solving,
            best_score: None,
            result: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Manages solving jobs.
#[derive(Debug, Default)]
pub struct SolverService {
    jobs: RwLock<HashMap<String, Arc<RwLock<SolveJob>>>>,
}

impl SolverService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts solving a roster in the background.
    ///
    /// Validates the settings up front and returns the job id. Must be
    /// called from within a tokio runtime.
    pub fn start(
        &self,
        roster: SessionRoster,
        settings: SolverSettings,
    ) -> Result<String, SolveError> {
        let solver = Solver::new(settings)?;
        let id = Uuid::new_v4().to_string();
        let session = roster.session().id;

        let job = Arc::new(RwLock::new(SolveJob::new(id.clone(), session)));
        self.jobs.write().insert(id.clone(), job.clone());

        info!(event = "solve_job_started", job = %id, session = %session);

        let stop_flag = job.read().stop_flag.clone();
        tokio::task::spawn_blocking(move || {
            let observer_job = job.clone();
            let observer = move |score: HardSoftScore| {
                observer_job.write().best_score = Some(score);
            };

            let result = solver.solve_with_stop(&roster, Some(&stop_flag), Some(&observer));

            let mut guard = job.write();
            guard.best_score = Some(result.solution.score);
            guard.result = Some(result);
            guard.status = SolverStatus::NotSolving;
        });

        Ok(id)
    }

    /// Gets a job by id.
    pub fn get_job(&self, id: &str) -> Option<Arc<RwLock<SolveJob>>> {
        self.jobs.read().get(id).cloned()
    }

    /// Lists all job ids.
    pub fn list_jobs(&self) -> Vec<String> {
        self.jobs.read().keys().cloned().collect()
    }

    /// Signals a running job to stop at its next step.
    ///
    /// Returns false for unknown or already finished jobs. The job keeps
    /// its best-found result.
    pub fn stop(&self, id: &str) -> bool {
        if let Some(job) = self.get_job(id) {
            let guard = job.read();
            if guard.status == SolverStatus::Solving {
                guard.stop_flag.store(true, Ordering::SeqCst);
                info!(event = "solve_job_stop_requested", job = %id);
                return true;
            }
        }
        false
    }

    /// Removes a job, returning it if present.
    pub fn remove_job(&self, id: &str) -> Option<Arc<RwLock<SolveJob>>> {
        self.jobs.write().remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::Gender;
    use bunkplan_test::{bunk, bunk_with, camper, session};
    use std::time::Duration;

    fn roster() -> SessionRoster {
        SessionRoster::new(
            session(1, 2026),
            vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 4, Gender::Female, "9.02"),
            ],
            vec![bunk(10, 8, Some(Gender::Female), false)],
            vec![bunk_with(1, 1, 2, 5), bunk_with(2, 2, 1, 5)],
        )
    }

    async fn wait_for_result(job: &Arc<RwLock<SolveJob>>) {
        for _ in 0..500 {
            if job.read().status == SolverStatus::NotSolving {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("solve job did not finish in time");
    }

    #[tokio::test]
    async fn job_runs_to_completion() {
        let service = SolverService::new();
        let mut settings = SolverSettings::default();
        settings.solver.step_limit = Some(1_000);

        let id = service.start(roster(), settings).unwrap();
        let job = service.get_job(&id).unwrap();
        wait_for_result(&job).await;

        let guard = job.read();
        let result = guard.result.as_ref().unwrap();
        assert!(result.feasible());
        assert_eq!(guard.best_score, Some(result.solution.score));
    }

    #[tokio::test]
    async fn invalid_settings_fail_before_spawning() {
        let service = SolverService::new();
        let settings = SolverSettings::default().with_multipliers(1, 2, 3);
        assert!(service.start(roster(), settings).is_err());
        assert!(service.list_jobs().is_empty());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_scoped() {
        let service = SolverService::new();
        assert!(!service.stop("no-such-job"));

        let mut settings = SolverSettings::default();
        settings.solver.step_limit = Some(100);
        let id = service.start(roster(), settings).unwrap();
        let job = service.get_job(&id).unwrap();
        wait_for_result(&job).await;

        // Finished jobs refuse the stop signal.
        assert!(!service.stop(&id));
    }
}
