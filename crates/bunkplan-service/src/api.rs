//! HTTP handlers and router.
//!
//! Writing solved assignments back to the camp-management system is the
//! sync pipeline's job; the solve endpoints here return the solution to
//! the caller and leave the record store untouched.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router};
use bunkplan_config::SolverSettings;
use bunkplan_core::{
    Bunk, BunkId, Camper, CamperId, HardSoftScore, Request, Session, SessionId,
};
use bunkplan_graph::{AffectedEdge, GraphKey};
use bunkplan_scoring::SessionRoster;
use bunkplan_solver::{SolveResult, SolverStatus};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::{AppState, StoredRoster};

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sessions/{id}/roster", put(upload_roster))
        .route("/sessions/{id}/solve", post(start_solve))
        .route("/sessions/{id}/moves", post(apply_move))
        .route(
            "/solve-jobs/{id}",
            axum::routing::get(job_status).delete(stop_job),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Roster upload payload: one session's worth of record-store data.
#[derive(Debug, Deserialize)]
pub struct RosterUpload {
    pub session: Session,
    pub campers: Vec<Camper>,
    pub bunks: Vec<Bunk>,
    pub requests: Vec<Request>,
    /// Current camper→bunk assignment, if one exists.
    #[serde(default)]
    pub mapping: HashMap<CamperId, BunkId>,
}

#[derive(Debug, Serialize)]
pub struct RosterSummary {
    pub session: SessionId,
    pub campers: usize,
    pub bunks: usize,
    pub requests: usize,
}

async fn upload_roster(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<u64>,
    Json(upload): Json<RosterUpload>,
) -> Result<Json<RosterSummary>, ApiError> {
    let session_id = validated_id(session_id, "session id")?;
    if upload.session.id != SessionId(session_id) {
        return Err(ApiError::Validation(format!(
            "path names session {} but payload names {}",
            session_id, upload.session.id
        )));
    }

    let summary = RosterSummary {
        session: upload.session.id,
        campers: upload.campers.len(),
        bunks: upload.bunks.len(),
        requests: upload.requests.len(),
    };
    state.put_roster(StoredRoster {
        session: upload.session,
        campers: upload.campers,
        bunks: upload.bunks,
        requests: upload.requests,
        mapping: upload.mapping,
    });
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
pub struct SolveStarted {
    pub job_id: String,
}

async fn start_solve(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<u64>,
    settings: Option<Json<SolverSettings>>,
) -> Result<Json<SolveStarted>, ApiError> {
    let session_id = SessionId(validated_id(session_id, "session id")?);
    let stored = state
        .roster(session_id)
        .ok_or_else(|| ApiError::Domain(format!("no roster uploaded for {session_id}")))?;

    let roster = SessionRoster::new(
        stored.session,
        stored.campers,
        stored.bunks,
        stored.requests,
    );
    let settings = settings
        .map(|Json(s)| s)
        .unwrap_or_else(|| state.settings().clone());

    let job_id = state.solver().start(roster, settings)?;
    Ok(Json(SolveStarted { job_id }))
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub session: SessionId,
    pub status: SolverStatus,
    pub best_score: Option<HardSoftScore>,
    pub result: Option<SolveResult>,
}

async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state
        .solver()
        .get_job(&job_id)
        .ok_or_else(|| ApiError::Domain(format!("no solve job {job_id}")))?;
    let guard = job.read();
    Ok(Json(JobStatusResponse {
        id: guard.id.clone(),
        session: guard.session,
        status: guard.status,
        best_score: guard.best_score,
        result: guard.result.clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub stopped: bool,
}

async fn stop_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<StopResponse>, ApiError> {
    if state.solver().get_job(&job_id).is_none() {
        return Err(ApiError::Domain(format!("no solve job {job_id}")));
    }
    let stopped = state.solver().stop(&job_id);
    Ok(Json(StopResponse { stopped }))
}

/// Move payload: identifiers only, never free text.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub camper_id: u64,
    pub bunk_id: u64,
    pub year: u16,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub camper: CamperId,
    pub old_bunk: Option<BunkId>,
    pub new_bunk: BunkId,
    pub affected_edges: Vec<AffectedEdge>,
    /// Cache entry version after the move.
    pub version: u64,
    /// True when the graph was rebuilt (cache miss) during this call.
    pub cache_rebuilt: bool,
}

async fn apply_move(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<u64>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let session_id = SessionId(validated_id(session_id, "session id")?);
    let camper = CamperId(validated_id(request.camper_id, "camper_id")?);
    let bunk = BunkId(validated_id(request.bunk_id, "bunk_id")?);
    if request.year == 0 {
        return Err(ApiError::Validation("year must be positive".to_string()));
    }

    let key = GraphKey::new(session_id, request.year);
    let outcome = state
        .mover()
        .apply_move(state.as_ref(), key, camper, bunk)?;
    state.record_move(session_id, camper, bunk);

    Ok(Json(MoveResponse {
        camper: outcome.person,
        old_bunk: outcome.old_bunk,
        new_bunk: outcome.new_bunk,
        affected_edges: outcome.affected_edges,
        version: outcome.version,
        cache_rebuilt: outcome.rebuilt,
    }))
}

/// Identifiers are opaque positive integers; zero is malformed.
fn validated_id(raw: u64, field: &str) -> Result<u64, ApiError> {
    if raw == 0 {
        return Err(ApiError::Validation(format!("{field} must be positive")));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunkplan_core::Gender;
    use bunkplan_test::{bunk, bunk_with, camper, session};

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(SolverSettings::default()))
    }

    fn upload_payload() -> RosterUpload {
        RosterUpload {
            session: session(1, 2026),
            campers: vec![
                camper(1, 4, Gender::Female, "9.00"),
                camper(2, 4, Gender::Female, "9.02"),
            ],
            bunks: vec![bunk(10, 8, None, false), bunk(11, 8, None, false)],
            requests: vec![bunk_with(1, 1, 2, 5)],
            mapping: [(CamperId(1), BunkId(10)), (CamperId(2), BunkId(11))].into(),
        }
    }

    #[tokio::test]
    async fn upload_then_move_returns_the_diff() {
        let state = state();
        upload_roster(State(state.clone()), Path(1), Json(upload_payload()))
            .await
            .unwrap();

        let response = apply_move(
            State(state.clone()),
            Path(1),
            Json(MoveRequest {
                camper_id: 2,
                bunk_id: 10,
                year: 2026,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.camper, CamperId(2));
        assert_eq!(response.0.old_bunk, Some(BunkId(11)));
        assert_eq!(response.0.new_bunk, BunkId(10));
        assert!(response.0.cache_rebuilt);
        assert_eq!(response.0.affected_edges.len(), 1);
        assert!(response.0.affected_edges[0].satisfied);

        // The stored mapping followed the move.
        assert_eq!(
            state.roster(SessionId(1)).unwrap().mapping[&CamperId(2)],
            BunkId(10)
        );
    }

    #[tokio::test]
    async fn second_move_hits_the_cache() {
        let state = state();
        upload_roster(State(state.clone()), Path(1), Json(upload_payload()))
            .await
            .unwrap();

        let request = |bunk_id| {
            Json(MoveRequest {
                camper_id: 2,
                bunk_id,
                year: 2026,
            })
        };
        let first = apply_move(State(state.clone()), Path(1), request(10))
            .await
            .unwrap();
        let second = apply_move(State(state.clone()), Path(1), request(11))
            .await
            .unwrap();
        assert!(first.0.cache_rebuilt);
        assert!(!second.0.cache_rebuilt);
        assert_eq!(second.0.version, first.0.version + 1);
    }

    #[tokio::test]
    async fn zero_ids_are_validation_errors() {
        let state = state();
        let err = apply_move(
            State(state),
            Path(1),
            Json(MoveRequest {
                camper_id: 0,
                bunk_id: 10,
                year: 2026,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_person_is_a_domain_error() {
        let state = state();
        upload_roster(State(state.clone()), Path(1), Json(upload_payload()))
            .await
            .unwrap();

        let err = apply_move(
            State(state),
            Path(1),
            Json(MoveRequest {
                camper_id: 99,
                bunk_id: 10,
                year: 2026,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
    }

    #[tokio::test]
    async fn solve_needs_an_uploaded_roster() {
        let state = state();
        let err = start_solve(State(state.clone()), Path(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
    }

    #[tokio::test]
    async fn solve_round_trip() {
        let state = state();
        upload_roster(State(state.clone()), Path(1), Json(upload_payload()))
            .await
            .unwrap();

        let mut settings = SolverSettings::default();
        settings.solver.step_limit = Some(1_000);
        let started = start_solve(State(state.clone()), Path(1), Some(Json(settings)))
            .await
            .unwrap();

        // Poll until the background job finishes.
        let job_id = started.0.job_id.clone();
        for _ in 0..500 {
            let status = job_status(State(state.clone()), Path(job_id.clone()))
                .await
                .unwrap();
            if status.0.status == SolverStatus::NotSolving {
                let result = status.0.result.unwrap();
                assert!(result.feasible());
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("solve job did not finish");
    }

    #[tokio::test]
    async fn stopping_an_unknown_job_is_a_domain_error() {
        let state = state();
        let err = stop_job(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(_)));
    }

    #[tokio::test]
    async fn upload_rejects_mismatched_session_id() {
        let state = state();
        let err = upload_roster(State(state), Path(2), Json(upload_payload()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
