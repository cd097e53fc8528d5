//! Bunkplan Service - HTTP API for the assignment engine
//!
//! Exposes roster upload, background solves and single-camper moves over
//! an Axum router. The service holds the shared graph cache and solver
//! job registry; everything else is payload in, payload out.

pub mod api;
pub mod error;
pub mod state;

pub use api::router;
pub use error::ApiError;
pub use state::AppState;
