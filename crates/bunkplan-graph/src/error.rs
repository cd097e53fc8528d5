//! Error types for graph operations.
//!
//! These are domain errors: the input was well-formed, but the referenced
//! entity is not in the expected state. They are scoped to one
//! `(session, year)` key and never poison other sessions' cache entries.

use bunkplan_core::{BunkId, CamperId};
use thiserror::Error;

use crate::graph::GraphKey;

/// Error raised by graph lookups and move application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The person has no node in the graph; a caller error, not an
    /// infeasibility.
    #[error("{person} is not in the graph for {key}")]
    PersonNotInGraph { person: CamperId, key: GraphKey },

    /// The target bunk has no node in the graph.
    #[error("{bunk} is not in the graph for {key}")]
    BunkNotInGraph { bunk: BunkId, key: GraphKey },

    /// No cached graph and no roster data to build one from.
    #[error("no roster data for {key}")]
    UnknownSession { key: GraphKey },
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
