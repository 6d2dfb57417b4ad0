//! Error type for the fallible edges of the planner.
//!
//! The timeline computation itself never fails; these errors come from
//! loading snapshots and from the ordering checks.

use thiserror::Error;

/// Planner errors.
#[derive(Error, Debug)]
pub enum PlanError {
    /// Snapshot or configuration JSON could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Snapshot file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Department roles form a dependency cycle.
    #[error("circular department dependency involving '{0}'")]
    CyclicDependency(String),
    /// A department was computed before its upstream departments.
    #[error("department '{dept}' computed before upstream {missing:?}")]
    StaleUpstream {
        /// Department being computed.
        dept: String,
        /// Upstream departments missing from the precomputed map.
        missing: Vec<String>,
    },
    /// A department name is not part of the configuration.
    #[error("unknown department '{0}'")]
    UnknownDepartment(String),
}

/// Result alias used by the crate's fallible APIs.
pub type Result<T> = std::result::Result<T, PlanError>;
