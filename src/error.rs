//! Error types
//!
//! "Not found" is never an error here: lookups return `Option`/empty `Vec`.
//! Only worker-fatal failures cross the async boundary.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlossError {
    /// The matching worker died; reported once to every pending request
    #[error("Matching worker failed: {0}")]
    WorkerFailed(String),

    /// Submit after the worker failed or was shut down
    #[error("Matching worker is unavailable")]
    WorkerUnavailable,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Undecodable payload at the JS boundary
    #[error("Protocol error: {0}")]
    Protocol(String),
}
