//! Error types for the duplicate-detection core

use thiserror::Error;

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Error types for the duplicate-detection core
#[derive(Error, Debug)]
pub enum DetectorError {
    /// Raised at construction when the supplied configuration is unusable
    /// (negative weight, or a threshold outside `[0.0, 1.0]`).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The job list for the parallel execution path could not be sized.
    /// Reachable in principle from a pathologically large
    /// `max_comparisons`/`max_candidates_per_person` combination.
    #[error("failed to allocate job queue: {0}")]
    JobQueueAllocation(String),
}

impl DetectorError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        DetectorError::InvalidConfiguration(msg.into())
    }

    pub fn job_queue_allocation(msg: impl Into<String>) -> Self {
        DetectorError::JobQueueAllocation(msg.into())
    }
}
