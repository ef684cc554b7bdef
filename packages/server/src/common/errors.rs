use thiserror::Error;

/// Core error taxonomy for lifecycle and matching operations.
///
/// Every variant is a distinct caller contract: `Validation` means fix the
/// input, `InvalidState` means the transition is not legal from the current
/// status, `DependencyUnavailable` means retry later. None of the rejection
/// variants mutate state.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("receiver already has a pending claim request on this listing")]
    DuplicatePending,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl CoreError {
    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::DependencyUnavailable(_))
    }
}
