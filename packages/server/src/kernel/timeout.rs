//! Bounded timeouts for dependency calls.
//!
//! Geospatial queries and store reads/writes are the engine's only
//! suspension points; each one runs under the configured deadline and maps
//! elapse to the retryable `DependencyUnavailable` error.

use std::future::Future;
use std::time::Duration;

use crate::common::CoreError;

/// Runs `fut` with a deadline; on elapse returns `DependencyUnavailable`
/// naming the operation.
pub async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    fut: impl Future<Output = T>,
) -> Result<T, CoreError> {
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        CoreError::DependencyUnavailable(format!("{operation} timed out after {limit:?}"))
    })
}
