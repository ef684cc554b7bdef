//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The expiry sweep runs once immediately at process start and then on a
//! fixed interval. The scheduler handle is returned so the host can stop
//! new runs at shutdown; in-flight processing is awaited via
//! [`ExpirySweeper::wait_idle`] rather than cancelled, so no listing is
//! left mid-transition.

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::domains::expiry::ExpirySweeper;

/// Start all scheduled tasks.
pub async fn start_scheduler(
    sweeper: Arc<ExpirySweeper>,
    interval: std::time::Duration,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Immediate run at startup
    {
        let sweeper = sweeper.clone();
        tokio::spawn(async move {
            let report = sweeper.run().await;
            info!(processed = report.processed, "startup sweep complete");
        });
    }

    let sweep_job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let sweeper = sweeper.clone();
        Box::pin(async move {
            sweeper.run().await;
        })
    })?;
    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    info!(interval_secs = interval.as_secs(), "expiry sweep scheduled");
    Ok(scheduler)
}
