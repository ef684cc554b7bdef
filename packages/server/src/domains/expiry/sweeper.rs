//! Periodic expiry enforcement.
//!
//! One sweep selects every listing past its expiry that is still
//! claimable and drives it through the fallback path. Listings are
//! processed independently: an error on one is logged and left for the
//! next interval (its status is unchanged on error, so it stays
//! eligible). Running a sweep twice is a no-op the second time — the
//! selection predicate excludes everything already routed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::common::CoreError;
use crate::domains::listings::events::ListingEvent;
use crate::domains::matching::fallback;
use crate::domains::notifications::{Notification, NotificationKind, Priority};
use crate::kernel::store::Versioned;
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// Counts from one sweep execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Listings successfully routed to fallback.
    pub processed: usize,
    /// Listings that errored and will be retried next interval.
    pub failed: usize,
}

pub struct ExpirySweeper {
    deps: ServerDeps,
    /// Held for the duration of a sweep so shutdown can wait for
    /// in-flight processing instead of hard-cancelling it.
    run_guard: Arc<Mutex<()>>,
}

impl ExpirySweeper {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            deps,
            run_guard: Arc::new(Mutex::new(())),
        }
    }

    /// Runs one sweep at the current time.
    ///
    /// Never fails outward: dependency errors are logged and the affected
    /// listings retried next interval.
    pub async fn run(&self) -> SweepReport {
        self.run_at(Utc::now()).await
    }

    /// Runs one sweep against an explicit clock (tests, admin force-sweep).
    #[instrument(skip(self))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> SweepReport {
        let _running = self.run_guard.lock().await;

        let expired = match bounded(
            self.deps.config.dependency_timeout,
            "expired listing scan",
            self.deps.listings.find_expired(now),
        )
        .await
        {
            Ok(Ok(expired)) => expired,
            Ok(Err(error)) => {
                warn!(%error, "expired listing scan failed, retrying next interval");
                return SweepReport::default();
            }
            Err(error) => {
                warn!(%error, "expired listing scan timed out, retrying next interval");
                return SweepReport::default();
            }
        };

        if expired.is_empty() {
            debug!("no expired listings");
            return SweepReport::default();
        }
        info!(count = expired.len(), "processing expired listings");

        let mut report = SweepReport::default();
        for versioned in expired {
            let listing_id = versioned.record.id;
            match self.process_listing(versioned, now).await {
                Ok(()) => report.processed += 1,
                Err(CoreError::InvalidState(reason)) => {
                    // Lost a race against an approval; no longer eligible.
                    debug!(listing_id = %listing_id, reason = %reason, "skipping listing");
                }
                Err(error) => {
                    report.failed += 1;
                    warn!(listing_id = %listing_id, %error, "failed to process expired listing");
                }
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            "sweep complete"
        );
        report
    }

    /// Waits for any in-flight sweep to finish (shutdown path).
    pub async fn wait_idle(&self) {
        let _ = self.run_guard.lock().await;
    }

    async fn process_listing(
        &self,
        versioned: Versioned<crate::domains::listings::models::Listing>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let deps = &self.deps;
        let origin = versioned.record.location.point;
        let title = versioned.record.title.clone();
        let donor_id = versioned.record.donor_id;

        // Pick the target first; the routing decision needs no lock on
        // the listing (location is immutable).
        let routes = bounded(
            deps.config.dependency_timeout,
            "facility query",
            fallback::find_fallback_routes(
                deps.facilities.as_ref(),
                origin,
                deps.config.fallback_radius_km,
                deps.config.fallback_candidate_limit,
            ),
        )
        .await??;
        let (route, facility) = routes.select();

        let mut listing = versioned.record;
        let rejected = listing.route_to_fallback(route, now)?;
        let listing_id = listing.id;

        // Single conditional write; an approval landing between the scan
        // and here wins the race and this returns InvalidState upstream.
        match bounded(
            deps.config.dependency_timeout,
            "commit fallback transition",
            deps.listings.update(listing, versioned.version),
        )
        .await?
        {
            Ok(_) => {}
            Err(err) => return Err(err.into()),
        }

        deps.notify(Notification::new(
            donor_id,
            NotificationKind::ListingExpired,
            "Listing Expired - Routed to Fallback",
            format!(
                "Your listing \"{}\" has expired and has been automatically routed to {}.",
                title, route
            ),
            Some(listing_id),
            Priority::Medium,
        ))
        .await;

        futures::future::join_all(rejected.iter().map(|receiver_id| {
            deps.notify(Notification::new(
                *receiver_id,
                NotificationKind::ListingExpired,
                "Listing Expired",
                format!(
                    "The listing \"{}\" you requested has expired and was routed to fallback.",
                    title
                ),
                Some(listing_id),
                Priority::Low,
            ))
        }))
        .await;

        deps.bus.publish(ListingEvent::ListingExpired {
            listing_id,
            fallback_route: route,
            rejected_receivers: rejected,
        });

        info!(
            listing_id = %listing_id,
            route = %route,
            facility = facility.map(|f| f.name.as_str()).unwrap_or("-"),
            "expired listing routed"
        );
        Ok(())
    }
}
