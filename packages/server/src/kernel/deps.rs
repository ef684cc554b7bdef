//! Dependency bundle handed to every action.

use std::sync::Arc;

use crate::config::Config;
use crate::domains::gamification::GamificationLedger;
use crate::domains::listings::models::ListingPin;
use crate::domains::notifications::{Notification, NotificationSink};
use crate::kernel::directory::{FacilityDirectory, ReceiverDirectory};
use crate::kernel::event_bus::EventBus;
use crate::kernel::geo_index::GeoIndex;
use crate::kernel::store::ListingStore;

/// Everything the action layer needs. Cloneable; all members are shared
/// handles.
#[derive(Clone)]
pub struct ServerDeps {
    pub config: Config,
    pub listings: Arc<dyn ListingStore>,
    /// Spatial registry of listings for nearby queries.
    pub listing_index: Arc<GeoIndex<ListingPin>>,
    pub receivers: Arc<dyn ReceiverDirectory>,
    pub facilities: Arc<dyn FacilityDirectory>,
    pub ledger: Arc<GamificationLedger>,
    pub notifier: Arc<dyn NotificationSink>,
    pub bus: EventBus,
}

impl ServerDeps {
    /// Best-effort notification delivery: the transition has already
    /// committed, so a failing delivery backend is logged, never unwound.
    pub async fn notify(&self, notification: Notification) {
        if let Err(error) = self.notifier.deliver(notification).await {
            tracing::warn!(%error, "notification delivery failed");
        }
    }
}
