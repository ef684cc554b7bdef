//! Shared fixture for the integration suites: an engine wired entirely to
//! in-memory collaborators, seeded around Mumbai.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use server_core::common::{Actor, GeoPoint, Location, UserId};
use server_core::domains::expiry::ExpirySweeper;
use server_core::domains::gamification::GamificationLedger;
use server_core::domains::listings::models::{
    CreateListingInput, FoodCategory, Listing, ListingPin, Unit,
};
use server_core::domains::matching::models::{Facility, FacilityKind, ReceiverCandidate, Role};
use server_core::domains::notifications::RecordingSink;
use server_core::kernel::directory::{InMemoryFacilityDirectory, InMemoryReceiverDirectory};
use server_core::kernel::geo_index::GeoIndex;
use server_core::kernel::{EventBus, InMemoryListingStore, ServerDeps};
use server_core::Config;

/// The listing origin used across the suites.
pub fn mumbai() -> GeoPoint {
    GeoPoint::new(72.8777, 19.0760)
}

/// A point roughly `km` kilometers north of `origin`.
pub fn km_north(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.longitude, origin.latitude + km / 110.574)
}

pub struct TestEnv {
    pub deps: ServerDeps,
    pub store: Arc<InMemoryListingStore>,
    pub receivers: Arc<InMemoryReceiverDirectory>,
    pub facilities: Arc<InMemoryFacilityDirectory>,
    pub ledger: Arc<GamificationLedger>,
    pub notifier: Arc<RecordingSink>,
}

impl TestEnv {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryListingStore::new());
        let receivers = Arc::new(InMemoryReceiverDirectory::new());
        let facilities = Arc::new(InMemoryFacilityDirectory::new());
        let ledger = Arc::new(GamificationLedger::new());
        let notifier = Arc::new(RecordingSink::new());
        let listing_index: Arc<GeoIndex<ListingPin>> = Arc::new(GeoIndex::new());
        listing_index.rebuild().await;

        let deps = ServerDeps {
            config: Config::default(),
            listings: store.clone(),
            listing_index,
            receivers: receivers.clone(),
            facilities: facilities.clone(),
            ledger: ledger.clone(),
            notifier: notifier.clone(),
            bus: EventBus::new(),
        };

        Self {
            deps,
            store,
            receivers,
            facilities,
            ledger,
            notifier,
        }
    }

    pub fn sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::new(self.deps.clone())
    }

    pub async fn seed_receiver(&self, role: Role, at: GeoPoint) -> UserId {
        let receiver = ReceiverCandidate {
            id: UserId::new(),
            name: format!("{role} receiver"),
            role,
            is_verified: true,
            is_active: true,
            location: at,
            disaster_mode_enabled: false,
        };
        let id = receiver.id;
        self.receivers.upsert(receiver).await;
        self.receivers.build_index().await;
        id
    }

    pub async fn seed_facility(&self, kind: FacilityKind, at: GeoPoint) -> Facility {
        let facility = Facility::new(format!("{kind} facility"), kind, at);
        self.facilities.insert(facility.clone()).await;
        self.facilities.build_index().await;
        facility
    }

    /// Creates an active listing at Mumbai expiring `expires_in` from now.
    pub async fn seed_listing(&self, donor: Actor, expires_in: Duration) -> Listing {
        let outcome = server_core::domains::listings::create_listing(
            &self.deps,
            donor,
            listing_input(Utc::now() + expires_in),
        )
        .await
        .expect("listing creation should succeed");
        outcome.listing
    }
}

pub fn listing_input(expiry_time: DateTime<Utc>) -> CreateListingInput {
    CreateListingInput::builder()
        .title("Canteen surplus".to_string())
        .description("Veg meals from the office canteen".to_string())
        .food_category(FoodCategory::Cooked)
        .quantity(8.0)
        .unit(Unit::Kg)
        .expiry_time(expiry_time)
        .location(Location::new(mumbai(), "Mumbai", "Maharashtra"))
        .build()
}
