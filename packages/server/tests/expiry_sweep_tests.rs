//! Expiry sweep behavior: time-based transitions, idempotence, and
//! per-listing failure isolation.

mod common;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use common::{km_north, mumbai, TestEnv};
use server_core::common::{Actor, CoreError, GeoPoint, UserId};
use server_core::domains::listings::models::{
    ClaimRequestStatus, FallbackRoute, ListingStatus,
};
use server_core::domains::listings::submit_claim;
use server_core::domains::matching::models::{Facility, FacilityKind};
use server_core::domains::notifications::NotificationKind;
use server_core::kernel::directory::FacilityDirectory;
use server_core::kernel::ListingStore;

#[tokio::test]
async fn sweep_ignores_unexpired_listings_and_routes_expired_ones() {
    let env = TestEnv::new().await;
    env.seed_facility(FacilityKind::CommunityFridge, km_north(mumbai(), 5.0))
        .await;

    let donor = Actor::user(UserId::new());
    let listing = env.seed_listing(donor, Duration::hours(1)).await;
    let sweeper = env.sweeper();

    // before expiry: untouched
    let report = sweeper.run_at(Utc::now()).await;
    assert_eq!(report.processed, 0);
    let stored = env.store.get(listing.id).await.unwrap();
    assert_eq!(stored.record.status, ListingStatus::Active);

    // simulated clock advance past expiry
    let later = Utc::now() + Duration::hours(2);
    let report = sweeper.run_at(later).await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);

    let stored = env.store.get(listing.id).await.unwrap();
    assert_eq!(stored.record.status, ListingStatus::Fallback);
    // nearest active facility within 15 km is the fridge
    assert_eq!(stored.record.fallback_route, FallbackRoute::CommunityFridge);
}

#[tokio::test]
async fn no_facility_in_range_still_expires_with_route_none() {
    let env = TestEnv::new().await;
    let donor = Actor::user(UserId::new());
    let listing = env.seed_listing(donor, Duration::minutes(30)).await;

    let report = env.sweeper().run_at(Utc::now() + Duration::hours(1)).await;
    assert_eq!(report.processed, 1);

    let stored = env.store.get(listing.id).await.unwrap();
    assert_eq!(stored.record.status, ListingStatus::Fallback);
    assert_eq!(stored.record.fallback_route, FallbackRoute::None);
}

#[tokio::test]
async fn second_sweep_is_a_noop() {
    let env = TestEnv::new().await;
    let donor = Actor::user(UserId::new());
    env.seed_listing(donor, Duration::minutes(30)).await;
    env.seed_listing(donor, Duration::minutes(40)).await;

    let sweeper = env.sweeper();
    let later = Utc::now() + Duration::hours(1);
    assert_eq!(sweeper.run_at(later).await.processed, 2);
    // idempotent: everything already routed is no longer selected
    assert_eq!(sweeper.run_at(later).await.processed, 0);
}

#[tokio::test]
async fn sweep_rejects_pending_claims_and_notifies_everyone() {
    let env = TestEnv::new().await;
    env.seed_facility(FacilityKind::AnimalFarm, km_north(mumbai(), 4.0))
        .await;

    let donor = Actor::user(UserId::new());
    let listing = env.seed_listing(donor, Duration::hours(1)).await;

    let r1 = UserId::new();
    let r2 = UserId::new();
    submit_claim(&env.deps, listing.id, Actor::user(r1), None)
        .await
        .unwrap();
    submit_claim(&env.deps, listing.id, Actor::user(r2), None)
        .await
        .unwrap();

    let report = env.sweeper().run_at(Utc::now() + Duration::hours(2)).await;
    assert_eq!(report.processed, 1);

    let stored = env.store.get(listing.id).await.unwrap();
    assert_eq!(stored.record.status, ListingStatus::Fallback);
    assert_eq!(stored.record.fallback_route, FallbackRoute::AnimalFarm);
    assert!(stored
        .record
        .claim_requests
        .iter()
        .all(|r| r.status == ClaimRequestStatus::Rejected));

    // one expiry notification to the donor, one to each rejected receiver
    let donor_notes = env.notifier.delivered_to(donor.user_id).await;
    assert_eq!(
        donor_notes
            .iter()
            .filter(|n| n.kind == NotificationKind::ListingExpired)
            .count(),
        1
    );
    for receiver in [r1, r2] {
        let notes = env.notifier.delivered_to(receiver).await;
        assert_eq!(
            notes
                .iter()
                .filter(|n| n.kind == NotificationKind::ListingExpired)
                .count(),
            1
        );
    }
}

/// Facility directory that fails for listings near a poisoned origin.
struct FlakyFacilities {
    inner: std::sync::Arc<dyn FacilityDirectory>,
    fail_near: GeoPoint,
}

#[async_trait]
impl FacilityDirectory for FlakyFacilities {
    async fn nearest_active(
        &self,
        origin: GeoPoint,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<(Facility, f64)>, CoreError> {
        if origin.distance_km(&self.fail_near) < 0.5 {
            return Err(CoreError::DependencyUnavailable(
                "facility registry unreachable".to_string(),
            ));
        }
        self.inner
            .nearest_active(origin, max_distance_km, limit)
            .await
    }
}

#[tokio::test]
async fn a_failing_listing_does_not_abort_the_sweep() {
    let env = TestEnv::new().await;
    let donor = Actor::user(UserId::new());

    // healthy listing at Mumbai
    let healthy = env.seed_listing(donor, Duration::minutes(30)).await;

    // poisoned listing a few km away
    let poisoned_origin = km_north(mumbai(), 5.0);
    let input = server_core::domains::listings::models::CreateListingInput::builder()
        .title("Event leftovers".to_string())
        .description("Snack boxes".to_string())
        .food_category(server_core::domains::listings::models::FoodCategory::Packaged)
        .quantity(3.0)
        .expiry_time(Utc::now() + Duration::minutes(30))
        .location(server_core::common::Location::new(
            poisoned_origin,
            "Mumbai",
            "Maharashtra",
        ))
        .build();
    let poisoned = server_core::domains::listings::create_listing(&env.deps, donor, input)
        .await
        .unwrap()
        .listing;

    let mut deps = env.deps.clone();
    deps.facilities = std::sync::Arc::new(FlakyFacilities {
        inner: env.facilities.clone(),
        fail_near: poisoned_origin,
    });
    let sweeper = server_core::domains::expiry::ExpirySweeper::new(deps);

    let later = Utc::now() + Duration::hours(1);
    let report = sweeper.run_at(later).await;
    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 1);

    // the healthy listing transitioned, the failing one stays eligible
    assert_eq!(
        env.store.get(healthy.id).await.unwrap().record.status,
        ListingStatus::Fallback
    );
    assert_eq!(
        env.store.get(poisoned.id).await.unwrap().record.status,
        ListingStatus::Active
    );

    // next interval retries it (and fails again with the same backend)
    let retry = sweeper.run_at(later).await;
    assert_eq!(retry.processed, 0);
    assert_eq!(retry.failed, 1);
}
