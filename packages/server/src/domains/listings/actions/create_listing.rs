use tracing::{info, instrument, warn};

use crate::common::{Actor, CoreError};
use crate::domains::gamification::Award;
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::models::{CreateListingInput, Listing};
use crate::domains::matching::actions::find_matches::find_matches_for;
use crate::domains::matching::MatchReport;
use crate::domains::notifications::{Notification, NotificationKind, Priority};
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// The created listing plus everything the creation flow produced.
#[derive(Debug, Clone)]
pub struct CreateListingOutcome {
    pub listing: Listing,
    pub award: Award,
    pub matches: MatchReport,
}

/// Creates a listing: validates, stores, registers it for geospatial
/// lookup, records the donor's gamification award, and runs the initial
/// match pass, notifying the top-ranked candidates.
#[instrument(skip(deps, input), fields(donor_id = %actor.user_id))]
pub async fn create_listing(
    deps: &ServerDeps,
    actor: Actor,
    input: CreateListingInput,
) -> Result<CreateListingOutcome, CoreError> {
    let now = chrono::Utc::now();
    let listing = Listing::create(actor.user_id, input, now)?;

    let stored = bounded(
        deps.config.dependency_timeout,
        "insert listing",
        deps.listings.insert(listing),
    )
    .await??;
    let listing = stored.record;

    deps.listing_index.insert(listing.pin()).await;

    let award = deps
        .ledger
        .record_donation(
            listing.donor_id,
            &listing.food_category.to_string(),
            listing.quantity,
            listing.estimated_co2_reduction_kg,
            listing.is_disaster_relief,
        )
        .await;

    if !award.new_badges.is_empty() {
        deps.notify(Notification::new(
            listing.donor_id,
            NotificationKind::PointsEarned,
            "Points Earned!",
            format!(
                "You earned {} points and {} new badge(s) for this donation.",
                award.points_earned,
                award.new_badges.len()
            ),
            Some(listing.id),
            Priority::Low,
        ))
        .await;
    }

    // The match pass is a read; a flaky index must not fail creation.
    let matches = match find_matches_for(deps, &listing).await {
        Ok(report) => report,
        Err(error) if error.is_retryable() => {
            warn!(%error, "initial match pass degraded, returning no candidates");
            MatchReport {
                matches: Vec::new(),
                fallback_routes: Default::default(),
                recommended: None,
            }
        }
        Err(error) => return Err(error),
    };

    for scored in matches.matches.iter().take(deps.config.match_notify_limit) {
        deps.notify(Notification::new(
            scored.candidate.id,
            NotificationKind::MatchFound,
            "New Food Listing Near You!",
            format!(
                "A donor nearby listed {} {} of {}.",
                listing.quantity, listing.unit, listing.title
            ),
            Some(listing.id),
            Priority::High,
        ))
        .await;
    }

    deps.bus.publish(ListingEvent::ListingCreated {
        listing_id: listing.id,
        donor_id: listing.donor_id,
        match_count: matches.matches.len(),
    });

    info!(
        listing_id = %listing.id,
        candidates = matches.matches.len(),
        points = award.points_earned,
        "listing created"
    );

    Ok(CreateListingOutcome {
        listing,
        award,
        matches,
    })
}
