use tracing::{info, instrument};

use crate::common::{Actor, CoreError, ListingId};
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::models::Listing;
use crate::domains::notifications::{Notification, NotificationKind, Priority};
use crate::kernel::ServerDeps;

use super::modify_listing;

/// The approved receiver confirms pickup; awards receiver points and
/// tells the donor to close out the listing.
#[instrument(skip(deps), fields(receiver_id = %actor.user_id))]
pub async fn confirm_collection(
    deps: &ServerDeps,
    listing_id: ListingId,
    actor: Actor,
) -> Result<Listing, CoreError> {
    let now = chrono::Utc::now();

    let (saved, ()) = modify_listing(deps, listing_id, |listing| {
        listing.confirm_collection(actor, now)
    })
    .await?;
    let listing = saved.record;

    let award = deps
        .ledger
        .record_collection(actor.user_id, listing.quantity)
        .await;

    deps.notify(Notification::new(
        listing.donor_id,
        NotificationKind::CollectionConfirmed,
        "Food Collected!",
        format!(
            "The receiver confirmed collection of \"{}\". Please mark it done when ready.",
            listing.title
        ),
        Some(listing.id),
        Priority::High,
    ))
    .await;

    deps.bus.publish(ListingEvent::CollectionConfirmed {
        listing_id: listing.id,
        receiver_id: actor.user_id,
    });

    info!(
        listing_id = %listing.id,
        points = award.points_earned,
        "collection confirmed"
    );
    Ok(listing)
}

/// Donor closes out the listing (terminal). Valid from `Collected` or
/// directly from `Approved`.
#[instrument(skip(deps), fields(donor_id = %actor.user_id))]
pub async fn mark_distributed(
    deps: &ServerDeps,
    listing_id: ListingId,
    actor: Actor,
) -> Result<Listing, CoreError> {
    let now = chrono::Utc::now();

    let (saved, ()) = modify_listing(deps, listing_id, |listing| {
        listing.mark_distributed(actor, now)
    })
    .await?;
    let listing = saved.record;

    if let Some(receiver_id) = listing.claimed_by {
        deps.notify(Notification::new(
            receiver_id,
            NotificationKind::ListingCompleted,
            "Transaction Completed!",
            format!(
                "The transaction for \"{}\" has been marked as complete. Thank you for your contribution!",
                listing.title
            ),
            Some(listing.id),
            Priority::Medium,
        ))
        .await;
    }

    deps.bus.publish(ListingEvent::ListingDistributed {
        listing_id: listing.id,
    });

    info!(listing_id = %listing.id, "listing distributed");
    Ok(listing)
}
