use tracing::{info, instrument};

use crate::common::{Actor, CoreError, ListingId};
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::models::Listing;
use crate::domains::notifications::{Notification, NotificationKind, Priority};
use crate::kernel::ServerDeps;

use super::modify_listing;

/// A receiver joins the claim queue of a listing.
///
/// The first request recorded flips the listing into `PendingApproval`;
/// a receiver with a pending request already open gets
/// `DuplicatePending`.
#[instrument(skip(deps, message), fields(receiver_id = %actor.user_id))]
pub async fn submit_claim(
    deps: &ServerDeps,
    listing_id: ListingId,
    actor: Actor,
    message: Option<String>,
) -> Result<Listing, CoreError> {
    let now = chrono::Utc::now();
    let receiver_id = actor.user_id;

    let (saved, request_id) = modify_listing(deps, listing_id, |listing| {
        listing.submit_claim(receiver_id, message.clone(), now)
    })
    .await?;
    let listing = saved.record;

    let receiver_name = deps
        .receivers
        .get(receiver_id)
        .await
        .ok()
        .flatten()
        .map(|r| r.name)
        .unwrap_or_else(|| "A receiver".to_string());

    deps.notify(Notification::new(
        listing.donor_id,
        NotificationKind::ClaimRequested,
        "New Claim Request!",
        format!(
            "{} has requested to claim your listing: {}",
            receiver_name, listing.title
        ),
        Some(listing.id),
        Priority::High,
    ))
    .await;

    deps.notify(Notification::new(
        receiver_id,
        NotificationKind::ClaimRequested,
        "Claim Request Submitted",
        format!(
            "Your claim request for \"{}\" has been sent to the donor. Waiting for approval.",
            listing.title
        ),
        Some(listing.id),
        Priority::Medium,
    ))
    .await;

    deps.bus.publish(ListingEvent::ClaimRequested {
        listing_id: listing.id,
        request_id,
        receiver_id,
    });

    info!(listing_id = %listing.id, request_id = %request_id, "claim submitted");
    Ok(listing)
}
