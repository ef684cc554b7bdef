use tracing::{info, instrument};

use crate::common::{Actor, CoreError, ListingId, RequestId};
use crate::domains::listings::events::ListingEvent;
use crate::domains::listings::models::Listing;
use crate::domains::notifications::{Notification, NotificationKind, Priority};
use crate::kernel::ServerDeps;

use super::modify_listing;

/// Donor approves one pending claim request.
///
/// Atomic and exclusive: the chosen request becomes `Approved`, every
/// other pending request becomes `Rejected`, and the claim fields are set
/// — all in a single conditional write. A concurrent approval or the
/// expiry sweeper winning the race leaves this call with `InvalidState`.
#[instrument(skip(deps), fields(actor_id = %actor.user_id))]
pub async fn approve_claim(
    deps: &ServerDeps,
    listing_id: ListingId,
    request_id: RequestId,
    actor: Actor,
) -> Result<Listing, CoreError> {
    let now = chrono::Utc::now();

    let (saved, outcome) = modify_listing(deps, listing_id, |listing| {
        listing.approve_claim(request_id, actor, now)
    })
    .await?;
    let listing = saved.record;

    deps.notify(Notification::new(
        outcome.approved_receiver,
        NotificationKind::ClaimApproved,
        "Claim Approved!",
        format!(
            "The donor approved your claim request for \"{}\". Please collect it soon!",
            listing.title
        ),
        Some(listing.id),
        Priority::High,
    ))
    .await;

    futures::future::join_all(outcome.rejected_receivers.iter().map(|rejected| {
        deps.notify(Notification::new(
            *rejected,
            NotificationKind::ClaimRejected,
            "Claim Request Not Selected",
            format!(
                "Another receiver was selected for \"{}\". Keep trying!",
                listing.title
            ),
            Some(listing.id),
            Priority::Low,
        ))
    }))
    .await;

    deps.bus.publish(ListingEvent::ClaimApproved {
        listing_id: listing.id,
        receiver_id: outcome.approved_receiver,
        rejected_receivers: outcome.rejected_receivers.clone(),
    });

    info!(
        listing_id = %listing.id,
        receiver_id = %outcome.approved_receiver,
        rejected = outcome.rejected_receivers.len(),
        "claim approved"
    );
    Ok(listing)
}
