use tracing::{info, instrument};

use crate::common::{Actor, CoreError, ListingId};
use crate::domains::listings::events::ListingEvent;
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// Removes a listing entirely. Donor-or-admin, any status; this is an
/// out-of-band administrative operation, not a lifecycle transition.
#[instrument(skip(deps), fields(actor_id = %actor.user_id))]
pub async fn delete_listing(
    deps: &ServerDeps,
    listing_id: ListingId,
    actor: Actor,
) -> Result<(), CoreError> {
    let timeout = deps.config.dependency_timeout;

    let stored = bounded(timeout, "load listing", deps.listings.get(listing_id)).await??;
    actor.require_user_or_admin(
        stored.record.donor_id,
        "only the donor or an admin can delete a listing",
    )?;

    bounded(timeout, "delete listing", deps.listings.remove(listing_id)).await??;
    deps.listing_index.remove_where(|pin| pin.id == listing_id).await;

    deps.bus.publish(ListingEvent::ListingDeleted { listing_id });

    info!(listing_id = %listing_id, "listing deleted");
    Ok(())
}
