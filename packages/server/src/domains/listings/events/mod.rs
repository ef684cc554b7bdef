use serde::Serialize;

use crate::common::{ListingId, RequestId, UserId};
use crate::domains::listings::models::FallbackRoute;

/// Listing lifecycle facts, published on the event bus after a transition
/// commits. Consumed by the external pub/sub collaborator; the core emits
/// them deterministically but does not own delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListingEvent {
    /// A listing was created and registered for matching.
    ListingCreated {
        listing_id: ListingId,
        donor_id: UserId,
        match_count: usize,
    },

    /// A receiver joined the claim queue.
    ClaimRequested {
        listing_id: ListingId,
        request_id: RequestId,
        receiver_id: UserId,
    },

    /// The donor approved one request; all other pending requests were
    /// rejected in the same operation.
    ClaimApproved {
        listing_id: ListingId,
        receiver_id: UserId,
        rejected_receivers: Vec<UserId>,
    },

    /// The approved receiver confirmed pickup.
    CollectionConfirmed {
        listing_id: ListingId,
        receiver_id: UserId,
    },

    /// The donor closed out the listing (terminal).
    ListingDistributed { listing_id: ListingId },

    /// The sweeper expired the listing into fallback (terminal).
    ListingExpired {
        listing_id: ListingId,
        fallback_route: FallbackRoute,
        rejected_receivers: Vec<UserId>,
    },

    /// The listing was deleted out-of-band.
    ListingDeleted { listing_id: ListingId },
}
