//! Listing lifecycle actions.
//!
//! Each action loads the listing, applies a pure model transition, and
//! commits it with a compare-and-swap write. A version conflict means a
//! concurrent writer won; the action re-reads once and re-validates, so
//! the loser of a race surfaces the same `InvalidState` it would have
//! seen had it arrived second.

pub mod approve_claim;
pub mod create_listing;
pub mod delete_listing;
pub mod mark_distributed;
pub mod nearby;
pub mod submit_claim;

pub use approve_claim::approve_claim;
pub use create_listing::{create_listing, CreateListingOutcome};
pub use delete_listing::delete_listing;
pub use mark_distributed::{confirm_collection, mark_distributed};
pub use nearby::nearby_listings;
pub use submit_claim::submit_claim;

use tracing::debug;

use crate::common::{CoreError, ListingId};
use crate::domains::listings::models::Listing;
use crate::kernel::store::{StoreError, Versioned};
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// Load-mutate-commit loop shared by every transition action.
///
/// `apply` must be a pure transition; it may run twice when the first
/// commit loses a race. All multi-field updates land in one conditional
/// write — or not at all.
pub(crate) async fn modify_listing<T>(
    deps: &ServerDeps,
    listing_id: ListingId,
    mut apply: impl FnMut(&mut Listing) -> Result<T, CoreError>,
) -> Result<(Versioned<Listing>, T), CoreError> {
    let timeout = deps.config.dependency_timeout;
    let mut retried = false;

    loop {
        let Versioned {
            record: mut listing,
            version,
        } = bounded(timeout, "load listing", deps.listings.get(listing_id)).await??;

        let outcome = apply(&mut listing)?;

        match bounded(
            timeout,
            "commit listing",
            deps.listings.update(listing, version),
        )
        .await?
        {
            Ok(saved) => return Ok((saved, outcome)),
            Err(StoreError::VersionConflict) if !retried => {
                debug!(listing_id = %listing_id, "lost a write race, re-validating");
                retried = true;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
