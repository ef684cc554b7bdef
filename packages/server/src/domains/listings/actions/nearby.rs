use tracing::instrument;

use crate::common::{CoreError, GeoPoint};
use crate::domains::listings::models::Listing;
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// Claimable listings near a point, nearest first.
///
/// Deleted pins hydrate to nothing and terminal listings are filtered —
/// the index is a hint, the store is the truth.
#[instrument(skip(deps))]
pub async fn nearby_listings(
    deps: &ServerDeps,
    origin: GeoPoint,
    max_distance_km: f64,
    limit: usize,
) -> Result<Vec<(Listing, f64)>, CoreError> {
    let pins = deps
        .listing_index
        .nearest(origin, max_distance_km, |_| true, limit)
        .await;

    let mut found = Vec::with_capacity(pins.len());
    for (pin, distance) in pins {
        let stored = bounded(
            deps.config.dependency_timeout,
            "load listing",
            deps.listings.get(pin.id),
        )
        .await?;
        if let Ok(versioned) = stored {
            if versioned.record.can_receive_claims() {
                found.push((versioned.record, distance));
            }
        }
    }
    Ok(found)
}
