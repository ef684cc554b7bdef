//! On-demand match pass for a listing.

use serde::Serialize;
use tracing::{info, instrument};

use crate::common::CoreError;
use crate::domains::listings::models::{Listing, ListingStatus};
use crate::domains::matching::fallback::{self, FallbackRoutes};
use crate::domains::matching::utils::scoring::{score_candidates, ScoredCandidate};
use crate::kernel::timeout::bounded;
use crate::kernel::ServerDeps;

/// Ranked candidates plus the fallback picture for one listing.
///
/// A ranking, not a claim: receivers still submit claim requests and the
/// donor still approves.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub matches: Vec<ScoredCandidate>,
    pub fallback_routes: FallbackRoutes,
    pub recommended: Option<ScoredCandidate>,
}

/// Finds and ranks receivers for a listing by id.
///
/// Read-only; requires the listing to still be `Active`.
#[instrument(skip(deps))]
pub async fn find_matches(
    deps: &ServerDeps,
    listing_id: crate::common::ListingId,
) -> Result<MatchReport, CoreError> {
    let stored = bounded(
        deps.config.dependency_timeout,
        "load listing",
        deps.listings.get(listing_id),
    )
    .await??;

    if stored.record.status != ListingStatus::Active {
        return Err(CoreError::InvalidState(format!(
            "matching runs on active listings only (status: {})",
            stored.record.status
        )));
    }

    find_matches_for(deps, &stored.record).await
}

/// Match pass over an already-loaded listing (used by the creation flow).
pub(crate) async fn find_matches_for(
    deps: &ServerDeps,
    listing: &Listing,
) -> Result<MatchReport, CoreError> {
    let origin = listing.location.point;

    let ranked = bounded(
        deps.config.dependency_timeout,
        "receiver query",
        deps.receivers.nearest_eligible(
            origin,
            deps.config.match_radius_km,
            deps.config.match_candidate_limit,
        ),
    )
    .await??;

    let matches = score_candidates(listing.is_disaster_relief, ranked);

    let fallback_routes = bounded(
        deps.config.dependency_timeout,
        "facility query",
        fallback::find_fallback_routes(
            deps.facilities.as_ref(),
            origin,
            deps.config.fallback_radius_km,
            deps.config.fallback_candidate_limit,
        ),
    )
    .await??;

    info!(
        listing_id = %listing.id,
        candidates = matches.len(),
        "match pass complete"
    );

    Ok(MatchReport {
        recommended: matches.first().cloned(),
        matches,
        fallback_routes,
    })
}
