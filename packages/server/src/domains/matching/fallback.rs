//! Fallback routing for unclaimed, expiring food.
//!
//! Facilities within the fallback radius are grouped by kind; when the
//! sweeper needs exactly one target the priority is
//! animal farm > community fridge > compost center, nearest within the
//! winning kind. No facility in range means the food is routed nowhere
//! (`FallbackRoute::None`) — the listing still leaves the claimable states.

use serde::Serialize;
use tracing::debug;

use crate::common::{CoreError, GeoPoint};
use crate::domains::listings::models::FallbackRoute;
use crate::domains::matching::models::{Facility, FacilityKind};
use crate::kernel::directory::FacilityDirectory;

/// Facilities in range, grouped by kind, nearest first within each group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FallbackRoutes {
    pub animal_farms: Vec<(Facility, f64)>,
    pub community_fridges: Vec<(Facility, f64)>,
    pub compost_centers: Vec<(Facility, f64)>,
}

impl FallbackRoutes {
    /// Picks the single routing target by kind priority; the facility is
    /// the nearest of the winning kind.
    pub fn select(&self) -> (FallbackRoute, Option<&Facility>) {
        for (route, group) in [
            (FallbackRoute::AnimalFarm, &self.animal_farms),
            (FallbackRoute::CommunityFridge, &self.community_fridges),
            (FallbackRoute::CompostCenter, &self.compost_centers),
        ] {
            if let Some((facility, _)) = group.first() {
                return (route, Some(facility));
            }
        }
        (FallbackRoute::None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.animal_farms.is_empty()
            && self.community_fridges.is_empty()
            && self.compost_centers.is_empty()
    }
}

/// Queries facilities around `origin` and groups them by kind.
pub async fn find_fallback_routes(
    facilities: &dyn FacilityDirectory,
    origin: GeoPoint,
    radius_km: f64,
    limit: usize,
) -> Result<FallbackRoutes, CoreError> {
    let ranked = facilities.nearest_active(origin, radius_km, limit).await?;
    debug!(found = ranked.len(), radius_km, "fallback facilities in range");

    let mut routes = FallbackRoutes::default();
    for (facility, distance) in ranked {
        match facility.kind {
            FacilityKind::AnimalFarm => routes.animal_farms.push((facility, distance)),
            FacilityKind::CommunityFridge => routes.community_fridges.push((facility, distance)),
            FacilityKind::CompostCenter => routes.compost_centers.push((facility, distance)),
        }
    }
    Ok(routes)
}
