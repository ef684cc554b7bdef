use serde::{Deserialize, Serialize};

use crate::common::{FacilityId, GeoPoint};
use crate::domains::listings::models::FallbackRoute;
use crate::kernel::geo_index::GeoEntry;

/// Kind of fallback consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityKind {
    AnimalFarm,
    CommunityFridge,
    CompostCenter,
}

impl FacilityKind {
    /// The route value a listing records when sent to this kind.
    pub fn as_route(self) -> FallbackRoute {
        match self {
            FacilityKind::AnimalFarm => FallbackRoute::AnimalFarm,
            FacilityKind::CommunityFridge => FallbackRoute::CommunityFridge,
            FacilityKind::CompostCenter => FallbackRoute::CompostCenter,
        }
    }
}

impl std::fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacilityKind::AnimalFarm => write!(f, "animal-farm"),
            FacilityKind::CommunityFridge => write!(f, "community-fridge"),
            FacilityKind::CompostCenter => write!(f, "compost-center"),
        }
    }
}

/// A fallback facility.
///
/// Capacity fields are informational metadata; routing decisions never
/// consult them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub kind: FacilityKind,
    pub location: GeoPoint,
    pub is_active: bool,
    pub capacity_kg: f64,
    pub current_load_kg: f64,
}

impl Facility {
    pub fn new(name: impl Into<String>, kind: FacilityKind, location: GeoPoint) -> Self {
        Self {
            id: FacilityId::new(),
            name: name.into(),
            kind,
            location,
            is_active: true,
            capacity_kg: 0.0,
            current_load_kg: 0.0,
        }
    }
}

impl GeoEntry for Facility {
    fn point(&self) -> GeoPoint {
        self.location
    }
}
