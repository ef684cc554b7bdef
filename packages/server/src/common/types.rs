//! Geographic primitives shared across domains.

use serde::{Deserialize, Serialize};

use super::utils::geo;

/// A point on the Earth's surface.
///
/// Field order mirrors the GeoJSON `[longitude, latitude]` convention used
/// by the document store's spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Great-circle distance to another point, in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        geo::distance_km(*self, *other)
    }

    /// Whether the coordinates are within valid WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// A described location: the indexed point plus human-readable context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub point: GeoPoint,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
}

impl Location {
    pub fn new(point: GeoPoint, city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            point,
            address: None,
            city: city.into(),
            state: state.into(),
        }
    }
}
