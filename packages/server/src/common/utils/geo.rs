//! Great-circle distance between coordinates.

use crate::common::types::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two points in kilometers, by the haversine formula.
///
/// Pure and symmetric; returns 0 for identical points.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
