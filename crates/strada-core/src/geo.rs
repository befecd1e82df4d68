//! # Geo Primitives
//!
//! WGS-84 coordinates, great-circle distance, and circular zone containment.
//! Zone geometry is the basis of every city policy gate: congestion charging
//! in London, ZTL enforcement in Milan and Rome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in metres, as used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

// =============================================================================
// GeoPoint
// =============================================================================

/// A WGS-84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in decimal degrees.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Great-circle distance to another point in metres (haversine).
    pub fn distance_m(&self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

// =============================================================================
// Zone
// =============================================================================

/// A circular geographic zone used by city policies.
///
/// Containment is defined by great-circle distance from the centre being at
/// most `radius_m`. Restricted zones block (or flag) vehicles; unrestricted
/// zones are informational (parking bays, pricing areas).
#[derive(Debug, Clone)]
pub struct Zone {
    pub zone_id: String,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub restricted: bool,
}

impl Zone {
    /// Creates a zone from its id, centre, radius, and restriction flag.
    pub fn new(zone_id: impl Into<String>, center: GeoPoint, radius_m: f64, restricted: bool) -> Self {
        Zone {
            zone_id: zone_id.into(),
            center,
            radius_m,
            restricted,
        }
    }

    /// Returns true if the point lies within the zone.
    #[inline]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.center.distance_m(point) <= self.radius_m
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::new(51.5074, -0.1278);
        assert!(p.distance_m(p) < 1e-9);
    }

    #[test]
    fn test_distance_known_pair() {
        // Trafalgar Square to St Paul's Cathedral, roughly 2.3 km.
        let trafalgar = GeoPoint::new(51.5080, -0.1281);
        let st_pauls = GeoPoint::new(51.5138, -0.0984);
        let d = trafalgar.distance_m(st_pauls);
        assert!((1900.0..2600.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(45.4642, 9.1900);
        let b = GeoPoint::new(45.4700, 9.1950);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 1e-6);
    }

    #[test]
    fn test_zone_containment() {
        let zone = Zone::new("TEST_ZONE", GeoPoint::new(41.8902, 12.4922), 800.0, true);
        // Centre is inside.
        assert!(zone.contains(GeoPoint::new(41.8902, 12.4922)));
        // ~700 m north-east is still inside an 800 m radius.
        assert!(zone.contains(GeoPoint::new(41.8950, 12.4960)));
        // Several kilometres away is not.
        assert!(!zone.contains(GeoPoint::new(41.9300, 12.5200)));
    }
}
