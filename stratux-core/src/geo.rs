//! Relative bearing and distance between own ship and a traffic contact.
//!
//! Local flat-earth (equirectangular) approximation:
//! - Δlat and Δlon are normalized into (-180, 180] degrees
//! - north = Δlat·R, east = Δlon·R·|cos(mean lat)|, R = Earth mean radius
//! - distance = hypot(north, east), bearing = atan2(east, north)
//!
//! Good to well under 1% at traffic-display ranges (< 50 NM).

use serde::Serialize;

/// Earth mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters to nautical miles.
pub const METERS_TO_NM: f64 = 0.000539957;

/// Result of a bearing/distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BearingDistance {
    /// True bearing from own ship, [0, 360) degrees.
    pub bearing_deg: f64,
    pub distance_nm: f64,
}

/// Bearing and distance from (`lat1`, `lon1`) to (`lat2`, `lon2`), degrees in.
pub fn bearing_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> BearingDistance {
    let dlat = relative_radians(lat2 - lat1);
    let dlon = relative_radians(lon2 - lon1);
    let mean_lat = relative_radians((lat1 + lat2) / 2.0);

    let north = dlat * EARTH_RADIUS_M;
    let east = dlon * EARTH_RADIUS_M * mean_lat.cos().abs();

    BearingDistance {
        bearing_deg: heading_degrees(east.atan2(north)),
        distance_nm: north.hypot(east) * METERS_TO_NM,
    }
}

/// Normalize an angle into (-180, 180] degrees and convert to radians.
fn relative_radians(deg: f64) -> f64 {
    (180.0 - (180.0 - deg).rem_euclid(360.0)).to_radians()
}

/// Convert an atan2 result to a compass heading in [0, 360).
fn heading_degrees(rad: f64) -> f64 {
    let deg = rad.to_degrees();
    let deg = if deg < 0.0 { deg + 360.0 } else { deg };
    if deg >= 360.0 {
        deg - 360.0
    } else {
        deg
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
