//! Great-circle primitives on a spherical earth (haversine model).
//!
//! Distances are in meters, angles in degrees. Altitude is ignored by every
//! function here and copied through unchanged by [`destination`].

use super::location::Location;
use super::math::{normalize_bearing, normalize_longitude};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Horizontal distances below this are treated as coincident points.
const COINCIDENT_EPS_M: f64 = 1e-6;

/// Horizontal great-circle distance between `a` and `b` in meters.
pub fn distance(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // rounding can push h marginally outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial great-circle bearing from `from` to `to`, in `[0, 360)`.
///
/// Returns `0.0` when both points coincide.
pub fn bearing(from: &Location, to: &Location) -> f64 {
    if distance(from, to) < COINCIDENT_EPS_M {
        return 0.0;
    }
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let d_lon = (to.longitude() - from.longitude()).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Projects `origin` along `bearing_deg` for `distance_m` meters.
///
/// The returned longitude is wrapped into `[-180, 180)`; the altitude is
/// taken from `origin`.
pub fn destination(origin: &Location, bearing_deg: f64, distance_m: f64) -> Location {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.latitude().to_radians();
    let lon1 = origin.longitude().to_radians();

    let sin_lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let y = theta.sin() * delta.sin() * lat1.cos();
    let x = delta.cos() - lat1.sin() * sin_lat2;
    let lon2 = lon1 + y.atan2(x);

    Location::new(
        lat2.to_degrees(),
        normalize_longitude(lon2.to_degrees()),
        origin.altitude(),
    )
}
