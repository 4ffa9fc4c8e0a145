use super::common::{geo_math, location::Location};

/// Advances a position along the great circle toward `destination`.
///
/// When the distance covered this tick reaches the remaining horizontal
/// distance the result snaps exactly onto `destination`, altitude included.
/// Otherwise the horizontal position moves `speed * dt` along the bearing to
/// `destination` and the altitude changes by `sin(pitch) * travel`, never
/// beyond `target_altitude`.
pub fn advance(
    current: &Location,
    destination: &Location,
    target_altitude: f64,
    speed_mps: f64,
    pitch_deg: f64,
    dt_secs: f64,
) -> Location {
    let travel = speed_mps.max(0.0) * dt_secs.max(0.0);
    let remaining = geo_math::distance(current, destination);
    if travel >= remaining {
        return *destination;
    }

    let brg = geo_math::bearing(current, destination);
    let moved = geo_math::destination(current, brg, travel);

    let climb = pitch_deg.to_radians().sin() * travel;
    let alt_diff = target_altitude - current.altitude();
    let vertical = if climb * alt_diff > 0.0 {
        climb.clamp(-alt_diff.abs(), alt_diff.abs())
    } else {
        climb
    };
    moved.with_altitude(current.altitude() + vertical)
}
