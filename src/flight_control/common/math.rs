/// Calculate the modulo for floating point numbers, always returning a
/// non-negative result for a positive divisor.
///
/// # Arguments
/// - `a`: The dividend.
/// - `b`: The divisor.
///
/// # Returns
/// - An `f64` in `[0, b)`.
pub fn fmod(a: f64, b: f64) -> f64 { ((a % b) + b) % b }

/// Wraps a heading into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = fmod(deg, 360.0);
    // fmod of tiny negative values can round up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wraps a longitude into `[-180, 180)`.
pub fn normalize_longitude(deg: f64) -> f64 {
    let wrapped = fmod(deg + 180.0, 360.0) - 180.0;
    if wrapped >= 180.0 { -180.0 } else { wrapped }
}

/// Shortest signed rotation from `from` to `to` in degrees, in `(-180, 180]`.
///
/// # Arguments
/// - `from`: The current heading.
/// - `to`: The target heading.
///
/// # Returns
/// - Positive values mean a clockwise (right) turn.
pub fn signed_angle_diff(from: f64, to: f64) -> f64 {
    let diff = fmod(to - from, 360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Linearly interpolates a value `t` between two points `(x1, y1)` and `(x2, y2)`.
///
/// # Arguments
/// - `x1`, `x2`: The x-coordinates of the two points, `x1 < x2`.
/// - `y1`, `y2`: The y-coordinates of the two points.
/// - `t`: The x-coordinate for which the interpolated y-value is to be calculated.
///
/// # Returns
/// - An `f64` representing the interpolated y-value, `t` being clamped to `[x1, x2]`.
pub fn interpolate(x1: f64, x2: f64, y1: f64, y2: f64, t: f64) -> f64 {
    let r_t = t.clamp(x1, x2);
    y1 + (r_t - x1) * (y2 - y1) / (x2 - x1)
}

/// Moves `current` toward `target` by at most `|max_step|`, never past it.
pub fn step_toward(current: f64, target: f64, max_step: f64) -> f64 {
    let step = max_step.abs();
    current + (target - current).clamp(-step, step)
}
