use super::common::math::{interpolate, step_toward};
use crate::uav::{PlatformSpec, TelemetryField, TelemetrySnapshot};

/// Ground speed policy: physics-limited acceleration toward a target speed
/// that is capped by a braking envelope ahead of the destination.
///
/// Acceleration is `min(max_acceleration, (thrust - drag) / mass)`, tapered
/// by [`SpeedController::progress_multiplier`]. Deceleration uses the
/// platform's deceleration limit. The speed never crosses the target in one
/// step and always stays within `[MIN_SPEED_KMPH, cruise]`.
pub struct SpeedController;

impl SpeedController {
    /// Lowest speed an airborne UAV is simulated at.
    pub const MIN_SPEED_KMPH: f64 = 20.0;
    /// Air density at sea level in kg/m³.
    const AIR_DENSITY: f64 = 1.225;
    const MPS_TO_KMPH: f64 = 3.6;

    /// Computes the next ground speed and writes it back into `telemetry`.
    ///
    /// # Arguments
    /// - `telemetry`: Snapshot holding the current speed.
    /// - `spec`: Platform limits (cruise speed, acceleration, thrust model).
    /// - `remaining_m`: Horizontal distance left to the destination.
    /// - `dt_secs`: Elapsed time of this tick.
    ///
    /// # Returns
    /// - The new speed in km/h.
    pub fn update(
        telemetry: &mut TelemetrySnapshot,
        spec: &PlatformSpec,
        remaining_m: f64,
        dt_secs: f64,
    ) -> f64 {
        let current = telemetry.get(TelemetryField::CurrentSpeedKmph);
        let next = Self::next_speed(current, spec, remaining_m, dt_secs);
        telemetry.set(TelemetryField::CurrentSpeedKmph, next);
        next
    }

    /// Pure form of [`SpeedController::update`].
    pub fn next_speed(current_kmph: f64, spec: &PlatformSpec, remaining_m: f64, dt_secs: f64) -> f64 {
        let cruise = spec.cruise_speed_kmph.max(Self::MIN_SPEED_KMPH);
        let current = current_kmph.clamp(Self::MIN_SPEED_KMPH, cruise);
        let target = Self::target_speed(spec, remaining_m);
        let dt = dt_secs.max(0.0);

        let next = if current < target {
            let accel = Self::acceleration_bound(spec, current) * Self::progress_multiplier(current, cruise);
            step_toward(current, target, accel * dt * Self::MPS_TO_KMPH)
        } else {
            step_toward(current, target, spec.max_deceleration_mps2 * dt * Self::MPS_TO_KMPH)
        };
        next.clamp(Self::MIN_SPEED_KMPH, cruise)
    }

    /// Highest speed from which the UAV can still brake to the minimum speed
    /// within `remaining_m`, capped at cruise speed.
    pub fn target_speed(spec: &PlatformSpec, remaining_m: f64) -> f64 {
        let cruise = spec.cruise_speed_kmph.max(Self::MIN_SPEED_KMPH);
        let v_min = Self::MIN_SPEED_KMPH / Self::MPS_TO_KMPH;
        let braking = (v_min * v_min + 2.0 * spec.max_deceleration_mps2 * remaining_m.max(0.0)).sqrt();
        (braking * Self::MPS_TO_KMPH).clamp(Self::MIN_SPEED_KMPH, cruise)
    }

    /// Net acceleration available at `speed_kmph` in m/s².
    fn acceleration_bound(spec: &PlatformSpec, speed_kmph: f64) -> f64 {
        let v = speed_kmph / Self::MPS_TO_KMPH;
        let drag = 0.5 * Self::AIR_DENSITY * v * v * spec.drag_coefficient * spec.wing_area_m2;
        let physical = (spec.max_thrust_n - drag) / spec.mass_kg;
        physical.clamp(0.0, spec.max_acceleration_mps2)
    }

    /// Scales acceleration with how close the UAV is to cruise speed: from
    /// 70% up to full below 30% of cruise, full in between, tapering to 50%
    /// from 70% of cruise upward.
    pub fn progress_multiplier(speed_kmph: f64, cruise_kmph: f64) -> f64 {
        let ratio = (speed_kmph / cruise_kmph).clamp(0.0, 1.0);
        if ratio < 0.3 {
            interpolate(0.0, 0.3, 0.7, 1.0, ratio)
        } else if ratio > 0.7 {
            interpolate(0.7, 1.0, 1.0, 0.5, ratio)
        } else {
            1.0
        }
    }
}
