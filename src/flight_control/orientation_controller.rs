use super::common::{
    geo_math,
    location::Location,
    math::{normalize_bearing, signed_angle_diff, step_toward},
};
use super::flight_phase::PhaseDecision;

/// Attitude of the aircraft in degrees. Yaw in `[0, 360)`, pitch positive
/// nose-up, roll positive right-wing-down.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Rate-limited yaw/pitch/roll computation.
///
/// Keeps the yaw and roll of the previous tick so that heading changes are
/// bounded by [`OrientationController::MAX_TURN_RATE_DEG_S`] and bank changes
/// by [`OrientationController::MAX_ROLL_RATE_DEG_S`].
#[derive(Debug, Clone, Default)]
pub struct OrientationController {
    last_yaw: Option<f64>,
    last_roll: f64,
}

impl OrientationController {
    pub const MAX_TURN_RATE_DEG_S: f64 = 8.0;
    pub const MAX_ROLL_DEG: f64 = 30.0;
    pub const MAX_ROLL_RATE_DEG_S: f64 = 15.0;
    /// Yaw divergence from the destination bearing that starts banking.
    pub const CURVE_THRESHOLD_DEG: f64 = 2.0;
    const CURVE_ROLL_GAIN: f64 = 0.5;
    pub const MAX_CURVE_ROLL_DEG: f64 = 10.0;
    /// Changes smaller than this are dropped to avoid jitter.
    const ANGLE_EPS_DEG: f64 = 0.05;
    /// Below this speed no pitch is reported.
    pub const MIN_PITCH_SPEED_KMPH: f64 = 1.0;
    const GRAVITY: f64 = 9.80665;

    pub fn new() -> Self { Self::default() }

    /// Forgets the previous heading and bank.
    pub fn reset(&mut self) {
        self.last_yaw = None;
        self.last_roll = 0.0;
    }

    pub fn last_yaw(&self) -> Option<f64> { self.last_yaw }

    /// Computes the attitude for this tick.
    ///
    /// # Arguments
    /// - `previous`: Position at the previous tick.
    /// - `current`: Position now.
    /// - `decision`: Phase decision of this tick, providing the steering
    ///   point and pitch target.
    /// - `speed_kmph`: Ground speed.
    /// - `dt_secs`: Elapsed time of this tick.
    pub fn compute(
        &mut self,
        previous: &Location,
        current: &Location,
        decision: &PhaseDecision,
        speed_kmph: f64,
        dt_secs: f64,
    ) -> Orientation {
        let dt = dt_secs.max(f64::EPSILON);
        let target = decision.target();
        let to_target = geo_math::bearing(current, &target);

        let target_yaw = if geo_math::distance(current, &target) > PhaseDecision::LOCATION_PRECISION_M {
            to_target
        } else if geo_math::distance(previous, current) > f64::EPSILON {
            geo_math::bearing(previous, current)
        } else {
            self.last_yaw.unwrap_or(to_target)
        };

        let (yaw, applied_turn) = match self.last_yaw {
            None => (target_yaw, 0.0),
            Some(last) => {
                let wanted = signed_angle_diff(last, target_yaw);
                if wanted.abs() < Self::ANGLE_EPS_DEG {
                    (last, 0.0)
                } else {
                    let turn = step_toward(0.0, wanted, Self::MAX_TURN_RATE_DEG_S * dt);
                    (normalize_bearing(last + turn), turn)
                }
            }
        };
        self.last_yaw = Some(yaw);

        let pitch = Self::pitch(current, decision, speed_kmph);
        let roll = self.roll(yaw, to_target, applied_turn / dt, speed_kmph, dt);

        Orientation { yaw, pitch, roll }
    }

    fn pitch(current: &Location, decision: &PhaseDecision, speed_kmph: f64) -> f64 {
        let alt_diff = current.altitude_to(&decision.target());
        if alt_diff.abs() <= PhaseDecision::ALTITUDE_PRECISION_M || speed_kmph < Self::MIN_PITCH_SPEED_KMPH {
            return 0.0;
        }
        decision
            .pitch_deg()
            .clamp(-PhaseDecision::MAX_DESCENT_PITCH_DEG, PhaseDecision::MAX_CLIMB_PITCH_DEG)
    }

    fn roll(&mut self, yaw: f64, to_target: f64, yaw_rate_deg_s: f64, speed_kmph: f64, dt: f64) -> f64 {
        let v = speed_kmph / 3.6;
        let coordinated = (v * yaw_rate_deg_s.to_radians()).atan2(Self::GRAVITY).to_degrees();

        let divergence = signed_angle_diff(yaw, to_target);
        let curve = if divergence.abs() > Self::CURVE_THRESHOLD_DEG {
            (divergence * Self::CURVE_ROLL_GAIN).clamp(-Self::MAX_CURVE_ROLL_DEG, Self::MAX_CURVE_ROLL_DEG)
        } else {
            0.0
        };

        let wanted = (coordinated + curve).clamp(-Self::MAX_ROLL_DEG, Self::MAX_ROLL_DEG);
        if (wanted - self.last_roll).abs() >= Self::ANGLE_EPS_DEG {
            self.last_roll = step_toward(self.last_roll, wanted, Self::MAX_ROLL_RATE_DEG_S * dt);
        }
        self.last_roll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_control::flight_phase::FlightPhase;

    const DT: f64 = 1.0;

    fn decision_toward(current: &Location, target: Location) -> PhaseDecision {
        PhaseDecision::decide(current, &target, target.altitude())
    }

    #[test]
    fn test_first_compute_seeds_yaw() {
        let mut ctrl = OrientationController::new();
        assert!(ctrl.last_yaw().is_none());
        let here = Location::new(10.0, 10.0, 500.0);
        let east = geo_math::destination(&here, 90.0, 10_000.0);
        let o = ctrl.compute(&here, &here, &decision_toward(&here, east), 150.0, DT);
        assert!((o.yaw - 90.0).abs() < 0.1);
        assert_eq!(o.roll, 0.0);
        assert_eq!(ctrl.last_yaw(), Some(o.yaw));
    }

    #[test]
    fn test_turn_rate_and_wrap() {
        let mut ctrl = OrientationController::new();
        let here = Location::new(0.0, 0.0, 500.0);
        let north = geo_math::destination(&here, 0.0, 10_000.0);
        let west = geo_math::destination(&here, 270.0, 10_000.0);
        ctrl.compute(&here, &here, &decision_toward(&here, north), 150.0, DT);

        // west is 90° to the left: turning through 360 -> 352
        let o = ctrl.compute(&here, &here, &decision_toward(&here, west), 150.0, DT);
        assert!((o.yaw - 352.0).abs() < 1e-6, "{}", o.yaw);
        assert!(o.roll < 0.0);
        assert!(o.roll >= -OrientationController::MAX_ROLL_RATE_DEG_S * DT);
    }

    #[test]
    fn test_roll_is_bounded_and_settles() {
        let mut ctrl = OrientationController::new();
        let here = Location::new(0.0, 0.0, 500.0);
        let north = geo_math::destination(&here, 0.0, 10_000.0);
        let south = geo_math::destination(&here, 180.0, 10_000.0);
        ctrl.compute(&here, &here, &decision_toward(&here, north), 180.0, DT);
        let mut o = Orientation::default();
        for _ in 0..60 {
            o = ctrl.compute(&here, &here, &decision_toward(&here, south), 180.0, DT);
            assert!(o.roll.abs() <= OrientationController::MAX_ROLL_DEG);
        }
        assert!((o.yaw - 180.0).abs() < 0.1);
        for _ in 0..10 {
            o = ctrl.compute(&here, &here, &decision_toward(&here, south), 180.0, DT);
        }
        assert!(o.roll.abs() < 1e-9);
    }

    #[test]
    fn test_pitch_follows_phase_and_zero_when_level() {
        let mut ctrl = OrientationController::new();
        let here = Location::new(40.6413, -73.7781, 10.0);
        let dest = Location::new(40.6460, -73.7785, 100.0);
        let decision = PhaseDecision::decide(&here, &dest, 400.0);
        assert_eq!(decision.phase(), FlightPhase::Climb);
        let o = ctrl.compute(&here, &here, &decision, 100.0, DT);
        assert_eq!(o.pitch, decision.pitch_deg());

        let slow = ctrl.compute(&here, &here, &decision, 0.5, DT);
        assert_eq!(slow.pitch, 0.0);

        let level = dest.with_altitude(10.0);
        let o = ctrl.compute(&here, &here, &decision_toward(&here, level), 100.0, DT);
        assert_eq!(o.pitch, 0.0);
    }

    #[test]
    fn test_reset_forgets_heading() {
        let mut ctrl = OrientationController::new();
        let here = Location::new(0.0, 0.0, 500.0);
        let north = geo_math::destination(&here, 0.0, 10_000.0);
        let south = geo_math::destination(&here, 180.0, 10_000.0);
        ctrl.compute(&here, &here, &decision_toward(&here, north), 150.0, DT);
        ctrl.reset();
        let o = ctrl.compute(&here, &here, &decision_toward(&here, south), 150.0, DT);
        assert!((o.yaw - 180.0).abs() < 1e-6);
    }
}
