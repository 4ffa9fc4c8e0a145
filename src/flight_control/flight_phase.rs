use super::common::{geo_math, location::Location};
use strum_macros::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum FlightPhase {
    Climb,
    Cruise,
    Descent,
}

impl From<FlightPhase> for &'static str {
    fn from(value: FlightPhase) -> Self {
        match value {
            FlightPhase::Climb => "climb",
            FlightPhase::Cruise => "cruise",
            FlightPhase::Descent => "descent",
        }
    }
}

/// Result of classifying the current geometry of a flight.
///
/// `target` is the point the aircraft should be steering toward this tick:
/// the destination itself, or the destination lifted to cruise altitude
/// while the en-route part of the flight is still ahead.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PhaseDecision {
    phase: FlightPhase,
    pitch_deg: f64,
    target: Location,
}

impl PhaseDecision {
    /// Horizontal precision of position handling in meters.
    pub const LOCATION_PRECISION_M: f64 = 5.0;
    /// Altitude differences up to this are considered level.
    pub const ALTITUDE_PRECISION_M: f64 = 1.0;
    /// Final approach starts at this remaining horizontal distance.
    pub const FINAL_APPROACH_M: f64 = 10.0 * Self::LOCATION_PRECISION_M;
    pub const MAX_CLIMB_PITCH_DEG: f64 = 20.0;
    pub const MAX_DESCENT_PITCH_DEG: f64 = 15.0;
    /// Preferred en-route climb angle.
    pub const CLIMB_ANGLE_DEG: f64 = 12.0;
    /// Glide angle used to plan altitude changes toward the destination.
    pub const DESCENT_ANGLE_DEG: f64 = 15.0;
    /// Lower bound on the horizontal leg used for pitch geometry.
    const MIN_PITCH_BASE_M: f64 = 100.0;

    /// Decides phase, pitch target and steering point for one tick.
    ///
    /// Evaluated in priority order: final approach, transition to the
    /// destination altitude, required descent, climb to cruise, cruise.
    pub fn decide(current: &Location, destination: &Location, cruise_altitude: f64) -> Self {
        let remaining = geo_math::distance(current, destination);
        let alt_diff = current.altitude_to(destination);

        if remaining <= Self::FINAL_APPROACH_M {
            return Self::toward_destination(destination, alt_diff, remaining);
        }

        let descent_tan = Self::DESCENT_ANGLE_DEG.to_radians().tan();
        let cruise_to_dest = destination.altitude() - cruise_altitude;
        if cruise_to_dest.abs() > Self::ALTITUDE_PRECISION_M
            && remaining <= cruise_to_dest.abs() / descent_tan
        {
            return Self::toward_destination(destination, alt_diff, remaining);
        }

        let excess = -alt_diff;
        if excess > Self::ALTITUDE_PRECISION_M && remaining <= excess / descent_tan {
            return Self {
                phase: FlightPhase::Descent,
                pitch_deg: Self::approach_pitch(alt_diff, remaining),
                target: *destination,
            };
        }

        let cruise_target = destination.with_altitude(cruise_altitude);
        let climb = cruise_altitude - current.altitude();
        if climb > Self::ALTITUDE_PRECISION_M {
            let geometric = climb.atan2(remaining.max(Self::MIN_PITCH_BASE_M)).to_degrees();
            return Self {
                phase: FlightPhase::Climb,
                pitch_deg: geometric.min(Self::CLIMB_ANGLE_DEG),
                target: cruise_target,
            };
        }

        Self {
            phase: FlightPhase::Cruise,
            pitch_deg: 0.0,
            target: cruise_target,
        }
    }

    fn toward_destination(destination: &Location, alt_diff: f64, remaining: f64) -> Self {
        if alt_diff.abs() <= Self::ALTITUDE_PRECISION_M {
            return Self {
                phase: FlightPhase::Cruise,
                pitch_deg: 0.0,
                target: *destination,
            };
        }
        let phase = if alt_diff > 0.0 { FlightPhase::Climb } else { FlightPhase::Descent };
        Self {
            phase,
            pitch_deg: Self::approach_pitch(alt_diff, remaining),
            target: *destination,
        }
    }

    fn approach_pitch(alt_diff: f64, remaining: f64) -> f64 {
        alt_diff
            .atan2(remaining.max(Self::MIN_PITCH_BASE_M))
            .to_degrees()
            .clamp(-Self::MAX_DESCENT_PITCH_DEG, Self::MAX_CLIMB_PITCH_DEG)
    }

    pub fn phase(&self) -> FlightPhase { self.phase }

    pub fn pitch_deg(&self) -> f64 { self.pitch_deg }

    pub fn target(&self) -> Location { self.target }
}
