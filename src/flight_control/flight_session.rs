use super::{
    abort::AbortReason,
    common::{geo_math, location::Location},
    flight_phase::{FlightPhase, PhaseDecision},
    motion_integrator,
    orientation_controller::OrientationController,
    speed_controller::SpeedController,
};
use crate::mission::{MissionEvent, MissionEventKind, MissionEventSender, MissionOutcome};
use crate::uav::{PlatformSpec, TailId, TelemetryField, TelemetrySnapshot, Uav};
use crate::{event, flight, warn};
use strum_macros::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool { matches!(self, SessionState::Completed | SessionState::Aborted) }
}

/// Drives one UAV toward its destination, one tick at a time.
///
/// The session owns the UAV and therefore its telemetry; nothing else
/// mutates it while the session exists. Terminal transitions are reported
/// once on the mission event channel.
#[derive(Debug)]
pub struct FlightSession {
    uav: Uav,
    destination: Location,
    cruise_altitude: f64,
    previous_location: Location,
    start_location: Option<Location>,
    state: SessionState,
    outcome: Option<MissionOutcome>,
    phase: Option<FlightPhase>,
    orientation: OrientationController,
    tick_secs: f64,
    events: MissionEventSender,
}

impl FlightSession {
    /// Horizontal distance at which the destination counts as reached.
    pub const COMPLETION_RADIUS_M: f64 = PhaseDecision::LOCATION_PRECISION_M;
    /// Landing gear stays down below this height above the start point.
    const GEAR_ALTITUDE_M: f64 = 30.0;
    /// Fraction of the gap to operating temperature closed per second.
    const ENGINE_THERMAL_RATE: f64 = 0.05;
    const AIR_DENSITY: f64 = 1.225;

    pub fn new(
        uav: Uav,
        destination: Location,
        cruise_altitude: f64,
        tick_secs: f64,
        events: MissionEventSender,
    ) -> Self {
        let previous_location = uav.location();
        Self {
            uav,
            destination,
            cruise_altitude,
            previous_location,
            start_location: None,
            state: SessionState::Idle,
            outcome: None,
            phase: None,
            orientation: OrientationController::new(),
            tick_secs,
            events,
        }
    }

    pub fn tail_id(&self) -> TailId { self.uav.tail_id() }

    pub fn uav(&self) -> &Uav { &self.uav }

    pub fn telemetry(&self) -> &TelemetrySnapshot { self.uav.telemetry() }

    pub fn destination(&self) -> Location { self.destination }

    pub fn cruise_altitude(&self) -> f64 { self.cruise_altitude }

    pub fn start_location(&self) -> Option<Location> { self.start_location }

    pub fn state(&self) -> SessionState { self.state }

    pub fn outcome(&self) -> Option<MissionOutcome> { self.outcome }

    pub fn phase(&self) -> Option<FlightPhase> { self.phase }

    pub fn is_running(&self) -> bool { self.state == SessionState::Running }

    /// Starts the flight from the UAV's current position. No-op while running;
    /// a terminal session is restarted with fresh orientation state.
    pub fn start_flight_path(&mut self) {
        if self.state == SessionState::Running {
            return;
        }
        if self.state.is_terminal() {
            self.orientation.reset();
            self.outcome = None;
            self.phase = None;
        }
        let here = self.uav.location();
        self.start_location = Some(here);
        self.previous_location = here;
        self.state = SessionState::Running;
        flight!(
            "{} starting flight {here} -> {} at cruise {:.0}m.",
            self.tail_id(),
            self.destination,
            self.cruise_altitude
        );
    }

    pub fn switch_destination(&mut self, destination: Location, cruise_altitude: f64) {
        flight!("{} switching destination {} -> {destination}.", self.tail_id(), self.destination);
        self.destination = destination;
        self.cruise_altitude = cruise_altitude;
    }

    /// Marks the session aborted on request. Returns `false` if it was
    /// already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.finish(SessionState::Aborted, MissionOutcome::Cancelled);
        true
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        let dt = self.tick_secs;
        let spec = self.uav.platform().spec();
        let current = self.uav.location();
        let remaining = geo_math::distance(&current, &self.destination);
        let alt_delta = current.altitude_to(&self.destination).abs();

        if remaining <= Self::COMPLETION_RADIUS_M && alt_delta <= PhaseDecision::ALTITUDE_PRECISION_M {
            self.finish(SessionState::Completed, MissionOutcome::Completed);
            return;
        }
        if let Some(reason) = AbortReason::check(self.uav.telemetry(), spec) {
            self.finish(SessionState::Aborted, MissionOutcome::Aborted(reason));
            return;
        }

        let decision = PhaseDecision::decide(&current, &self.destination, self.cruise_altitude);
        if self.phase != Some(decision.phase()) {
            flight!("{} entering {} at {current}.", self.tail_id(), decision.phase());
            self.phase = Some(decision.phase());
        }

        let start = self.start_location.unwrap_or(current);
        let telemetry = self.uav.telemetry_mut();
        let speed = SpeedController::update(telemetry, spec, remaining, dt);
        let throttle = (speed / spec.cruise_speed_kmph * 100.0).clamp(0.0, 100.0);
        Self::update_engine(telemetry, spec, throttle, speed, dt);
        let station_range = Self::slant_range(&start, &current);
        telemetry.set(TelemetryField::SignalStrengthDbm, Self::signal_strength(spec, station_range));

        let orientation = self.orientation.compute(&self.previous_location, &current, &decision, speed, dt);
        let next = motion_integrator::advance(
            &current,
            &self.destination,
            decision.target().altitude(),
            speed / 3.6,
            orientation.pitch,
            dt,
        );

        let gear_down = next.altitude() - start.altitude() < Self::GEAR_ALTITUDE_M
            || geo_math::distance(&next, &self.destination) <= PhaseDecision::FINAL_APPROACH_M;
        let telemetry = self.uav.telemetry_mut();
        telemetry.set(TelemetryField::Latitude, next.latitude());
        telemetry.set(TelemetryField::Longitude, next.longitude());
        telemetry.set(TelemetryField::Altitude, next.altitude());
        telemetry.set(TelemetryField::YawDeg, orientation.yaw);
        telemetry.set(TelemetryField::PitchDeg, orientation.pitch);
        telemetry.set(TelemetryField::RollDeg, orientation.roll);
        telemetry.set(TelemetryField::LandingGearStatus, if gear_down { 1.0 } else { 0.0 });
        let flight_time = telemetry.get(TelemetryField::FlightTimeSec) + dt;
        telemetry.set(TelemetryField::FlightTimeSec, flight_time);

        self.previous_location = current;
        event!(
            "{} {} at {next}, {speed:.1} km/h, hdg {:.1}, pitch {:.1}, roll {:.1}.",
            self.tail_id(),
            decision.phase(),
            orientation.yaw,
            orientation.pitch,
            orientation.roll
        );
        self.emit(MissionEventKind::LocationUpdated(next));
    }

    /// Throttle, fuel burn, RPM, thrust and engine temperature for this tick.
    fn update_engine(telemetry: &mut TelemetrySnapshot, spec: &PlatformSpec, throttle: f64, speed_kmph: f64, dt: f64) {
        let load = throttle / 100.0;
        telemetry.set(TelemetryField::ThrottlePercent, throttle);

        let burn = load * spec.max_thrust_n * spec.fuel_consumption_rate * dt;
        let fuel = (telemetry.get(TelemetryField::FuelAmount) - burn).max(0.0);
        telemetry.set(TelemetryField::FuelAmount, fuel);

        telemetry.set(TelemetryField::EngineRpm, load * spec.max_engine_rpm);

        let v = speed_kmph / 3.6;
        let drag = 0.5 * Self::AIR_DENSITY * v * v * telemetry.get(TelemetryField::DragCoefficient) * spec.wing_area_m2;
        telemetry.set(TelemetryField::ThrustAfterInfluence, (load * spec.max_thrust_n - drag).max(0.0));

        let operating = Uav::AMBIENT_TEMP_C + load * (spec.max_operating_temp_c - Uav::AMBIENT_TEMP_C);
        let temp = telemetry.get(TelemetryField::EngineTempC);
        let relax = (Self::ENGINE_THERMAL_RATE * dt).min(1.0);
        telemetry.set(TelemetryField::EngineTempC, temp + (operating - temp) * relax);
    }

    fn slant_range(a: &Location, b: &Location) -> f64 {
        geo_math::distance(a, b).hypot(a.altitude_to(b))
    }

    /// Received signal strength in dBm over a free-space link of `range_m`.
    pub fn signal_strength(spec: &PlatformSpec, range_m: f64) -> f64 {
        let range_km = range_m.max(1.0) / 1000.0;
        let path_loss = 20.0 * range_km.log10() + 20.0 * spec.carrier_frequency_mhz.log10() + 32.44;
        spec.tx_power_dbm + spec.tx_antenna_gain_dbi + spec.rx_antenna_gain_dbi - spec.system_loss_db - path_loss
    }

    fn finish(&mut self, state: SessionState, outcome: MissionOutcome) {
        self.state = state;
        self.outcome = Some(outcome);
        match outcome {
            MissionOutcome::Completed => flight!("{} reached {}.", self.tail_id(), self.destination),
            _ => warn!("{} mission {outcome} at {}.", self.tail_id(), self.uav.location()),
        }
        self.emit(MissionEventKind::MissionCompleted(outcome));
    }

    fn emit(&self, kind: MissionEventKind) {
        let event = MissionEvent {
            tail_id: self.tail_id(),
            kind,
        };
        if self.events.send(event).is_err() {
            warn!("{} mission event dropped, no receiver.", self.tail_id());
        }
    }
}
