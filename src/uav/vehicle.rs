use super::{
    TailId,
    platform::{Platform, UavCategory},
    telemetry::TelemetrySnapshot,
    telemetry_field::TelemetryField,
};
use crate::flight_control::common::location::Location;
use std::collections::BTreeMap;

/// Optional payload state. Armed platforms track remaining stores per
/// weapon, surveillance platforms track whether each sensor is operational.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    weapon_ammo: Option<BTreeMap<String, u32>>,
    sensor_status: Option<BTreeMap<String, bool>>,
}

impl Capabilities {
    pub fn for_platform(platform: Platform) -> Self {
        let payload = platform.spec().payload.iter();
        match platform.category() {
            UavCategory::Armed => Self {
                weapon_ammo: Some(payload.map(|(name, n)| ((*name).to_string(), *n)).collect()),
                sensor_status: None,
            },
            UavCategory::Surveillance => Self {
                weapon_ammo: None,
                sensor_status: Some(payload.map(|(name, _)| ((*name).to_string(), true)).collect()),
            },
        }
    }

    pub fn weapon_ammo(&self) -> Option<&BTreeMap<String, u32>> { self.weapon_ammo.as_ref() }

    pub fn sensor_status(&self) -> Option<&BTreeMap<String, bool>> { self.sensor_status.as_ref() }

    /// Expends one store of `weapon`. Returns the remaining count, or `None`
    /// when the platform carries no such weapon or it is already empty.
    pub fn expend(&mut self, weapon: &str) -> Option<u32> {
        let count = self.weapon_ammo.as_mut()?.get_mut(weapon)?;
        *count = count.checked_sub(1)?;
        Some(*count)
    }

    pub fn set_sensor(&mut self, sensor: &str, operational: bool) -> bool {
        match self.sensor_status.as_mut().and_then(|s| s.get_mut(sensor)) {
            Some(status) => {
                *status = operational;
                true
            }
            None => false,
        }
    }
}

/// A simulated aircraft: identity, airframe and the telemetry it reports.
#[derive(Debug, Clone)]
pub struct Uav {
    tail_id: TailId,
    platform: Platform,
    telemetry: TelemetrySnapshot,
    capabilities: Capabilities,
}

impl Uav {
    /// Ambient temperature the engine starts at.
    pub const AMBIENT_TEMP_C: f64 = 15.0;

    /// Creates a UAV parked at `start` with full tanks and gear down.
    pub fn new(tail_id: TailId, platform: Platform, start: Location) -> Self {
        let spec = platform.spec();
        let mut telemetry = TelemetrySnapshot::new();
        telemetry.set(TelemetryField::Latitude, start.latitude());
        telemetry.set(TelemetryField::Longitude, start.longitude());
        telemetry.set(TelemetryField::Altitude, start.altitude());
        telemetry.set(TelemetryField::CurrentSpeedKmph, 0.0);
        telemetry.set(TelemetryField::FuelAmount, 100.0);
        telemetry.set(TelemetryField::EngineTempC, Self::AMBIENT_TEMP_C);
        telemetry.set(TelemetryField::LandingGearStatus, 1.0);
        telemetry.set(TelemetryField::DragCoefficient, spec.drag_coefficient);
        telemetry.set(TelemetryField::LiftCoefficient, spec.lift_coefficient);
        match spec.category {
            UavCategory::Armed => telemetry.set(TelemetryField::SleeveId, 0.0),
            UavCategory::Surveillance => telemetry.set(TelemetryField::DataStorageUsedGb, 0.0),
        }
        Self {
            tail_id,
            platform,
            telemetry,
            capabilities: Capabilities::for_platform(platform),
        }
    }

    pub fn tail_id(&self) -> TailId { self.tail_id }

    pub fn platform(&self) -> Platform { self.platform }

    pub fn telemetry(&self) -> &TelemetrySnapshot { &self.telemetry }

    pub fn telemetry_mut(&mut self) -> &mut TelemetrySnapshot { &mut self.telemetry }

    pub fn capabilities(&self) -> &Capabilities { &self.capabilities }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities { &mut self.capabilities }

    /// Current position as reported in telemetry.
    pub fn location(&self) -> Location {
        Location::new(
            self.telemetry.get(TelemetryField::Latitude),
            self.telemetry.get(TelemetryField::Longitude),
            self.telemetry.get(TelemetryField::Altitude),
        )
    }
}
