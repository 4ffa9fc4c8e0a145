use crate::uav::{PlatformSpec, TelemetryField, TelemetrySnapshot};
use strum_macros::Display;

/// Why a mission was aborted. Variants are listed in reporting priority.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum AbortReason {
    FuelDepleted,
    NoSignal,
    EngineOverheat,
    Unknown,
}

impl AbortReason {
    /// Signal strength below this means the link is lost.
    pub const NO_SIGNAL_DBM: f64 = -110.0;

    /// Returns the first tripped abort condition, fuel before signal before
    /// overheat, or `None` if the mission may continue.
    pub fn check(telemetry: &TelemetrySnapshot, spec: &PlatformSpec) -> Option<Self> {
        if telemetry.get(TelemetryField::FuelAmount) <= 0.0 {
            Some(AbortReason::FuelDepleted)
        } else if telemetry.get(TelemetryField::SignalStrengthDbm) < Self::NO_SIGNAL_DBM {
            Some(AbortReason::NoSignal)
        } else if telemetry.get(TelemetryField::EngineTempC) > spec.overheat_temp_c {
            Some(AbortReason::EngineOverheat)
        } else {
            None
        }
    }

    /// Like [`AbortReason::check`] but always yields a reason.
    pub fn classify(telemetry: &TelemetrySnapshot, spec: &PlatformSpec) -> Self {
        Self::check(telemetry, spec).unwrap_or(AbortReason::Unknown)
    }
}
