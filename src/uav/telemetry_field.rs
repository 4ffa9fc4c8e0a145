use strum_macros::{Display, EnumCount, EnumIter};

/// Closed set of values a UAV reports. The discriminant doubles as the dense
/// index into [`TelemetrySnapshot`](super::TelemetrySnapshot).
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    Copy,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum TelemetryField {
    Latitude,
    Longitude,
    Altitude,
    CurrentSpeedKmph,
    YawDeg,
    PitchDeg,
    RollDeg,
    ThrottlePercent,
    FuelAmount,
    EngineRpm,
    EngineTempC,
    SignalStrengthDbm,
    FlightTimeSec,
    LandingGearStatus,
    DragCoefficient,
    LiftCoefficient,
    ThrustAfterInfluence,
    SleeveId,
    DataStorageUsedGb,
    Checksum,
}

/// Which family of UAVs reports a field.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum FieldCategory {
    Flight,
    Armed,
    Surveillance,
}

/// Engineering unit tag carried in ICD descriptors.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, serde::Serialize, serde::Deserialize)]
pub enum Unit {
    Degrees,
    Meters,
    KilometersPerHour,
    Percent,
    Rpm,
    Celsius,
    Dbm,
    Seconds,
    Boolean,
    Coefficient,
    Newtons,
    Identifier,
    Gigabytes,
    Crc,
}

impl TelemetryField {
    pub fn index(self) -> usize { self as usize }

    pub fn category(self) -> FieldCategory {
        match self {
            TelemetryField::SleeveId => FieldCategory::Armed,
            TelemetryField::DataStorageUsedGb => FieldCategory::Surveillance,
            _ => FieldCategory::Flight,
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            TelemetryField::Latitude
            | TelemetryField::Longitude
            | TelemetryField::YawDeg
            | TelemetryField::PitchDeg
            | TelemetryField::RollDeg => Unit::Degrees,
            TelemetryField::Altitude => Unit::Meters,
            TelemetryField::CurrentSpeedKmph => Unit::KilometersPerHour,
            TelemetryField::ThrottlePercent | TelemetryField::FuelAmount => Unit::Percent,
            TelemetryField::EngineRpm => Unit::Rpm,
            TelemetryField::EngineTempC => Unit::Celsius,
            TelemetryField::SignalStrengthDbm => Unit::Dbm,
            TelemetryField::FlightTimeSec => Unit::Seconds,
            TelemetryField::LandingGearStatus => Unit::Boolean,
            TelemetryField::DragCoefficient | TelemetryField::LiftCoefficient => {
                Unit::Coefficient
            }
            TelemetryField::ThrustAfterInfluence => Unit::Newtons,
            TelemetryField::SleeveId => Unit::Identifier,
            TelemetryField::DataStorageUsedGb => Unit::Gigabytes,
            TelemetryField::Checksum => Unit::Crc,
        }
    }
}
