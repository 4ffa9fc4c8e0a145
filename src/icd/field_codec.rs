use crate::uav::TelemetryField;
use std::collections::HashMap;
use std::sync::LazyLock;

/// How a telemetry value maps onto the unsigned integer stored in its bit window.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FieldTransform {
    /// `round(value * scale)`
    Scaled { scale: f64 },
    /// `round((value + offset) * scale)`, recentres a signed domain.
    OffsetScaled { offset: f64, scale: f64 },
    /// `round(value)` limited to `0..=100`.
    Percent,
    /// Exactly one of two codes, `on` for values of at least 0.5.
    Boolean { off: u64, on: u64 },
    /// `round(value)`
    Rounded,
    /// Filled in by the codec after all other fields are written.
    Checksum,
}

impl FieldTransform {
    /// Largest integer value a transform may produce, regardless of width.
    fn code_ceiling(self) -> Option<u64> {
        match self {
            FieldTransform::Percent => Some(100),
            FieldTransform::Boolean { off, on } => Some(off.max(on)),
            _ => None,
        }
    }

    /// Smallest bit width that can hold every code of this transform.
    #[allow(clippy::cast_possible_truncation)]
    pub fn min_width(self) -> u8 {
        match self {
            FieldTransform::Checksum => FieldCodec::CHECKSUM_BITS,
            other => other.code_ceiling().map_or(1, |c| (u64::BITS - c.leading_zeros()).max(1) as u8),
        }
    }

    /// Maps `value` to its stored integer, clamped into a `width`-bit window.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn encode(self, value: f64, width: u8) -> u64 {
        let max_code = FieldCodec::max_code(width);
        let raw = match self {
            FieldTransform::Boolean { off, on } => return if value >= 0.5 { on } else { off },
            FieldTransform::Checksum => return 0,
            FieldTransform::Scaled { scale } => (value * scale).round(),
            FieldTransform::OffsetScaled { offset, scale } => ((value + offset) * scale).round(),
            FieldTransform::Percent => value.round().clamp(0.0, 100.0),
            FieldTransform::Rounded => value.round(),
        };
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, max_code as f64) as u64
    }

    /// Exact inverse of [`FieldTransform::encode`]. `None` for a boolean code
    /// that is neither of the two valid codes.
    #[allow(clippy::cast_precision_loss)]
    pub fn decode(self, code: u64) -> Option<f64> {
        match self {
            FieldTransform::Scaled { scale } => Some(code as f64 / scale),
            FieldTransform::OffsetScaled { offset, scale } => Some(code as f64 / scale - offset),
            FieldTransform::Percent | FieldTransform::Rounded | FieldTransform::Checksum => Some(code as f64),
            FieldTransform::Boolean { off, on } => {
                if code == on {
                    Some(1.0)
                } else if code == off {
                    Some(0.0)
                } else {
                    None
                }
            }
        }
    }

    /// Value range representable in a `width`-bit window.
    #[allow(clippy::cast_precision_loss)]
    pub fn value_range(self, width: u8) -> (f64, f64) {
        match self {
            FieldTransform::Boolean { .. } => (0.0, 1.0),
            FieldTransform::Percent => (0.0, 100.0),
            other => {
                let max_code = FieldCodec::max_code(width);
                (other.decode(0).unwrap_or(0.0), other.decode(max_code).unwrap_or(max_code as f64))
            }
        }
    }
}

/// Default bit width and transform of one telemetry field.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FieldCodec {
    width: u8,
    transform: FieldTransform,
}

impl FieldCodec {
    pub const CHECKSUM_BITS: u8 = 16;
    pub const MAX_WIDTH: u8 = 64;
    const COORDINATE_SCALE: f64 = 1e7;
    const ANGLE_SCALE: f64 = 100.0;
    const ANGLE_OFFSET: f64 = 180.0;
    const COEFFICIENT_SCALE: f64 = 1000.0;
    pub const GEAR_RETRACTED: u64 = 0b01;
    pub const GEAR_DEPLOYED: u64 = 0b10;

    pub fn of(field: TelemetryField) -> Self { FIELD_CODEC_LOOKUP[&field] }

    pub fn width(&self) -> u8 { self.width }

    pub fn transform(&self) -> FieldTransform { self.transform }

    pub fn max_code(width: u8) -> u64 {
        if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
    }
}

static FIELD_CODEC_LOOKUP: LazyLock<HashMap<TelemetryField, FieldCodec>> = LazyLock::new(|| {
    let scaled = |scale| FieldTransform::Scaled { scale };
    let offset_scaled = |offset, scale| FieldTransform::OffsetScaled { offset, scale };
    let table = [
        (TelemetryField::Latitude, 31, offset_scaled(90.0, FieldCodec::COORDINATE_SCALE)),
        (TelemetryField::Longitude, 32, offset_scaled(180.0, FieldCodec::COORDINATE_SCALE)),
        (TelemetryField::Altitude, 15, FieldTransform::Rounded),
        (TelemetryField::CurrentSpeedKmph, 10, FieldTransform::Rounded),
        (TelemetryField::YawDeg, 16, scaled(FieldCodec::ANGLE_SCALE)),
        (TelemetryField::PitchDeg, 16, offset_scaled(FieldCodec::ANGLE_OFFSET, FieldCodec::ANGLE_SCALE)),
        (TelemetryField::RollDeg, 16, offset_scaled(FieldCodec::ANGLE_OFFSET, FieldCodec::ANGLE_SCALE)),
        (TelemetryField::ThrottlePercent, 7, FieldTransform::Percent),
        (TelemetryField::FuelAmount, 7, FieldTransform::Percent),
        (TelemetryField::EngineRpm, 14, FieldTransform::Rounded),
        (TelemetryField::EngineTempC, 16, scaled(FieldCodec::ANGLE_SCALE)),
        (TelemetryField::SignalStrengthDbm, 11, offset_scaled(150.0, 10.0)),
        (TelemetryField::FlightTimeSec, 20, FieldTransform::Rounded),
        (
            TelemetryField::LandingGearStatus,
            2,
            FieldTransform::Boolean {
                off: FieldCodec::GEAR_RETRACTED,
                on: FieldCodec::GEAR_DEPLOYED,
            },
        ),
        (TelemetryField::DragCoefficient, 12, scaled(FieldCodec::COEFFICIENT_SCALE)),
        (TelemetryField::LiftCoefficient, 12, scaled(FieldCodec::COEFFICIENT_SCALE)),
        (TelemetryField::ThrustAfterInfluence, 16, FieldTransform::Rounded),
        (TelemetryField::SleeveId, 8, FieldTransform::Rounded),
        (TelemetryField::DataStorageUsedGb, 12, FieldTransform::Rounded),
        (TelemetryField::Checksum, FieldCodec::CHECKSUM_BITS, FieldTransform::Checksum),
    ];
    table
        .into_iter()
        .map(|(field, width, transform)| (field, FieldCodec { width, transform }))
        .collect()
});
