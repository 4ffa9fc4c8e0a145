pub(crate) mod platform;
pub(crate) mod telemetry;
pub(crate) mod telemetry_field;
mod vehicle;

pub use platform::{Platform, PlatformSpec, UavCategory};
pub use telemetry::TelemetrySnapshot;
pub use telemetry_field::{FieldCategory, TelemetryField, Unit};
pub use vehicle::{Capabilities, Uav};

use std::fmt::{Display, Formatter};

/// Unique identifier of a UAV within the mission registry.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, serde::Serialize, serde::Deserialize)]
pub struct TailId(u32);

impl TailId {
    pub const fn new(id: u32) -> Self { Self(id) }

    pub fn get(self) -> u32 { self.0 }
}

impl Display for TailId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "UAV-{:04}", self.0) }
}
