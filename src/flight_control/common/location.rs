use std::fmt::{Display, Formatter};

/// A geodetic position. Latitude and longitude in degrees, altitude in
/// meters above mean sea level.
///
/// Locations are plain values: every tick produces fresh ones instead of
/// mutating the previous position.
#[derive(Debug, PartialEq, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn latitude(&self) -> f64 { self.latitude }

    pub fn longitude(&self) -> f64 { self.longitude }

    pub fn altitude(&self) -> f64 { self.altitude }

    /// Same horizontal position at a different altitude.
    pub fn with_altitude(&self, altitude: f64) -> Self {
        Self::new(self.latitude, self.longitude, altitude)
    }

    /// Signed altitude difference `other - self`.
    pub fn altitude_to(&self, other: &Location) -> f64 { other.altitude - self.altitude }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.6}, {:.6}, {:.1}m]", self.latitude, self.longitude, self.altitude)
    }
}
