use super::telemetry_field::TelemetryField;
use strum::{EnumCount, IntoEnumIterator};

/// Dense telemetry storage indexed by [`TelemetryField`].
///
/// Absent fields read as `0.0` through [`TelemetrySnapshot::get`]; callers that
/// need to tell "missing" from "zero" use [`TelemetrySnapshot::try_get`].
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    values: [Option<f64>; TelemetryField::COUNT],
}

impl Default for TelemetrySnapshot {
    fn default() -> Self { Self::new() }
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self {
            values: [None; TelemetryField::COUNT],
        }
    }

    pub fn get(&self, field: TelemetryField) -> f64 { self.values[field.index()].unwrap_or(0.0) }

    pub fn try_get(&self, field: TelemetryField) -> Option<f64> { self.values[field.index()] }

    pub fn set(&mut self, field: TelemetryField, value: f64) {
        self.values[field.index()] = Some(value);
    }

    pub fn remove(&mut self, field: TelemetryField) -> Option<f64> {
        self.values[field.index()].take()
    }

    pub fn contains(&self, field: TelemetryField) -> bool { self.values[field.index()].is_some() }

    /// Number of fields currently present.
    pub fn len(&self) -> usize { self.values.iter().filter(|v| v.is_some()).count() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Iterates over present fields in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (TelemetryField, f64)> + '_ {
        TelemetryField::iter().filter_map(|f| self.try_get(f).map(|v| (f, v)))
    }
}

impl FromIterator<(TelemetryField, f64)> for TelemetrySnapshot {
    fn from_iter<I: IntoIterator<Item = (TelemetryField, f64)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (field, value) in iter {
            snapshot.set(field, value);
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_read_as_zero() {
        let mut snapshot = TelemetrySnapshot::new();
        assert_eq!(snapshot.get(TelemetryField::FuelAmount), 0.0);
        assert!(snapshot.try_get(TelemetryField::FuelAmount).is_none());
        snapshot.set(TelemetryField::FuelAmount, 42.5);
        assert_eq!(snapshot.get(TelemetryField::FuelAmount), 42.5);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.remove(TelemetryField::FuelAmount), Some(42.5));
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_iter_follows_enumeration_order() {
        let snapshot: TelemetrySnapshot = [
            (TelemetryField::RollDeg, 3.0),
            (TelemetryField::Latitude, 1.0),
            (TelemetryField::YawDeg, 2.0),
        ]
        .into_iter()
        .collect();
        let fields: Vec<_> = snapshot.iter().map(|(f, _)| f).collect();
        assert_eq!(
            fields,
            vec![TelemetryField::Latitude, TelemetryField::YawDeg, TelemetryField::RollDeg]
        );
    }
}
