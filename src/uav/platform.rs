use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

/// Concrete airframes the simulator knows about.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, serde::Serialize, serde::Deserialize)]
pub enum Platform {
    Hermes450,
    Hermes900,
    HeronTp,
    Searcher,
}

/// Decides which capability map a platform carries.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display)]
pub enum UavCategory {
    Armed,
    Surveillance,
}

/// Performance and radio constants of one airframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformSpec {
    pub category: UavCategory,
    pub mass_kg: f64,
    pub max_thrust_n: f64,
    pub cruise_speed_kmph: f64,
    pub max_acceleration_mps2: f64,
    pub max_deceleration_mps2: f64,
    pub drag_coefficient: f64,
    pub lift_coefficient: f64,
    pub wing_area_m2: f64,
    /// Fuel percent burned per newton of thrust per second.
    pub fuel_consumption_rate: f64,
    pub max_engine_rpm: f64,
    pub max_operating_temp_c: f64,
    pub overheat_temp_c: f64,
    pub tx_power_dbm: f64,
    pub tx_antenna_gain_dbi: f64,
    pub rx_antenna_gain_dbi: f64,
    pub system_loss_db: f64,
    pub carrier_frequency_mhz: f64,
    /// Stores per weapon for armed platforms, sensor names for surveillance ones.
    pub payload: &'static [(&'static str, u32)],
}

impl Platform {
    pub fn spec(self) -> &'static PlatformSpec { &PLATFORM_SPEC_LOOKUP[&self] }

    pub fn category(self) -> UavCategory { self.spec().category }
}

static PLATFORM_SPEC_LOOKUP: LazyLock<HashMap<Platform, PlatformSpec>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    let specs = vec![
        (
            Platform::Hermes450,
            PlatformSpec {
                category: UavCategory::Surveillance,
                mass_kg: 450.0,
                max_thrust_n: 1800.0,
                cruise_speed_kmph: 130.0,
                max_acceleration_mps2: 2.5,
                max_deceleration_mps2: 3.0,
                drag_coefficient: 0.03,
                lift_coefficient: 0.9,
                wing_area_m2: 10.5,
                fuel_consumption_rate: 1.4e-6,
                max_engine_rpm: 7000.0,
                max_operating_temp_c: 95.0,
                overheat_temp_c: 120.0,
                tx_power_dbm: 33.0,
                tx_antenna_gain_dbi: 3.0,
                rx_antenna_gain_dbi: 12.0,
                system_loss_db: 3.0,
                carrier_frequency_mhz: 2400.0,
                payload: &[("eo_ir_turret", 1), ("sar_radar", 1)],
            },
        ),
        (
            Platform::Hermes900,
            PlatformSpec {
                category: UavCategory::Armed,
                mass_kg: 1180.0,
                max_thrust_n: 4000.0,
                cruise_speed_kmph: 220.0,
                max_acceleration_mps2: 2.0,
                max_deceleration_mps2: 2.5,
                drag_coefficient: 0.028,
                lift_coefficient: 1.0,
                wing_area_m2: 18.0,
                fuel_consumption_rate: 8.0e-7,
                max_engine_rpm: 5800.0,
                max_operating_temp_c: 100.0,
                overheat_temp_c: 125.0,
                tx_power_dbm: 36.0,
                tx_antenna_gain_dbi: 5.0,
                rx_antenna_gain_dbi: 15.0,
                system_loss_db: 3.0,
                carrier_frequency_mhz: 4400.0,
                payload: &[("guided_missile", 2), ("guided_bomb", 2)],
            },
        ),
        (
            Platform::HeronTp,
            PlatformSpec {
                category: UavCategory::Armed,
                mass_kg: 4650.0,
                max_thrust_n: 9000.0,
                cruise_speed_kmph: 300.0,
                max_acceleration_mps2: 1.5,
                max_deceleration_mps2: 2.0,
                drag_coefficient: 0.025,
                lift_coefficient: 1.1,
                wing_area_m2: 40.0,
                fuel_consumption_rate: 3.5e-7,
                max_engine_rpm: 2200.0,
                max_operating_temp_c: 110.0,
                overheat_temp_c: 140.0,
                tx_power_dbm: 40.0,
                tx_antenna_gain_dbi: 6.0,
                rx_antenna_gain_dbi: 18.0,
                system_loss_db: 4.0,
                carrier_frequency_mhz: 5100.0,
                payload: &[("guided_missile", 4)],
            },
        ),
        (
            Platform::Searcher,
            PlatformSpec {
                category: UavCategory::Surveillance,
                mass_kg: 436.0,
                max_thrust_n: 1600.0,
                cruise_speed_kmph: 180.0,
                max_acceleration_mps2: 2.5,
                max_deceleration_mps2: 3.0,
                drag_coefficient: 0.032,
                lift_coefficient: 0.85,
                wing_area_m2: 9.0,
                fuel_consumption_rate: 1.7e-6,
                max_engine_rpm: 7200.0,
                max_operating_temp_c: 90.0,
                overheat_temp_c: 115.0,
                tx_power_dbm: 33.0,
                tx_antenna_gain_dbi: 3.0,
                rx_antenna_gain_dbi: 12.0,
                system_loss_db: 3.0,
                carrier_frequency_mhz: 2400.0,
                payload: &[("eo_ir_turret", 1)],
            },
        ),
    ];

    for (platform, spec) in specs {
        lookup.insert(platform, spec);
    }
    lookup
});

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_platform_has_spec() {
        for platform in Platform::iter() {
            let spec = platform.spec();
            assert!(spec.cruise_speed_kmph > 0.0, "{platform} without cruise speed");
            assert!(spec.overheat_temp_c > spec.max_operating_temp_c);
            assert!(!spec.payload.is_empty());
        }
    }
}
