use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from the environment with fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    tick_ms: u64,
    telemetry_host: String,
    icd_dir: PathBuf,
    base_port: u16,
}

impl SimConfig {
    const DEFAULT_TICK_MS: u64 = 1000;
    const DEFAULT_TELEMETRY_HOST: &'static str = "127.0.0.1";
    const DEFAULT_ICD_DIR: &'static str = "./icd";
    const DEFAULT_BASE_PORT: u16 = 5000;

    pub fn from_env() -> Self { Self::from_lookup(|key| env::var(key).ok()) }

    /// Builds the config from an arbitrary variable source. Unparseable
    /// values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tick_ms = lookup("UAV_SIM_TICK_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(Self::DEFAULT_TICK_MS);
        let telemetry_host =
            lookup("UAV_SIM_TELEMETRY_HOST").unwrap_or_else(|| Self::DEFAULT_TELEMETRY_HOST.to_string());
        let icd_dir = lookup("UAV_SIM_ICD_DIR").map_or_else(|| PathBuf::from(Self::DEFAULT_ICD_DIR), PathBuf::from);
        let base_port = lookup("UAV_SIM_BASE_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(Self::DEFAULT_BASE_PORT);
        Self {
            tick_ms,
            telemetry_host,
            icd_dir,
            base_port,
        }
    }

    pub fn tick_interval(&self) -> Duration { Duration::from_millis(self.tick_ms) }

    /// Simulated seconds that pass per tick.
    #[allow(clippy::cast_precision_loss)]
    pub fn tick_secs(&self) -> f64 { self.tick_ms as f64 / 1000.0 }

    pub fn telemetry_host(&self) -> &str { &self.telemetry_host }

    pub fn icd_dir(&self) -> &PathBuf { &self.icd_dir }

    pub fn base_port(&self) -> u16 { self.base_port }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_and_overrides() {
        let defaults = SimConfig::from_lookup(|_| None);
        assert_eq!(defaults.tick_interval(), Duration::from_secs(1));
        assert_eq!(defaults.tick_secs(), 1.0);
        assert_eq!(defaults.telemetry_host(), "127.0.0.1");
        assert_eq!(defaults.base_port(), 5000);

        let vars: HashMap<&str, &str> =
            [("UAV_SIM_TICK_MS", "250"), ("UAV_SIM_BASE_PORT", "not-a-port"), ("UAV_SIM_ICD_DIR", "/tmp/icd")]
                .into_iter()
                .collect();
        let cfg = SimConfig::from_lookup(|k| vars.get(k).map(ToString::to_string));
        assert_eq!(cfg.tick_secs(), 0.25);
        assert_eq!(cfg.base_port(), 5000);
        assert_eq!(cfg.icd_dir(), &PathBuf::from("/tmp/icd"));
    }
}
