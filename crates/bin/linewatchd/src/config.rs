//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `linewatch.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use linewatch_adapter_virtual::Excursion;
use linewatch_domain::id::DeviceId;
use linewatch_domain::threshold::ThresholdConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Threshold record every new device starts with.
    pub thresholds: ThresholdConfig,
    /// Virtual line settings.
    pub simulation: SimulationConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Virtual line and sensor settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ids of the simulated lines.
    pub devices: Vec<String>,
    /// Milliseconds between simulation steps.
    pub tick_ms: u64,
    /// Production plan applied to every line at startup.
    pub plan: Option<PlanConfig>,
    /// Temperature excursion injected into the sensor profile.
    pub excursion: Option<ExcursionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanConfig {
    pub target_count: u64,
    #[serde(default = "default_auto_stop")]
    pub auto_stop: bool,
    #[serde(default)]
    pub auto_switch_mode: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ExcursionConfig {
    /// First affected tick.
    pub start: u64,
    /// Number of affected ticks.
    pub ticks: u64,
    pub temperature: f64,
}

impl Config {
    /// Load configuration from `linewatch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("linewatch.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LINEWATCH_DEVICES") {
            self.simulation.devices = val
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = std::env::var("LINEWATCH_TICK_MS")
            && let Ok(tick_ms) = val.parse()
        {
            self.simulation.tick_ms = tick_ms;
        }
        if let Ok(val) = std::env::var("LINEWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::Validation(
                "simulation.tick_ms must be non-zero".to_string(),
            ));
        }
        if self.simulation.devices.is_empty() {
            return Err(ConfigError::Validation(
                "simulation.devices must list at least one device".to_string(),
            ));
        }
        if self.simulation.devices.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "simulation.devices must not contain blank ids".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured device ids.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.simulation
            .devices
            .iter()
            .map(|id| DeviceId::new(id.as_str()))
            .collect()
    }

    /// Configured excursion in sensor-profile terms.
    #[must_use]
    pub fn excursion(&self) -> Option<Excursion> {
        self.simulation.excursion.map(|e| Excursion {
            start: e.start,
            len: e.ticks,
            temperature: e.temperature,
        })
    }

    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.simulation.tick_ms)
    }
}

fn default_auto_stop() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "linewatchd=info,linewatch_app=info,linewatch_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            devices: vec!["device_001".to_string()],
            tick_ms: 1000,
            plan: None,
            excursion: Some(ExcursionConfig {
                start: 20,
                ticks: 5,
                temperature: 40.0,
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
