//! Deterministic sensor profile.
//!
//! Temperature follows a slow sine wave around its baseline; humidity and
//! pressure hold steady. An optional [`Excursion`] forces the temperature
//! above its limit for a fixed number of ticks, then the wave resumes.

use linewatch_domain::metric::Metric;

/// One sample of every monitored metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl SensorReading {
    #[must_use]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
        }
    }
}

/// Temperature held at `temperature` for ticks `start..start + len`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Excursion {
    pub start: u64,
    pub len: u64,
    pub temperature: f64,
}

impl Excursion {
    fn covers(&self, tick: u64) -> bool {
        tick >= self.start && tick - self.start < self.len
    }
}

/// Produces the reading for a given tick. Same tick, same reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    baseline: SensorReading,
    wave_amplitude: f64,
    excursion: Option<Excursion>,
}

impl Default for SensorProfile {
    fn default() -> Self {
        Self {
            baseline: SensorReading {
                temperature: 25.0,
                humidity: 55.0,
                pressure: 101.3,
            },
            wave_amplitude: 2.0,
            excursion: None,
        }
    }
}

impl SensorProfile {
    #[must_use]
    pub fn with_excursion(mut self, excursion: Excursion) -> Self {
        self.excursion = Some(excursion);
        self
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reading(&self, tick: u64) -> SensorReading {
        let temperature = match self.excursion {
            Some(excursion) if excursion.covers(tick) => excursion.temperature,
            _ => self.baseline.temperature + self.wave_amplitude * (tick as f64 / 10.0).sin(),
        };
        SensorReading {
            temperature: round1(temperature),
            humidity: self.baseline.humidity,
            pressure: self.baseline.pressure,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
