//! Threshold configuration — the acceptable band for each metric.

use serde::{Deserialize, Serialize};

use crate::metric::Metric;

/// Closed interval `[min, max]` a reading must fall within.
///
/// `min > max` is accepted as given; such a range contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Whether `value` lies strictly below `min` or strictly above `max`.
    ///
    /// Not the negation of [`contains`](Self::contains): NaN is neither.
    #[must_use]
    pub fn excludes(&self, value: f64) -> bool {
        value < self.min || value > self.max
    }
}

impl std::fmt::Display for ValueRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Per-device threshold record, kept in sync with the environmental rules.
///
/// Field names follow the wire names used by operator dashboards
/// (`tempMin`, `humidityMax`, …). Missing fields fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThresholdConfig {
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub pressure_min: f64,
    pub pressure_max: f64,
}

impl ThresholdConfig {
    /// The band configured for `metric`.
    #[must_use]
    pub fn range(&self, metric: Metric) -> ValueRange {
        match metric {
            Metric::Temperature => ValueRange::new(self.temp_min, self.temp_max),
            Metric::Humidity => ValueRange::new(self.humidity_min, self.humidity_max),
            Metric::Pressure => ValueRange::new(self.pressure_min, self.pressure_max),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_min: 10.0,
            temp_max: 35.0,
            humidity_min: 20.0,
            humidity_max: 80.0,
            pressure_min: 90.0,
            pressure_max: 110.0,
        }
    }
}
