//! Metric — the environmental quantities monitored on a production line.

use serde::{Deserialize, Serialize};

/// An environmental quantity with its own threshold rule and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
}

impl Metric {
    /// Every monitored metric, in evaluation order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Pressure];

    /// Display unit used in reason strings.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "\u{b0}C",
            Self::Humidity => "%",
            Self::Pressure => "kPa",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temperature => f.write_str("temperature"),
            Self::Humidity => f.write_str("humidity"),
            Self::Pressure => f.write_str("pressure"),
        }
    }
}

/// One value per [`Metric`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerMetric<T> {
    pub temperature: T,
    pub humidity: T,
    pub pressure: T,
}

impl<T> PerMetric<T> {
    /// Value for `metric`.
    #[must_use]
    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Pressure => &self.pressure,
        }
    }

    /// Mutable value for `metric`.
    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
        }
    }

    /// Iterate `(metric, value)` pairs in [`Metric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &T)> {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}
