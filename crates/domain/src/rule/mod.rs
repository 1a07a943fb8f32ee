//! Rule — a configurable condition → action binding with its own cooldown.
//!
//! Every device owns a deep copy of the default rule set (see [`RuleStore`]).
//! Rules are only changed through [`RulePatch`]es, threshold sync, and
//! trigger stamping.

mod patch;
mod store;

pub use patch::RulePatch;
pub use store::{
    HUMIDITY_PAUSE, PRESSURE_PAUSE, PRODUCTION_COMPLETE, RECOVERY_START, RuleStore,
    TEMPERATURE_PAUSE,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, ActionParams, TriggeredAction};
use crate::error::ValidationError;
use crate::id::RuleId;
use crate::metric::Metric;
use crate::threshold::ValueRange;
use crate::time::{Timestamp, duration_secs, has_elapsed};

/// What a rule watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Temperature,
    Humidity,
    Pressure,
    Production,
    #[serde(rename = "all_normal_recover")]
    RecoveryAllNormal,
}

impl RuleKind {
    /// The environmental metric behind this rule, if it watches one.
    #[must_use]
    pub fn metric(self) -> Option<Metric> {
        match self {
            Self::Temperature => Some(Metric::Temperature),
            Self::Humidity => Some(Metric::Humidity),
            Self::Pressure => Some(Metric::Pressure),
            Self::Production | Self::RecoveryAllNormal => None,
        }
    }
}

impl From<Metric> for RuleKind {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Temperature => Self::Temperature,
            Metric::Humidity => Self::Humidity,
            Metric::Pressure => Self::Pressure,
        }
    }
}

/// How the rule's thresholds are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    /// `value < min || value > max`.
    OutOfRange,
    /// `value >= max` (production target reached).
    #[serde(rename = "gte")]
    GreaterOrEqual,
    /// Every monitored metric is stable and in range.
    AllNormal,
}

/// A named, configurable condition-to-action binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub enabled: bool,
    pub kind: RuleKind,
    pub condition: RuleCondition,
    pub threshold_min: f64,
    pub threshold_max: f64,
    pub action: ActionKind,
    #[serde(default)]
    pub action_params: ActionParams,
    #[serde(with = "duration_secs")]
    pub cooldown: Duration,
    #[serde(default)]
    pub last_triggered: Option<Timestamp>,
}

impl Rule {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] or [`ValidationError::EmptyName`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// The `[threshold_min, threshold_max]` band.
    #[must_use]
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.threshold_min, self.threshold_max)
    }

    /// Whether the cooldown since the last trigger has fully elapsed.
    #[must_use]
    pub fn cooldown_elapsed(&self, now: Timestamp) -> bool {
        has_elapsed(self.last_triggered, now, self.cooldown)
    }

    /// Enabled and out of cooldown.
    #[must_use]
    pub fn is_armed(&self, now: Timestamp) -> bool {
        self.enabled && self.cooldown_elapsed(now)
    }

    /// Record a trigger at `now`. The stamp never moves backwards.
    pub fn mark_triggered(&mut self, now: Timestamp) {
        self.last_triggered = Some(match self.last_triggered {
            Some(prev) if prev > now => prev,
            _ => now,
        });
    }

    /// Build the action this rule emits, using its configured action kind.
    #[must_use]
    pub fn fire(&self, reason: impl Into<String>) -> TriggeredAction {
        TriggeredAction {
            rule_id: self.id.clone(),
            rule_name: self.name.clone(),
            action: self.action,
            params: self.action_params.clone(),
            reason: reason.into(),
            metric: self.kind.metric(),
        }
    }
}
