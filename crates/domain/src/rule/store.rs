//! Rule store — the per-device rule set, built from a fixed template.

use std::time::Duration;

use serde::Serialize;

use crate::action::{ActionKind, ActionParams};
use crate::error::{LineWatchError, NotFoundError};
use crate::id::RuleId;
use crate::metric::Metric;
use crate::threshold::ThresholdConfig;

use super::{Rule, RuleCondition, RuleKind, RulePatch};

pub const TEMPERATURE_PAUSE: &str = "temp_danger_pause";
pub const HUMIDITY_PAUSE: &str = "humidity_danger_pause";
pub const PRESSURE_PAUSE: &str = "pressure_danger_pause";
pub const PRODUCTION_COMPLETE: &str = "production_complete";
pub const RECOVERY_START: &str = "all_normal_start";

/// The fixed rule set of one device.
///
/// Every device gets its own copy; nothing here is shared across devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleStore {
    temperature: Rule,
    humidity: Rule,
    pressure: Rule,
    production: Rule,
    recovery: Rule,
}

impl RuleStore {
    /// Build the default rule set, with environmental bands taken from
    /// `thresholds`.
    ///
    /// The production rule starts disabled; setting a plan arms it.
    #[must_use]
    pub fn with_defaults(thresholds: &ThresholdConfig) -> Self {
        let mut store = Self {
            temperature: template(
                TEMPERATURE_PAUSE,
                "Pause on temperature out of range",
                RuleKind::Temperature,
                RuleCondition::OutOfRange,
                ActionKind::Pause,
                10,
            ),
            humidity: template(
                HUMIDITY_PAUSE,
                "Pause on humidity out of range",
                RuleKind::Humidity,
                RuleCondition::OutOfRange,
                ActionKind::Pause,
                10,
            ),
            pressure: template(
                PRESSURE_PAUSE,
                "Pause on pressure out of range",
                RuleKind::Pressure,
                RuleCondition::OutOfRange,
                ActionKind::Pause,
                10,
            ),
            production: template(
                PRODUCTION_COMPLETE,
                "Stop when production target is reached",
                RuleKind::Production,
                RuleCondition::GreaterOrEqual,
                ActionKind::Stop,
                5,
            ),
            recovery: template(
                RECOVERY_START,
                "Start when all parameters are normal",
                RuleKind::RecoveryAllNormal,
                RuleCondition::AllNormal,
                ActionKind::Start,
                10,
            ),
        };
        store.production.enabled = false;
        store.sync_thresholds(thresholds);
        store
    }

    /// Push the environmental bands from `thresholds` onto the three
    /// metric rules.
    pub fn sync_thresholds(&mut self, thresholds: &ThresholdConfig) {
        for metric in Metric::ALL {
            let range = thresholds.range(metric);
            let rule = self.metric_rule_mut(metric);
            rule.threshold_min = range.min;
            rule.threshold_max = range.max;
        }
    }

    /// The out-of-range rule for `metric`.
    #[must_use]
    pub fn metric_rule(&self, metric: Metric) -> &Rule {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Pressure => &self.pressure,
        }
    }

    pub fn metric_rule_mut(&mut self, metric: Metric) -> &mut Rule {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
        }
    }

    #[must_use]
    pub fn production(&self) -> &Rule {
        &self.production
    }

    pub fn production_mut(&mut self) -> &mut Rule {
        &mut self.production
    }

    #[must_use]
    pub fn recovery(&self) -> &Rule {
        &self.recovery
    }

    pub fn recovery_mut(&mut self) -> &mut Rule {
        &mut self.recovery
    }

    /// Rules in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        [
            &self.temperature,
            &self.humidity,
            &self.pressure,
            &self.production,
            &self.recovery,
        ]
        .into_iter()
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.iter().find(|rule| rule.id.as_str() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Rule> {
        [
            &mut self.temperature,
            &mut self.humidity,
            &mut self.pressure,
            &mut self.production,
            &mut self.recovery,
        ]
        .into_iter()
        .find(|rule| rule.id.as_str() == id)
    }

    /// Apply `patch` to the rule named `id`.
    ///
    /// The rule is left untouched unless the whole patch is valid.
    ///
    /// # Errors
    ///
    /// Returns [`LineWatchError::NotFound`] for an unknown id and
    /// [`LineWatchError::Validation`] when the patched rule is invalid.
    pub fn update(&mut self, id: &str, patch: &RulePatch) -> Result<Rule, LineWatchError> {
        let rule = self.get_mut(id).ok_or_else(|| NotFoundError {
            entity: "Rule",
            id: id.to_string(),
        })?;
        let mut patched = rule.clone();
        patch.apply_to(&mut patched)?;
        *rule = patched.clone();
        Ok(patched)
    }
}

fn template(
    id: &str,
    name: &str,
    kind: RuleKind,
    condition: RuleCondition,
    action: ActionKind,
    cooldown_secs: u64,
) -> Rule {
    Rule {
        id: RuleId::from(id),
        name: name.to_string(),
        enabled: true,
        kind,
        condition,
        threshold_min: 0.0,
        threshold_max: 0.0,
        action,
        action_params: ActionParams::new(),
        cooldown: Duration::from_secs(cooldown_secs),
        last_triggered: None,
    }
}
