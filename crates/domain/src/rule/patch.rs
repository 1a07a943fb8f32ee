//! Rule patch — a partial update to a rule's configurable fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::ActionParams;
use crate::error::ValidationError;

use super::Rule;

/// Recognised, optional rule fields. Unknown JSON keys are ignored.
///
/// Identity, kind, condition and action are fixed by the rule template and
/// cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePatch {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub threshold_min: Option<f64>,
    pub threshold_max: Option<f64>,
    /// Cooldown in seconds.
    pub cooldown: Option<f64>,
    pub action_params: Option<ActionParams>,
}

impl RulePatch {
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn thresholds(mut self, min: f64, max: f64) -> Self {
        self.threshold_min = Some(min);
        self.threshold_max = Some(max);
        self
    }

    #[must_use]
    pub fn cooldown_secs(mut self, secs: f64) -> Self {
        self.cooldown = Some(secs);
        self
    }

    /// Apply every present field to `rule`.
    ///
    /// On error `rule` may be partially updated; callers apply patches to a
    /// copy and commit only on success.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCooldown`] for a negative or
    /// non-finite cooldown, or any error from [`Rule::validate`].
    pub fn apply_to(&self, rule: &mut Rule) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            rule.name.clone_from(name);
        }
        if let Some(enabled) = self.enabled {
            rule.enabled = enabled;
        }
        if let Some(min) = self.threshold_min {
            rule.threshold_min = min;
        }
        if let Some(max) = self.threshold_max {
            rule.threshold_max = max;
        }
        if let Some(secs) = self.cooldown {
            rule.cooldown =
                Duration::try_from_secs_f64(secs).map_err(|_| ValidationError::InvalidCooldown)?;
        }
        if let Some(params) = &self.action_params {
            rule.action_params.clone_from(params);
        }
        rule.validate()
    }
}
