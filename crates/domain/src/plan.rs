//! Production plan — an optional output target per device, with progress
//! and completion-time estimates.

use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, ActionParams, TriggeredAction};
use crate::id::DeviceId;
use crate::rule::Rule;
use crate::time::Timestamp;

/// Target output for one device.
///
/// A `target_count` of 0 means "no target": the plan never completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionPlan {
    pub device_id: DeviceId,
    pub target_count: u64,
    pub start_time: Timestamp,
    /// Set when the plan's completion action fired.
    pub end_time: Option<Timestamp>,
    pub auto_stop_on_complete: bool,
    pub auto_switch_mode: Option<String>,
}

impl ProductionPlan {
    #[must_use]
    pub fn new(
        device_id: DeviceId,
        target_count: u64,
        auto_stop_on_complete: bool,
        auto_switch_mode: Option<String>,
        start_time: Timestamp,
    ) -> Self {
        Self {
            device_id,
            target_count,
            start_time,
            end_time: None,
            auto_stop_on_complete,
            auto_switch_mode: auto_switch_mode.filter(|mode| !mode.is_empty()),
        }
    }

    /// Whether the plan carries a real target.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target_count > 0
    }

    #[must_use]
    pub fn is_reached(&self, current_count: u64) -> bool {
        self.has_target() && current_count >= self.target_count
    }

    /// The action emitted when the target is reached, built from the
    /// production rule's identity.
    ///
    /// A configured `auto_switch_mode` takes precedence over stopping.
    #[must_use]
    pub fn completion_action(&self, rule: &Rule, current_count: u64) -> TriggeredAction {
        let mut action = rule.fire(format!(
            "production target reached {current_count}/{}",
            self.target_count
        ));
        action.params = ActionParams::new();
        action.action = if self.auto_stop_on_complete {
            ActionKind::Stop
        } else {
            ActionKind::None
        };
        if let Some(mode) = &self.auto_switch_mode {
            action.action = ActionKind::SwitchMode;
            action
                .params
                .insert("mode".to_string(), serde_json::Value::from(mode.as_str()));
        }
        action
    }

    /// Progress towards the target at `now`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, current_count: u64, now: Timestamp) -> PlanProgress {
        if !self.has_target() {
            return PlanProgress::without_plan(current_count);
        }
        let target = self.target_count;
        let ratio = (current_count as f64 / target as f64).min(1.0);
        let remaining = target.saturating_sub(current_count);

        PlanProgress {
            has_plan: true,
            target,
            current: current_count,
            progress: (ratio * 1000.0).round() / 10.0,
            remaining,
            estimated_completion_time: self.estimate_completion(current_count, remaining, now),
        }
    }

    /// Linear extrapolation from the average rate since `start_time`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn estimate_completion(
        &self,
        current_count: u64,
        remaining: u64,
        now: Timestamp,
    ) -> Option<Timestamp> {
        if current_count == 0 || remaining == 0 {
            return None;
        }
        let elapsed_ms = (now - self.start_time).num_milliseconds();
        if elapsed_ms <= 0 {
            return None;
        }
        let rate = current_count as f64 / (elapsed_ms as f64 / 1000.0);
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }
        let remaining_ms = (remaining as f64 / rate * 1000.0).round();
        if !remaining_ms.is_finite() {
            return None;
        }
        let delta = chrono::TimeDelta::try_milliseconds(remaining_ms as i64)?;
        now.checked_add_signed(delta)
    }
}

/// Progress report for a device's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub has_plan: bool,
    pub target: u64,
    pub current: u64,
    /// Percentage in `[0, 100]`, `min(100, 100 * current / target)`.
    ///
    /// Rounded to one decimal for display; `remaining` carries the exact figure.
    pub progress: f64,
    pub remaining: u64,
    pub estimated_completion_time: Option<Timestamp>,
}

impl PlanProgress {
    /// Report for a device without an active plan.
    #[must_use]
    pub fn without_plan(current_count: u64) -> Self {
        Self {
            has_plan: false,
            target: 0,
            current: current_count,
            progress: 0.0,
            remaining: 0,
            estimated_completion_time: None,
        }
    }
}
