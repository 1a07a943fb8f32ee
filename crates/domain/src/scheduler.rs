//! Device scheduler — the complete decision state of one production line.
//!
//! Combines the rule store, threshold record, pause state machine and
//! production plan, and evaluates each incoming reading against them.
//! All methods are synchronous and take `now` explicitly; callers own
//! locking and the clock.
//!
//! Threshold detection is **edge-triggered**: a pause fires on the reading
//! that crosses from in-range to out-of-range, never again while the value
//! stays out.

use serde::Serialize;

use crate::action::TriggeredAction;
use crate::error::LineWatchError;
use crate::id::DeviceId;
use crate::metric::{Metric, PerMetric};
use crate::pause::{PauseState, PauseStateMachine};
use crate::plan::{PlanProgress, ProductionPlan};
use crate::rule::{Rule, RulePatch, RuleStore};
use crate::threshold::ThresholdConfig;
use crate::time::Timestamp;

/// Scheduler state for a single device.
#[derive(Debug, Clone)]
pub struct DeviceScheduler {
    device_id: DeviceId,
    rules: RuleStore,
    thresholds: ThresholdConfig,
    pause: PauseStateMachine,
    plan: Option<ProductionPlan>,
    last_check_time: Option<Timestamp>,
}

impl DeviceScheduler {
    /// Fresh state with the default rule set and the given thresholds.
    #[must_use]
    pub fn new(device_id: DeviceId, thresholds: ThresholdConfig) -> Self {
        Self {
            device_id,
            rules: RuleStore::with_defaults(&thresholds),
            thresholds,
            pause: PauseStateMachine::new(),
            plan: None,
            last_check_time: None,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    #[must_use]
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    #[must_use]
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    #[must_use]
    pub fn pause(&self) -> &PauseStateMachine {
        &self.pause
    }

    #[must_use]
    pub fn plan(&self) -> Option<&ProductionPlan> {
        self.plan.as_ref()
    }

    /// Evaluate one environmental reading.
    ///
    /// Returns the `pause` action on a rising edge when the metric's rule is
    /// armed, otherwise the `start` action if this reading completed a
    /// recovery, otherwise `None`.
    pub fn check_metric(
        &mut self,
        metric: Metric,
        value: f64,
        now: Timestamp,
    ) -> Option<TriggeredAction> {
        self.last_check_time = Some(now);

        let range = self.rules.metric_rule(metric).range();
        let transition = self.pause.record(metric, value, range);

        let armed = self.rules.metric_rule(metric).is_armed(now);
        let paused = if transition.is_rising_edge() && armed {
            let rule = self.rules.metric_rule_mut(metric);
            rule.mark_triggered(now);
            let reason = format!(
                "{metric} {value}{unit} out of range {range}{unit}",
                unit = metric.unit()
            );
            self.pause.enter_paused(&reason);
            Some(rule.fire(reason))
        } else {
            None
        };

        // A pause fired above leaves its metric out of range, so this can
        // only resume when nothing fired.
        let resumed = self.pause.try_resume(&mut self.rules, now);
        paused.or(resumed)
    }

    /// Compare a cumulative production count against the active plan.
    ///
    /// Fires at most once: the production rule is disabled after firing and
    /// the plan is stamped with its `end_time`. Setting a new plan re-arms it.
    pub fn check_production(
        &mut self,
        current_count: u64,
        now: Timestamp,
    ) -> Option<TriggeredAction> {
        self.last_check_time = Some(now);

        let plan = self.plan.as_mut().filter(|plan| plan.has_target())?;
        let rule = self.rules.production_mut();
        if !rule.is_armed(now) || !plan.is_reached(current_count) {
            return None;
        }

        rule.mark_triggered(now);
        rule.enabled = false;
        plan.end_time = Some(now);
        Some(plan.completion_action(rule, current_count))
    }

    /// Forget any scheduler-caused pause. Called for every operator command.
    pub fn clear_scheduler_pause(&mut self) {
        self.pause.clear();
    }

    /// Create or replace the production plan and re-arm the production rule.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_plan(
        &mut self,
        target_count: u64,
        auto_stop: bool,
        auto_switch_mode: Option<String>,
        now: Timestamp,
    ) -> ProductionPlan {
        let plan = ProductionPlan::new(
            self.device_id.clone(),
            target_count,
            auto_stop,
            auto_switch_mode,
            now,
        );
        let rule = self.rules.production_mut();
        rule.threshold_max = target_count as f64;
        rule.enabled = plan.has_target();
        self.plan = Some(plan.clone());
        plan
    }

    /// Drop the production plan and disarm the production rule.
    pub fn clear_plan(&mut self) -> Option<ProductionPlan> {
        self.rules.production_mut().enabled = false;
        self.plan.take()
    }

    #[must_use]
    pub fn plan_progress(&self, current_count: u64, now: Timestamp) -> PlanProgress {
        self.plan.as_ref().map_or_else(
            || PlanProgress::without_plan(current_count),
            |plan| plan.progress(current_count, now),
        )
    }

    /// Replace the threshold record and push the bands onto the rules.
    pub fn update_thresholds(&mut self, thresholds: ThresholdConfig) {
        self.rules.sync_thresholds(&thresholds);
        self.thresholds = thresholds;
    }

    /// Patch one rule.
    ///
    /// # Errors
    ///
    /// See [`RuleStore::update`].
    pub fn update_rule(
        &mut self,
        rule_id: &str,
        patch: &RulePatch,
    ) -> Result<Rule, LineWatchError> {
        self.rules.update(rule_id, patch)
    }

    /// Full diagnostic view of this device.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            device_id: self.device_id.clone(),
            rules: self.rules.iter().cloned().collect(),
            thresholds: self.thresholds,
            plan: self.plan.clone(),
            state: self.pause.state(),
            paused_by_scheduler: self.pause.is_scheduler_paused(),
            pause_reasons: self.pause.pause_reasons().to_vec(),
            out_of_range: self.pause.out_of_range().clone(),
            last_check_time: self.last_check_time,
        }
    }
}

/// Read-only view returned by `get_state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerSnapshot {
    pub device_id: DeviceId,
    pub rules: Vec<Rule>,
    pub thresholds: ThresholdConfig,
    pub plan: Option<ProductionPlan>,
    pub state: PauseState,
    pub paused_by_scheduler: bool,
    pub pause_reasons: Vec<String>,
    pub out_of_range: PerMetric<bool>,
    pub last_check_time: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::rule::{PRODUCTION_COMPLETE, TEMPERATURE_PAUSE};
    use crate::time::now;

    fn secs(s: i64) -> chrono::Duration {
        chrono::Duration::seconds(s)
    }

    fn scheduler() -> DeviceScheduler {
        DeviceScheduler::new(DeviceId::from("device_001"), ThresholdConfig::default())
    }

    #[test]
    fn should_pause_on_first_excursion_and_stay_quiet_within_cooldown() {
        let mut s = scheduler();
        let t0 = now();

        let action = s.check_metric(Metric::Temperature, 40.0, t0).unwrap();
        assert_eq!(action.action, ActionKind::Pause);
        assert_eq!(action.rule_id.as_str(), TEMPERATURE_PAUSE);
        assert_eq!(action.metric, Some(Metric::Temperature));
        assert!(action.reason.contains("40"));
        assert!(action.reason.contains("[10, 35]"));

        assert!(s.check_metric(Metric::Temperature, 40.0, t0 + secs(2)).is_none());
        assert!(s.pause().is_scheduler_paused());
    }

    #[test]
    fn should_not_refire_while_value_stays_out_after_cooldown() {
        let mut s = scheduler();
        let t0 = now();
        assert!(s.check_metric(Metric::Temperature, 40.0, t0).is_some());
        assert!(s.check_metric(Metric::Temperature, 41.0, t0 + secs(30)).is_none());
        assert!(s.check_metric(Metric::Temperature, 42.0, t0 + secs(60)).is_none());
    }

    #[test]
    fn should_not_pause_on_new_edge_within_cooldown() {
        let mut s = scheduler();
        let t0 = now();
        assert!(s.check_metric(Metric::Temperature, 40.0, t0).is_some());
        // two readings only, so the history counts as stable
        let resumed = s.check_metric(Metric::Temperature, 20.0, t0 + secs(1)).unwrap();
        assert_eq!(resumed.action, ActionKind::Start);

        assert!(s.check_metric(Metric::Temperature, 40.0, t0 + secs(3)).is_none());
        let rule = s.rules().metric_rule(Metric::Temperature);
        assert_eq!(rule.last_triggered, Some(t0));
        assert!(s.snapshot().out_of_range.temperature);
        assert!(!s.pause().is_scheduler_paused());
    }

    #[test]
    fn should_pause_on_new_edge_after_cooldown() {
        let mut s = scheduler();
        let t0 = now();
        s.check_metric(Metric::Temperature, 40.0, t0);
        s.check_metric(Metric::Temperature, 20.0, t0 + secs(1));
        let action = s.check_metric(Metric::Temperature, 41.0, t0 + secs(10)).unwrap();
        assert_eq!(action.action, ActionKind::Pause);
        assert_eq!(
            s.rules().metric_rule(Metric::Temperature).last_triggered,
            Some(t0 + secs(10))
        );
    }

    #[test]
    fn should_treat_nan_reading_as_not_out_of_range() {
        let mut s = scheduler();
        assert!(s.check_metric(Metric::Temperature, f64::NAN, now()).is_none());
        let snapshot = s.snapshot();
        assert!(!snapshot.out_of_range.temperature);
        assert!(!snapshot.paused_by_scheduler);
        assert!(snapshot.pause_reasons.is_empty());
    }

    #[test]
    fn should_resume_after_three_normal_readings_with_other_metrics_unseen() {
        let mut s = scheduler();
        let t0 = now();
        s.check_metric(Metric::Temperature, 40.0, t0);
        s.check_metric(Metric::Temperature, 40.0, t0 + secs(2));

        assert!(s.check_metric(Metric::Temperature, 20.0, t0 + secs(10)).is_none());
        assert!(s.check_metric(Metric::Temperature, 20.0, t0 + secs(11)).is_none());
        let action = s.check_metric(Metric::Temperature, 20.0, t0 + secs(12)).unwrap();

        assert_eq!(action.action, ActionKind::Start);
        assert_eq!(action.reason, "all monitored parameters recovered");
        let snapshot = s.snapshot();
        assert!(!snapshot.paused_by_scheduler);
        assert!(snapshot.pause_reasons.is_empty());
        assert_eq!(snapshot.state, PauseState::Idle);
    }

    #[test]
    fn should_not_resume_a_manually_cleared_pause() {
        let mut s = scheduler();
        let t0 = now();
        s.check_metric(Metric::Temperature, 40.0, t0);
        s.clear_scheduler_pause();
        for i in 0..5 {
            assert!(s.check_metric(Metric::Temperature, 20.0, t0 + secs(20 + i)).is_none());
        }
    }

    #[test]
    fn should_keep_paused_while_another_metric_is_still_out() {
        let mut s = scheduler();
        let t0 = now();
        s.check_metric(Metric::Temperature, 40.0, t0);
        let humid = s.check_metric(Metric::Humidity, 95.0, t0 + secs(1)).unwrap();
        assert_eq!(humid.metric, Some(Metric::Humidity));
        for i in 0..3 {
            assert!(s.check_metric(Metric::Temperature, 20.0, t0 + secs(20 + i)).is_none());
        }
        assert_eq!(s.snapshot().pause_reasons.len(), 2);

        // humidity has only two readings, so it counts as stable
        let resumed = s.check_metric(Metric::Humidity, 50.0, t0 + secs(30)).unwrap();
        assert_eq!(resumed.action, ActionKind::Start);
    }

    #[test]
    fn should_skip_trigger_when_metric_rule_disabled_but_track_range() {
        let mut s = scheduler();
        s.update_rule(TEMPERATURE_PAUSE, &RulePatch::default().enabled(false))
            .unwrap();
        assert!(s.check_metric(Metric::Temperature, 40.0, now()).is_none());
        assert!(s.snapshot().out_of_range.temperature);
        assert!(!s.pause().is_scheduler_paused());
    }

    #[test]
    fn should_use_updated_thresholds_for_detection() {
        let mut s = scheduler();
        s.update_thresholds(ThresholdConfig {
            temp_max: 45.0,
            ..ThresholdConfig::default()
        });
        assert!(s.check_metric(Metric::Temperature, 40.0, now()).is_none());
        let rule = s.rules().metric_rule(Metric::Temperature);
        assert!((rule.threshold_max - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_stop_once_when_target_reached() {
        let mut s = scheduler();
        let t0 = now();
        s.set_plan(10, true, None, t0);

        assert!(s.check_production(9, t0 + secs(1)).is_none());
        let action = s.check_production(10, t0 + secs(2)).unwrap();
        assert_eq!(action.action, ActionKind::Stop);
        assert_eq!(action.rule_id.as_str(), PRODUCTION_COMPLETE);
        assert!(s.check_production(12, t0 + secs(3)).is_none());
        assert!(s.check_production(12, t0 + secs(30)).is_none());
        assert_eq!(s.plan().unwrap().end_time, Some(t0 + secs(2)));
    }

    #[test]
    fn should_rearm_production_rule_when_new_plan_set() {
        let mut s = scheduler();
        let t0 = now();
        s.set_plan(10, true, None, t0);
        s.check_production(10, t0);
        s.set_plan(20, false, Some("product_b".to_string()), t0 + secs(10));
        let action = s.check_production(20, t0 + secs(11)).unwrap();
        assert_eq!(action.action, ActionKind::SwitchMode);
        assert_eq!(action.mode(), Some("product_b"));
    }

    #[test]
    fn should_respect_production_cooldown_after_rearm() {
        let mut s = scheduler();
        let t0 = now();
        s.set_plan(10, true, None, t0);
        s.check_production(10, t0);
        s.set_plan(10, true, None, t0 + secs(1));
        assert!(s.check_production(10, t0 + secs(2)).is_none());
        assert!(s.check_production(10, t0 + secs(5)).is_some());
    }

    #[test]
    fn should_ignore_production_without_plan_or_with_zero_target() {
        let mut s = scheduler();
        assert!(s.check_production(100, now()).is_none());
        s.set_plan(0, true, None, now());
        assert!(!s.rules().production().enabled);
        assert!(s.check_production(100, now()).is_none());
    }

    #[test]
    fn should_disarm_and_drop_plan_on_clear() {
        let mut s = scheduler();
        s.set_plan(10, true, None, now());
        assert!(s.clear_plan().is_some());
        assert!(s.plan().is_none());
        assert!(!s.rules().production().enabled);
        assert!(!s.plan_progress(5, now()).has_plan);
    }

    #[test]
    fn should_expose_snapshot_as_json() {
        let mut s = scheduler();
        s.check_metric(Metric::Pressure, 120.0, now());
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["paused_by_scheduler"], true);
        assert_eq!(json["out_of_range"]["pressure"], true);
        assert_eq!(json["out_of_range"]["temperature"], false);
        assert_eq!(json["rules"].as_array().unwrap().len(), 5);
        assert_eq!(json["thresholds"]["pressureMax"], 110.0);
    }
}
