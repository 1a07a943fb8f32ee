//! Scheduler service — per-device scheduler registry and the public
//! evaluation, configuration and query API.
//!
//! Every device gets its own [`DeviceScheduler`] behind its own lock, created
//! lazily on first reference. Each call holds that lock for the whole
//! evaluation so readings from concurrent ingestion sources cannot interleave
//! history updates or edge detection. Different devices never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use linewatch_domain::action::TriggeredAction;
use linewatch_domain::error::LineWatchError;
use linewatch_domain::id::DeviceId;
use linewatch_domain::metric::Metric;
use linewatch_domain::plan::{PlanProgress, ProductionPlan};
use linewatch_domain::rule::{Rule, RulePatch};
use linewatch_domain::scheduler::{DeviceScheduler, SchedulerSnapshot};
use linewatch_domain::threshold::ThresholdConfig;

use crate::dispatcher::ActionDispatcher;
use crate::ports::Clock;

type DeviceSlot = Arc<Mutex<DeviceScheduler>>;

/// Environmental-safety and production-target scheduler for many devices.
pub struct SchedulerService<C> {
    clock: C,
    dispatcher: ActionDispatcher,
    default_thresholds: ThresholdConfig,
    devices: Mutex<HashMap<DeviceId, DeviceSlot>>,
}

impl<C: Clock> SchedulerService<C> {
    /// Create a service that stamps decisions with `clock`, emits them
    /// through `dispatcher`, and seeds new devices with `default_thresholds`.
    pub fn new(
        clock: C,
        dispatcher: ActionDispatcher,
        default_thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            clock,
            dispatcher,
            default_thresholds,
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Make sure `device_id` has scheduler state. Idempotent.
    pub fn initialize(&self, device_id: &DeviceId) {
        let _ = self.slot(device_id);
    }

    /// Devices with scheduler state, sorted by id.
    pub fn devices(&self) -> Vec<DeviceId> {
        let devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<_> = devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    // ── Evaluation ────────────────────────────────────────────────

    /// Evaluate a temperature reading. See [`check_metric`](Self::check_metric).
    pub fn check_temperature(&self, device_id: &DeviceId, value: f64) -> Option<TriggeredAction> {
        self.check_metric(device_id, Metric::Temperature, value)
    }

    /// Evaluate a humidity reading. See [`check_metric`](Self::check_metric).
    pub fn check_humidity(&self, device_id: &DeviceId, value: f64) -> Option<TriggeredAction> {
        self.check_metric(device_id, Metric::Humidity, value)
    }

    /// Evaluate a pressure reading. See [`check_metric`](Self::check_metric).
    pub fn check_pressure(&self, device_id: &DeviceId, value: f64) -> Option<TriggeredAction> {
        self.check_metric(device_id, Metric::Pressure, value)
    }

    /// Evaluate one environmental reading; any resulting `pause` or `start`
    /// is dispatched and also returned.
    pub fn check_metric(
        &self,
        device_id: &DeviceId,
        metric: Metric,
        value: f64,
    ) -> Option<TriggeredAction> {
        let now = self.clock.now();
        self.with_device(device_id, |scheduler| {
            let action = scheduler.check_metric(metric, value, now);
            if action.is_none() {
                tracing::trace!(%device_id, %metric, value, "reading evaluated, no action");
            }
            self.emit(device_id, action)
        })
    }

    /// Compare a cumulative production count against the device's plan; a
    /// completion action is dispatched and also returned.
    pub fn check_production(
        &self,
        device_id: &DeviceId,
        current_count: u64,
    ) -> Option<TriggeredAction> {
        let now = self.clock.now();
        self.with_device(device_id, |scheduler| {
            let action = scheduler.check_production(current_count, now);
            self.emit(device_id, action)
        })
    }

    /// Forget a scheduler-caused pause so it can never auto-resume.
    ///
    /// Must be called whenever an operator changes the line's run state.
    #[tracing::instrument(skip(self))]
    pub fn clear_scheduler_pause(&self, device_id: &DeviceId) {
        self.with_device(device_id, |scheduler| {
            if scheduler.pause().is_scheduler_paused() {
                tracing::info!("scheduler pause cleared by operator command");
            }
            scheduler.clear_scheduler_pause();
        });
    }

    // ── Production plans ──────────────────────────────────────────

    /// Create or replace the production plan of `device_id`.
    #[tracing::instrument(skip(self))]
    pub fn set_production_plan(
        &self,
        device_id: &DeviceId,
        target_count: u64,
        auto_stop: bool,
        auto_switch_mode: Option<String>,
    ) -> ProductionPlan {
        let now = self.clock.now();
        let plan = self.with_device(device_id, |scheduler| {
            scheduler.set_plan(target_count, auto_stop, auto_switch_mode, now)
        });
        tracing::info!(target_count, "production plan set");
        plan
    }

    /// Remove the production plan of `device_id`, returning it if one existed.
    #[tracing::instrument(skip(self))]
    pub fn clear_production_plan(&self, device_id: &DeviceId) -> Option<ProductionPlan> {
        self.with_device(device_id, DeviceScheduler::clear_plan)
    }

    /// Current production plan of `device_id`, including one that already fired.
    pub fn get_production_plan(&self, device_id: &DeviceId) -> Option<ProductionPlan> {
        self.with_device(device_id, |scheduler| scheduler.plan().cloned())
    }

    /// Progress of `device_id`'s plan at `current_count`.
    pub fn get_plan_progress(&self, device_id: &DeviceId, current_count: u64) -> PlanProgress {
        let now = self.clock.now();
        self.with_device(device_id, |scheduler| {
            scheduler.plan_progress(current_count, now)
        })
    }

    // ── Rules & thresholds ────────────────────────────────────────

    /// Replace the threshold record and resync the environmental rules.
    #[tracing::instrument(skip(self))]
    pub fn update_thresholds(&self, device_id: &DeviceId, thresholds: ThresholdConfig) {
        self.with_device(device_id, |scheduler| {
            scheduler.update_thresholds(thresholds);
        });
        tracing::info!("thresholds updated");
    }

    /// Threshold record currently applied to `device_id`.
    pub fn get_thresholds(&self, device_id: &DeviceId) -> ThresholdConfig {
        self.with_device(device_id, |scheduler| *scheduler.thresholds())
    }

    /// Patch one rule of `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LineWatchError::NotFound`] for an unknown `rule_id` and
    /// [`LineWatchError::Validation`] for an invalid patch; the rule set is
    /// unchanged in both cases.
    #[tracing::instrument(skip(self, patch))]
    pub fn update_rule(
        &self,
        device_id: &DeviceId,
        rule_id: &str,
        patch: &RulePatch,
    ) -> Result<Rule, LineWatchError> {
        self.with_device(device_id, |scheduler| scheduler.update_rule(rule_id, patch))
    }

    /// Copy of every rule of `device_id`, in store order.
    pub fn get_rules(&self, device_id: &DeviceId) -> Vec<Rule> {
        self.with_device(device_id, |scheduler| {
            scheduler.rules().iter().cloned().collect()
        })
    }

    /// Full diagnostic snapshot of `device_id`.
    pub fn get_state(&self, device_id: &DeviceId) -> SchedulerSnapshot {
        self.with_device(device_id, |scheduler| scheduler.snapshot())
    }

    // ── Internals ─────────────────────────────────────────────────

    fn slot(&self, device_id: &DeviceId) -> DeviceSlot {
        let mut devices = self.devices.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = devices.entry(device_id.clone()).or_insert_with(|| {
            tracing::info!(%device_id, "scheduler state initialised");
            Arc::new(Mutex::new(DeviceScheduler::new(
                device_id.clone(),
                self.default_thresholds,
            )))
        });
        Arc::clone(slot)
    }

    fn with_device<R>(
        &self,
        device_id: &DeviceId,
        f: impl FnOnce(&mut DeviceScheduler) -> R,
    ) -> R {
        let slot = self.slot(device_id);
        let mut scheduler = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *scheduler)
    }

    fn emit(
        &self,
        device_id: &DeviceId,
        action: Option<TriggeredAction>,
    ) -> Option<TriggeredAction> {
        if let Some(action) = &action {
            tracing::info!(
                %device_id,
                rule_id = %action.rule_id,
                action = %action.action,
                reason = %action.reason,
                "scheduler action fired"
            );
            self.dispatcher.dispatch(device_id, action);
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatcher::DispatchedAction;
    use linewatch_domain::action::ActionKind;
    use linewatch_domain::rule::{RECOVERY_START, TEMPERATURE_PAUSE};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Harness {
        clock: Arc<ManualClock>,
        service: SchedulerService<Arc<ManualClock>>,
        rx: UnboundedReceiver<DispatchedAction>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::default());
            let (dispatcher, rx) = ActionDispatcher::channel();
            let service =
                SchedulerService::new(Arc::clone(&clock), dispatcher, ThresholdConfig::default());
            Self { clock, service, rx }
        }

        fn advance(&self, secs: u64) {
            self.clock.advance(Duration::from_secs(secs));
        }

        fn dispatched(&mut self) -> Vec<DispatchedAction> {
            let mut out = Vec::new();
            while let Ok(item) = self.rx.try_recv() {
                out.push(item);
            }
            out
        }
    }

    fn device(id: &str) -> DeviceId {
        DeviceId::from(id)
    }

    #[test]
    fn should_pause_then_stay_quiet_within_cooldown() {
        let mut h = Harness::new();
        let d = device("device_001");

        let action = h.service.check_temperature(&d, 40.0).unwrap();
        assert_eq!(action.action, ActionKind::Pause);
        assert!(action.reason.contains("40"));
        assert!(action.reason.contains("[10, 35]"));

        h.advance(2);
        assert!(h.service.check_temperature(&d, 40.0).is_none());

        let dispatched = h.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].device_id, d);
        assert_eq!(dispatched[0].action, action);
    }

    #[test]
    fn should_resume_after_three_normal_readings() {
        let mut h = Harness::new();
        let d = device("device_001");
        h.service.check_temperature(&d, 40.0);
        h.advance(2);
        h.service.check_temperature(&d, 40.0);
        h.advance(8);

        assert!(h.service.check_temperature(&d, 20.0).is_none());
        assert!(h.service.check_temperature(&d, 20.0).is_none());
        let action = h.service.check_temperature(&d, 20.0).unwrap();
        assert_eq!(action.action, ActionKind::Start);
        assert_eq!(action.reason, "all monitored parameters recovered");

        let kinds: Vec<_> = h.dispatched().iter().map(|d| d.action.action).collect();
        assert_eq!(kinds, vec![ActionKind::Pause, ActionKind::Start]);
    }

    #[test]
    fn should_never_auto_restart_after_operator_clear() {
        let mut h = Harness::new();
        let d = device("device_001");
        h.service.check_temperature(&d, 40.0);
        h.service.clear_scheduler_pause(&d);
        h.advance(30);
        for _ in 0..5 {
            assert!(h.service.check_temperature(&d, 20.0).is_none());
        }
        assert!(!h.service.get_state(&d).paused_by_scheduler);
        assert_eq!(h.dispatched().len(), 1);
    }

    #[test]
    fn should_stop_once_per_plan_and_respect_cooldown() {
        let mut h = Harness::new();
        let d = device("device_001");
        h.service.set_production_plan(&d, 10, true, None);

        let action = h.service.check_production(&d, 10).unwrap();
        assert_eq!(action.action, ActionKind::Stop);
        h.advance(1);
        assert!(h.service.check_production(&d, 12).is_none());
        assert_eq!(h.dispatched().len(), 1);
    }

    #[test]
    fn should_report_not_found_for_unknown_rule_without_changes() {
        let h = Harness::new();
        let d = device("device_001");
        let before = h.service.get_rules(&d);
        let result = h
            .service
            .update_rule(&d, "nonexistent", &RulePatch::default().enabled(false));
        assert!(matches!(result, Err(LineWatchError::NotFound(_))));
        assert_eq!(h.service.get_rules(&d), before);
    }

    #[test]
    fn should_report_no_plan_for_fresh_device() {
        let h = Harness::new();
        let progress = h.service.get_plan_progress(&device("device_002"), 5);
        assert!(!progress.has_plan);
        assert!(progress.progress.abs() < f64::EPSILON);
        assert_eq!(progress.remaining, 0);
        assert!(progress.estimated_completion_time.is_none());
    }

    #[test]
    fn should_estimate_completion_with_injected_clock() {
        let h = Harness::new();
        let d = device("device_001");
        let plan = h.service.set_production_plan(&d, 100, true, None);
        h.advance(50);
        let progress = h.service.get_plan_progress(&d, 25);
        assert_eq!(
            progress.estimated_completion_time,
            Some(plan.start_time + chrono::Duration::seconds(200))
        );
    }

    #[test]
    fn should_keep_devices_independent() {
        let mut h = Harness::new();
        let a = device("line-a");
        let b = device("line-b");
        h.service
            .update_rule(&a, TEMPERATURE_PAUSE, &RulePatch::default().enabled(false))
            .unwrap();

        assert!(h.service.check_temperature(&a, 40.0).is_none());
        assert!(h.service.check_temperature(&b, 40.0).is_some());
        assert_eq!(h.service.devices(), vec![a, b]);
        assert_eq!(h.dispatched().len(), 1);
    }

    #[test]
    fn should_initialize_idempotently() {
        let h = Harness::new();
        let d = device("device_001");
        h.service.initialize(&d);
        h.service
            .update_rule(&d, RECOVERY_START, &RulePatch::default().enabled(false))
            .unwrap();
        h.service.initialize(&d);
        let rules = h.service.get_rules(&d);
        let recovery = rules.iter().find(|r| r.id.as_str() == RECOVERY_START).unwrap();
        assert!(!recovery.enabled);
        assert_eq!(h.service.devices().len(), 1);
    }

    #[test]
    fn should_push_threshold_updates_onto_rules() {
        let h = Harness::new();
        let d = device("device_001");
        let thresholds = ThresholdConfig {
            pressure_min: 80.0,
            pressure_max: 120.0,
            ..ThresholdConfig::default()
        };
        h.service.update_thresholds(&d, thresholds);
        assert_eq!(h.service.get_thresholds(&d), thresholds);
        assert!(h.service.check_pressure(&d, 115.0).is_none());
        assert!(h.service.check_pressure(&d, 125.0).is_some());
    }

    #[test]
    fn should_report_state_snapshot_of_device() {
        let h = Harness::new();
        let d = device("device_001");
        h.service.check_pressure(&d, 120.0);

        let state = h.service.get_state(&d);
        assert_eq!(state.device_id, d);
        assert!(state.paused_by_scheduler);
        assert!(state.out_of_range.pressure);
        assert_eq!(
            state.pause_reasons,
            vec!["pressure 120kPa out of range [90, 110]kPa".to_string()]
        );
        assert_eq!(state.rules.len(), 5);
        assert_eq!(state.last_check_time, Some(h.clock.now()));
    }

    #[test]
    fn should_serialize_concurrent_readings_per_device() {
        let h = Harness::new();
        let d = device("device_001");
        let fired = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| h.service.check_humidity(&d, 95.0).is_some()))
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .filter(|fired| *fired)
                .count()
        });
        assert_eq!(fired, 1);
        assert_eq!(h.service.get_state(&d).pause_reasons.len(), 1);
    }
}
