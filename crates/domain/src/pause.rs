//! Pause state machine — tracks whether the *scheduler* paused the line and
//! decides when an autonomous resume is justified.
//!
//! ```text
//!            rising edge out of range (rule armed)
//!   Idle ─────────────────────────────────────────► SchedulerPaused
//!    ▲                                                   │
//!    │  all metrics in range + stable, recovery armed    │
//!    ├───────────────────────────────────────────────────┘
//!    │
//!    └──────────── clear() (operator command) ◄──── SchedulerPaused
//! ```
//!
//! Only `SchedulerPaused` can resume on its own. An operator pause or stop
//! must go through [`PauseStateMachine::clear`] so that a line halted on
//! purpose is never restarted by sensor recovery.

use serde::Serialize;

use crate::action::TriggeredAction;
use crate::history::HistoryBuffer;
use crate::metric::{Metric, PerMetric};
use crate::rule::RuleStore;
use crate::threshold::ValueRange;
use crate::time::Timestamp;

/// Reason attached to the autonomous `start` action.
pub const RECOVERY_REASON: &str = "all monitored parameters recovered";

/// Whether the current pause is attributable to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseState {
    Idle,
    SchedulerPaused,
}

/// Range status of one metric before and after a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeTransition {
    pub was_out: bool,
    pub is_out: bool,
}

impl RangeTransition {
    /// The reading just crossed from in-range to out-of-range.
    #[must_use]
    pub fn is_rising_edge(self) -> bool {
        !self.was_out && self.is_out
    }
}

/// Per-device pause bookkeeping: paused flag, reasons, range flags, histories.
#[derive(Debug, Clone, Default)]
pub struct PauseStateMachine {
    paused_by_scheduler: bool,
    pause_reasons: Vec<String>,
    out_of_range: PerMetric<bool>,
    history: PerMetric<HistoryBuffer>,
}

impl PauseStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PauseState {
        if self.paused_by_scheduler {
            PauseState::SchedulerPaused
        } else {
            PauseState::Idle
        }
    }

    #[must_use]
    pub fn is_scheduler_paused(&self) -> bool {
        self.paused_by_scheduler
    }

    /// Reasons accumulated since the last resume or clear, oldest first.
    #[must_use]
    pub fn pause_reasons(&self) -> &[String] {
        &self.pause_reasons
    }

    #[must_use]
    pub fn out_of_range(&self) -> &PerMetric<bool> {
        &self.out_of_range
    }

    #[must_use]
    pub fn history(&self, metric: Metric) -> &HistoryBuffer {
        self.history.get(metric)
    }

    /// Record a reading: append it to the metric's history and update the
    /// metric's out-of-range flag against `range`.
    pub fn record(&mut self, metric: Metric, value: f64, range: ValueRange) -> RangeTransition {
        self.history.get_mut(metric).push(value);
        let is_out = range.excludes(value);
        let was_out = std::mem::replace(self.out_of_range.get_mut(metric), is_out);
        RangeTransition { was_out, is_out }
    }

    /// Idle → `SchedulerPaused`, remembering `reason` (deduplicated).
    pub fn enter_paused(&mut self, reason: &str) {
        if !self.pause_reasons.iter().any(|r| r == reason) {
            self.pause_reasons.push(reason.to_string());
        }
        self.paused_by_scheduler = true;
    }

    /// Forget the scheduler pause. Range flags and histories are kept.
    pub fn clear(&mut self) {
        self.paused_by_scheduler = false;
        self.pause_reasons.clear();
    }

    #[must_use]
    pub fn any_out_of_range(&self) -> bool {
        self.out_of_range.iter().any(|(_, out)| *out)
    }

    /// Every metric's recent history is within its rule's band.
    #[must_use]
    pub fn all_stable(&self, rules: &RuleStore) -> bool {
        Metric::ALL.into_iter().all(|metric| {
            self.history
                .get(metric)
                .is_stable_within(rules.metric_rule(metric).range())
        })
    }

    /// Whether an autonomous resume is justified right now.
    #[must_use]
    pub fn can_resume(&self, rules: &RuleStore, now: Timestamp) -> bool {
        self.paused_by_scheduler
            && rules.recovery().is_armed(now)
            && !self.any_out_of_range()
            && self.all_stable(rules)
    }

    /// `SchedulerPaused` → Idle when [`can_resume`](Self::can_resume) holds.
    ///
    /// Stamps the recovery rule and returns its `start` action.
    pub fn try_resume(&mut self, rules: &mut RuleStore, now: Timestamp) -> Option<TriggeredAction> {
        if !self.can_resume(rules, now) {
            return None;
        }
        let recovery = rules.recovery_mut();
        recovery.mark_triggered(now);
        self.clear();
        Some(recovery.fire(RECOVERY_REASON))
    }
}
