//! Simulation driver — feeds virtual line output and sensor readings into
//! the scheduler, one tick at a time.

use std::sync::Arc;

use linewatch_app::ports::Clock;
use linewatch_app::services::scheduler_service::SchedulerService;
use linewatch_domain::action::TriggeredAction;
use linewatch_domain::metric::Metric;

use crate::line::VirtualLine;
use crate::sensor::SensorProfile;

/// Drives every line of a [`VirtualLine`] through the scheduler.
pub struct Simulation<C> {
    scheduler: Arc<SchedulerService<C>>,
    line: Arc<VirtualLine>,
    profile: SensorProfile,
    tick: u64,
}

impl<C: Clock> Simulation<C> {
    pub fn new(
        scheduler: Arc<SchedulerService<C>>,
        line: Arc<VirtualLine>,
        profile: SensorProfile,
    ) -> Self {
        Self {
            scheduler,
            line,
            profile,
            tick: 0,
        }
    }

    /// Number of completed steps.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Advance the lines by one tick, then report each line's production
    /// count and the profile's readings to the scheduler.
    ///
    /// Returns every action the scheduler fired during this step.
    #[tracing::instrument(skip(self), fields(tick = self.tick))]
    pub async fn step(&mut self) -> Vec<TriggeredAction> {
        let reading = self.profile.reading(self.tick);
        let mut fired = Vec::new();

        for status in self.line.tick().await {
            let device_id = &status.device_id;
            fired.extend(
                self.scheduler
                    .check_production(device_id, status.production_count),
            );
            for metric in Metric::ALL {
                fired.extend(
                    self.scheduler
                        .check_metric(device_id, metric, reading.get(metric)),
                );
            }
        }

        self.tick += 1;
        fired
    }
}
