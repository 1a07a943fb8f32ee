//! Control service — operator commands for a production line.
//!
//! Every command goes through the scheduler first so that a line the
//! operator halted on purpose is never restarted by sensor recovery.

use std::sync::Arc;

use linewatch_domain::command::{LineCommand, LineStatus};
use linewatch_domain::error::LineWatchError;
use linewatch_domain::id::DeviceId;

use crate::ports::{Clock, LineActuator};
use crate::services::scheduler_service::SchedulerService;

/// Manual line control backed by a [`LineActuator`].
pub struct ControlService<A, C> {
    actuator: A,
    scheduler: Arc<SchedulerService<C>>,
}

impl<A: LineActuator, C: Clock> ControlService<A, C> {
    /// Control lines through `actuator`, clearing pauses on `scheduler`.
    pub fn new(actuator: A, scheduler: Arc<SchedulerService<C>>) -> Self {
        Self {
            actuator,
            scheduler,
        }
    }

    /// Apply an operator command.
    ///
    /// Any scheduler-caused pause is forgotten before the command reaches the
    /// actuator, even if the actuator then fails.
    ///
    /// # Errors
    ///
    /// Returns whatever the actuator reports.
    #[tracing::instrument(skip(self))]
    pub async fn issue(
        &self,
        device_id: &DeviceId,
        command: LineCommand,
    ) -> Result<LineStatus, LineWatchError> {
        self.scheduler.clear_scheduler_pause(device_id);
        let status = self.actuator.apply(device_id, command).await?;
        tracing::info!(
            run_state = %status.run_state,
            mode = %status.mode,
            "operator command applied"
        );
        Ok(status)
    }

    /// Current line status.
    ///
    /// # Errors
    ///
    /// Returns whatever the actuator reports.
    pub async fn status(&self, device_id: &DeviceId) -> Result<LineStatus, LineWatchError> {
        self.actuator.status(device_id).await
    }
}
