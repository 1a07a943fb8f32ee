//! Action sink that carries scheduler decisions out on a [`LineActuator`].

use linewatch_domain::action::TriggeredAction;
use linewatch_domain::error::LineWatchError;
use linewatch_domain::id::DeviceId;

use crate::ports::{ActionSink, LineActuator};

/// Translates each [`TriggeredAction`] into a line command and applies it.
///
/// Informational actions (`none`) are logged and never reach the actuator.
pub struct ActuatorSink<A> {
    actuator: A,
}

impl<A> ActuatorSink<A> {
    /// Wrap `actuator`.
    pub fn new(actuator: A) -> Self {
        Self { actuator }
    }
}

impl<A: LineActuator + Send + Sync> ActionSink for ActuatorSink<A> {
    #[tracing::instrument(skip(self, action), fields(rule_id = %action.rule_id))]
    async fn handle(
        &self,
        device_id: DeviceId,
        action: TriggeredAction,
    ) -> Result<(), LineWatchError> {
        let Some(command) = action.to_command()? else {
            tracing::info!(reason = %action.reason, "informational action, line left as is");
            return Ok(());
        };
        let status = self.actuator.apply(&device_id, command).await?;
        tracing::info!(
            run_state = %status.run_state,
            mode = %status.mode,
            reason = %action.reason,
            "line command applied"
        );
        Ok(())
    }
}
