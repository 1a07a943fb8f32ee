//! Virtual production line — keeps run state, mode and output in memory.

use std::collections::HashMap;

use tokio::sync::RwLock;

use linewatch_app::ports::LineActuator;
use linewatch_domain::command::{LineCommand, LineStatus, RunState};
use linewatch_domain::error::{ActuatorError, LineWatchError, NotFoundError};
use linewatch_domain::id::DeviceId;

/// Mode a line starts in.
pub const DEFAULT_MODE: &str = "product_a";

struct LineState {
    status: LineStatus,
    available: bool,
}

/// A set of simulated production lines.
///
/// Lines start stopped in [`DEFAULT_MODE`] with a zero counter. Commands for
/// unknown devices fail with [`NotFoundError`].
pub struct VirtualLine {
    lines: RwLock<HashMap<DeviceId, LineState>>,
}

impl VirtualLine {
    /// Create lines for `device_ids`.
    pub fn new(device_ids: impl IntoIterator<Item = DeviceId>) -> Self {
        let lines = device_ids
            .into_iter()
            .map(|device_id| {
                let state = LineState {
                    status: LineStatus {
                        device_id: device_id.clone(),
                        run_state: RunState::Stopped,
                        mode: DEFAULT_MODE.to_string(),
                        production_count: 0,
                    },
                    available: true,
                };
                (device_id, state)
            })
            .collect();
        Self {
            lines: RwLock::new(lines),
        }
    }

    /// Advance every running line by one item and return all statuses,
    /// sorted by device id.
    pub async fn tick(&self) -> Vec<LineStatus> {
        let mut lines = self.lines.write().await;
        let mut statuses: Vec<_> = lines
            .values_mut()
            .map(|line| {
                if line.status.run_state == RunState::Running {
                    line.status.production_count += 1;
                }
                line.status.clone()
            })
            .collect();
        statuses.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        statuses
    }

    /// Simulate the line dropping off (or coming back to) the network.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `device_id` is not a known line.
    pub async fn set_available(
        &self,
        device_id: &DeviceId,
        available: bool,
    ) -> Result<(), LineWatchError> {
        let mut lines = self.lines.write().await;
        let line = lines.get_mut(device_id).ok_or_else(|| not_found(device_id))?;
        line.available = available;
        Ok(())
    }
}

impl LineActuator for VirtualLine {
    async fn apply(
        &self,
        device_id: &DeviceId,
        command: LineCommand,
    ) -> Result<LineStatus, LineWatchError> {
        let mut lines = self.lines.write().await;
        let line = lines.get_mut(device_id).ok_or_else(|| not_found(device_id))?;
        if !line.available {
            return Err(ActuatorError::Unavailable {
                device_id: device_id.to_string(),
            }
            .into());
        }

        if let LineCommand::SwitchMode { mode } = &command {
            if mode.is_empty() {
                return Err(ActuatorError::Rejected {
                    device_id: device_id.to_string(),
                    command: command.to_string(),
                }
                .into());
            }
            line.status.mode.clone_from(mode);
        }
        line.status.run_state = line.status.run_state.apply(&command);
        tracing::debug!(
            %device_id,
            %command,
            run_state = %line.status.run_state,
            "virtual line updated"
        );
        Ok(line.status.clone())
    }

    async fn status(&self, device_id: &DeviceId) -> Result<LineStatus, LineWatchError> {
        let lines = self.lines.read().await;
        lines
            .get(device_id)
            .map(|line| line.status.clone())
            .ok_or_else(|| not_found(device_id).into())
    }
}

fn not_found(device_id: &DeviceId) -> NotFoundError {
    NotFoundError {
        entity: "Line",
        id: device_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> (VirtualLine, DeviceId) {
        let device = DeviceId::from("device_001");
        (VirtualLine::new([device.clone()]), device)
    }

    #[tokio::test]
    async fn should_start_stopped_in_default_mode() {
        let (line, device) = line();
        let status = line.status(&device).await.unwrap();
        assert_eq!(status.run_state, RunState::Stopped);
        assert_eq!(status.mode, DEFAULT_MODE);
        assert_eq!(status.production_count, 0);
    }

    #[tokio::test]
    async fn should_count_only_while_running() {
        let (line, device) = line();
        line.tick().await;
        line.apply(&device, LineCommand::Start).await.unwrap();
        line.tick().await;
        line.tick().await;
        line.apply(&device, LineCommand::Pause).await.unwrap();
        let statuses = line.tick().await;
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].production_count, 2);
        assert_eq!(statuses[0].run_state, RunState::Paused);
    }

    #[tokio::test]
    async fn should_switch_mode_without_changing_run_state() {
        let (line, device) = line();
        line.apply(&device, LineCommand::Start).await.unwrap();
        let status = line
            .apply(
                &device,
                LineCommand::SwitchMode {
                    mode: "product_b".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(status.mode, "product_b");
        assert_eq!(status.run_state, RunState::Running);
    }

    #[tokio::test]
    async fn should_reject_empty_mode() {
        let (line, device) = line();
        let result = line
            .apply(
                &device,
                LineCommand::SwitchMode {
                    mode: String::new(),
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(LineWatchError::Actuator(ActuatorError::Rejected { .. }))
        ));
    }

    #[tokio::test]
    async fn should_fail_while_unavailable() {
        let (line, device) = line();
        line.set_available(&device, false).await.unwrap();
        let result = line.apply(&device, LineCommand::Start).await;
        assert!(matches!(
            result,
            Err(LineWatchError::Actuator(ActuatorError::Unavailable { .. }))
        ));
        line.set_available(&device, true).await.unwrap();
        assert!(line.apply(&device, LineCommand::Start).await.is_ok());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_line() {
        let (line, _) = line();
        let result = line.status(&DeviceId::from("nope")).await;
        assert!(matches!(result, Err(LineWatchError::NotFound(_))));
    }
}
