//! Line commands and run state — what the actuator is asked to do and
//! what it reports back.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// A change to a production line's run state or mode.
///
/// Issued either by the scheduler (through a dispatched action) or by an
/// operator (manual control).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LineCommand {
    Start,
    Stop,
    Pause,
    SwitchMode { mode: String },
}

impl std::fmt::Display for LineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Stop => f.write_str("stop"),
            Self::Pause => f.write_str("pause"),
            Self::SwitchMode { mode } => write!(f, "switch_mode({mode})"),
        }
    }
}

/// Whether a line is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Paused,
    #[default]
    Stopped,
}

impl RunState {
    /// State after applying `command`; mode switches keep the run state.
    #[must_use]
    pub fn apply(self, command: &LineCommand) -> Self {
        match command {
            LineCommand::Start => Self::Running,
            LineCommand::Stop => Self::Stopped,
            LineCommand::Pause => Self::Paused,
            LineCommand::SwitchMode { .. } => self,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Paused => f.write_str("paused"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// Snapshot of a line as reported by its actuator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStatus {
    pub device_id: DeviceId,
    pub run_state: RunState,
    pub mode: String,
    pub production_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_transition_run_state_per_command() {
        assert_eq!(RunState::Stopped.apply(&LineCommand::Start), RunState::Running);
        assert_eq!(RunState::Running.apply(&LineCommand::Pause), RunState::Paused);
        assert_eq!(RunState::Paused.apply(&LineCommand::Stop), RunState::Stopped);
    }

    #[test]
    fn should_keep_run_state_on_mode_switch() {
        let cmd = LineCommand::SwitchMode {
            mode: "product_b".to_string(),
        };
        assert_eq!(RunState::Running.apply(&cmd), RunState::Running);
        assert_eq!(RunState::Paused.apply(&cmd), RunState::Paused);
    }

    #[test]
    fn should_display_commands() {
        assert_eq!(LineCommand::Pause.to_string(), "pause");
        let cmd = LineCommand::SwitchMode {
            mode: "product_b".to_string(),
        };
        assert_eq!(cmd.to_string(), "switch_mode(product_b)");
    }

    #[test]
    fn should_deserialize_tagged_command() {
        let json = serde_json::json!({"command": "switch_mode", "mode": "product_a"});
        let cmd: LineCommand = serde_json::from_value(json).unwrap();
        assert!(matches!(cmd, LineCommand::SwitchMode { mode } if mode == "product_a"));
    }
}
