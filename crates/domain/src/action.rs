//! Triggered action — a decision emitted by the scheduler.
//!
//! The scheduler only decides *whether* and *when* an action fires; how it
//! is carried out belongs to whoever receives it.

use serde::{Deserialize, Serialize};

use crate::command::LineCommand;
use crate::error::ValidationError;
use crate::id::RuleId;
use crate::metric::Metric;

/// What a rule asks the line to do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pause,
    Stop,
    Start,
    SwitchMode,
    /// Informational only; the line is left as is.
    None,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pause => f.write_str("pause"),
            Self::Stop => f.write_str("stop"),
            Self::Start => f.write_str("start"),
            Self::SwitchMode => f.write_str("switch_mode"),
            Self::None => f.write_str("none"),
        }
    }
}

/// Free-form parameters attached to an action (e.g. `{"mode": "product_b"}`).
pub type ActionParams = serde_json::Map<String, serde_json::Value>;

/// A fired rule, handed to the action dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAction {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub action: ActionKind,
    #[serde(default)]
    pub params: ActionParams,
    pub reason: String,
    /// The metric whose excursion caused a pause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
}

impl TriggeredAction {
    /// The `mode` parameter, when present and a string.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.params.get("mode").and_then(serde_json::Value::as_str)
    }

    /// Translate this decision into a line command.
    ///
    /// Returns `Ok(None)` for [`ActionKind::None`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingMode`] for a `switch_mode` action
    /// without a non-empty `mode` parameter.
    pub fn to_command(&self) -> Result<Option<LineCommand>, ValidationError> {
        let command = match self.action {
            ActionKind::Pause => LineCommand::Pause,
            ActionKind::Stop => LineCommand::Stop,
            ActionKind::Start => LineCommand::Start,
            ActionKind::SwitchMode => match self.mode() {
                Some(mode) if !mode.is_empty() => LineCommand::SwitchMode {
                    mode: mode.to_string(),
                },
                _ => return Err(ValidationError::MissingMode),
            },
            ActionKind::None => return Ok(None),
        };
        Ok(Some(command))
    }
}
