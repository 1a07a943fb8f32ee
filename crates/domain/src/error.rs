//! Common error types used across the workspace.
//!
//! Each layer converts its typed errors into [`LineWatchError`] via `#[from]`.

/// Base error for every fallible linewatch operation.
#[derive(Debug, thiserror::Error)]
pub enum LineWatchError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("actuator error")]
    Actuator(#[from] ActuatorError),
}

/// A domain invariant was violated while building a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("switch_mode requires a non-empty `mode` parameter")]
    MissingMode,

    #[error("cooldown must be a finite, non-negative number of seconds")]
    InvalidCooldown,
}

/// Lookup of a named item failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The component driving the physical line refused or failed a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    #[error("line `{device_id}` rejected command `{command}`")]
    Rejected { device_id: String, command: String },

    #[error("line `{device_id}` is unavailable")]
    Unavailable { device_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_not_found_into_base_error() {
        let err: LineWatchError = NotFoundError {
            entity: "Rule",
            id: "nonexistent".to_string(),
        }
        .into();
        assert!(matches!(err, LineWatchError::NotFound(_)));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Rule",
            id: "nonexistent".to_string(),
        };
        assert_eq!(err.to_string(), "Rule `nonexistent` not found");
    }

    #[test]
    fn should_display_rejected_actuator_command() {
        let err = ActuatorError::Rejected {
            device_id: "device_001".to_string(),
            command: "start".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line `device_001` rejected command `start`"
        );
    }
}
