//! Line actuator port — the component that actually changes a line's state.

use std::future::Future;

use linewatch_domain::command::{LineCommand, LineStatus};
use linewatch_domain::error::LineWatchError;
use linewatch_domain::id::DeviceId;

/// Drives a production line (PLC bridge, device socket, virtual line, …).
pub trait LineActuator {
    /// Apply `command` and return the resulting line status.
    fn apply(
        &self,
        device_id: &DeviceId,
        command: LineCommand,
    ) -> impl Future<Output = Result<LineStatus, LineWatchError>> + Send;

    /// Report the current line status.
    fn status(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<LineStatus, LineWatchError>> + Send;
}

impl<T: LineActuator + Send + Sync> LineActuator for std::sync::Arc<T> {
    fn apply(
        &self,
        device_id: &DeviceId,
        command: LineCommand,
    ) -> impl Future<Output = Result<LineStatus, LineWatchError>> + Send {
        (**self).apply(device_id, command)
    }

    fn status(
        &self,
        device_id: &DeviceId,
    ) -> impl Future<Output = Result<LineStatus, LineWatchError>> + Send {
        (**self).status(device_id)
    }
}
