//! Action sink port — where dispatched scheduler decisions end up.

use std::future::Future;

use linewatch_domain::action::TriggeredAction;
use linewatch_domain::error::LineWatchError;
use linewatch_domain::id::DeviceId;

/// Consumes actions decided by the scheduler (actuator, broadcast, audit log, …).
///
/// Implementations may block on IO; the dispatcher runs them off the
/// evaluation path and only logs their failures.
pub trait ActionSink {
    /// Handle one action for `device_id`.
    fn handle(
        &self,
        device_id: DeviceId,
        action: TriggeredAction,
    ) -> impl Future<Output = Result<(), LineWatchError>> + Send;
}

impl<T: ActionSink + Send + Sync> ActionSink for std::sync::Arc<T> {
    fn handle(
        &self,
        device_id: DeviceId,
        action: TriggeredAction,
    ) -> impl Future<Output = Result<(), LineWatchError>> + Send {
        (**self).handle(device_id, action)
    }
}
