//! Action dispatcher — the single exit point for scheduler decisions.
//!
//! Evaluations push onto an unbounded channel and return immediately. A
//! worker task drains the channel and hands each action to an
//! [`ActionSink`], one at a time and in order. Sink errors and panics are
//! logged and never reach the evaluating call.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linewatch_domain::action::TriggeredAction;
use linewatch_domain::id::DeviceId;

use crate::ports::ActionSink;

/// An action addressed to a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchedAction {
    pub device_id: DeviceId,
    pub action: TriggeredAction,
}

/// Non-blocking handle used by the scheduler to emit actions.
///
/// Cheap to clone; every clone feeds the same worker.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    sender: mpsc::UnboundedSender<DispatchedAction>,
}

impl ActionDispatcher {
    /// Create a dispatcher and the receiving end of its channel.
    ///
    /// Useful when the caller wants to consume actions directly (tests,
    /// custom fan-out) instead of through [`spawn`](Self::spawn).
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DispatchedAction>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Create a dispatcher whose actions are delivered to `sink` by a worker
    /// task on the current tokio runtime.
    ///
    /// The worker stops once every dispatcher clone has been dropped and the
    /// queue is drained.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<S>(sink: S) -> (Self, JoinHandle<()>)
    where
        S: ActionSink + Send + Sync + 'static,
    {
        let (dispatcher, receiver) = Self::channel();
        let worker = tokio::spawn(run_worker(receiver, Arc::new(sink)));
        (dispatcher, worker)
    }

    /// Queue `action` for delivery. Never blocks.
    pub fn dispatch(&self, device_id: &DeviceId, action: &TriggeredAction) {
        let item = DispatchedAction {
            device_id: device_id.clone(),
            action: action.clone(),
        };
        if self.sender.send(item).is_err() {
            tracing::warn!(
                %device_id,
                rule_id = %action.rule_id,
                "action dropped, dispatcher worker is gone"
            );
        }
    }
}

/// Drain `receiver`, delivering every action to `sink` in order.
pub async fn run_worker<S>(mut receiver: mpsc::UnboundedReceiver<DispatchedAction>, sink: Arc<S>)
where
    S: ActionSink + Send + Sync + 'static,
{
    while let Some(item) = receiver.recv().await {
        deliver(&sink, item).await;
    }
    tracing::debug!("action dispatcher worker stopped");
}

/// Run one sink call in its own task so a panic stays contained.
async fn deliver<S>(sink: &Arc<S>, item: DispatchedAction)
where
    S: ActionSink + Send + Sync + 'static,
{
    let device_id = item.device_id.clone();
    let rule_id = item.action.rule_id.clone();
    let kind = item.action.action;

    let sink = Arc::clone(sink);
    let task = tokio::spawn(async move { sink.handle(item.device_id, item.action).await });

    match task.await {
        Ok(Ok(())) => {
            tracing::debug!(%device_id, %rule_id, action = %kind, "action delivered");
        }
        Ok(Err(err)) => {
            tracing::error!(
                %device_id,
                %rule_id,
                action = %kind,
                error = ?err,
                "action sink failed"
            );
        }
        Err(err) if err.is_panic() => {
            tracing::error!(%device_id, %rule_id, action = %kind, "action sink panicked");
        }
        Err(err) => {
            tracing::warn!(
                %device_id,
                %rule_id,
                action = %kind,
                error = %err,
                "action sink task cancelled"
            );
        }
    }
}
