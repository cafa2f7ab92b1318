//! Run progress as a subscribable event stream.
//!
//! Controllers emit through a [`ProgressSender`]; callers subscribe to a
//! broadcast receiver instead of registering a callback, so emission is
//! decoupled from any particular consumer and slow consumers only lose their
//! own backlog.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Stage of an automation run. Events are ephemeral and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Initializing,
    Loading,
    Filling,
    Submitting,
    Verifying,
    Completed,
    Failed,
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressStage::Initializing => "initializing",
            ProgressStage::Loading => "loading",
            ProgressStage::Filling => "filling",
            ProgressStage::Submitting => "submitting",
            ProgressStage::Verifying => "verifying",
            ProgressStage::Completed => "completed",
            ProgressStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub stage: ProgressStage,
    pub message: String,
}

/// Broadcast side of the progress stream, cloned into each run.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }

    /// Emits one event. Lack of subscribers is not an error.
    pub fn emit(&self, stage: ProgressStage, message: impl Into<String>) {
        let event = ProgressEvent {
            stage,
            message: message.into(),
        };
        debug!(target = "crosspost.progress", stage = %event.stage, message = %event.message);
        let _ = self.tx.send(event);
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let sender = ProgressSender::default();
        let mut rx = sender.subscribe();

        sender.emit(ProgressStage::Initializing, "Launching browser");
        sender.emit(ProgressStage::Completed, "Done");

        assert_eq!(rx.recv().await.unwrap().stage, ProgressStage::Initializing);
        let last = rx.recv().await.unwrap();
        assert_eq!(last.stage, ProgressStage::Completed);
        assert_eq!(last.message, "Done");
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        let sender = ProgressSender::default();
        sender.emit(ProgressStage::Failed, "nobody listening");
    }

    #[test]
    fn event_wire_shape() {
        let json = serde_json::to_value(ProgressEvent {
            stage: ProgressStage::Verifying,
            message: "Verifying the published post".into(),
        })
        .unwrap();
        assert_eq!(json["stage"], "verifying");
        assert_eq!(json["message"], "Verifying the published post");
    }
}
