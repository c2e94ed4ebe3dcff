//! Fan-out of session events to subscribed connections.
//!
//! Every subscriber owns an unbounded outbound queue. The transport drains
//! that queue from a single writer task per connection, so frames for one
//! connection are written in issue order and never interleave. The hub only
//! enqueues: a dead or slow connection cannot hold up its siblings.

use crate::ids;
use crate::protocol::ServerEvent;
use crate::types::SubscriberId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Serialized event frame shared between all recipients of one broadcast
pub type Frame = Arc<str>;

/// A live connection registered to receive a session's events
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    tx: mpsc::UnboundedSender<Frame>,
}

impl Subscriber {
    /// Create a subscriber handle together with the receiving end of its
    /// outbound queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: ids::new_subscriber_id(),
                tx,
            },
            rx,
        )
    }

    fn deliver(&self, frame: Frame) -> Result<(), mpsc::error::SendError<Frame>> {
        self.tx.send(frame)
    }
}

/// Outcome of one broadcast call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Subscribers whose connection is gone
    pub failed: Vec<SubscriberId>,
}

#[derive(Debug, Clone, Default)]
pub struct BroadcastHub;

impl BroadcastHub {
    pub fn new() -> Self {
        Self
    }

    /// Deliver `event` to every subscriber. Failures are logged and reported,
    /// never returned as errors.
    pub fn broadcast(
        &self,
        session_code: &str,
        subscribers: &[Subscriber],
        event: &ServerEvent,
    ) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if subscribers.is_empty() {
            return report;
        }

        let frame: Frame = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!("Failed to serialize event for game {}: {}", session_code, e);
                return report;
            }
        };

        for subscriber in subscribers {
            match subscriber.deliver(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(_) => report.failed.push(subscriber.id.clone()),
            }
        }

        if !report.failed.is_empty() {
            tracing::warn!(
                "Broadcast to game {}: {} delivered, {} failed ({:?})",
                session_code,
                report.delivered,
                report.failed.len(),
                report.failed
            );
        } else {
            tracing::debug!(
                "Broadcast to game {}: {} delivered",
                session_code,
                report.delivered
            );
        }

        report
    }
}
