//! Broadcast relay.
//!
//! Every join notice, chat line and leave notice goes through one unbounded
//! channel with a single consumer. Messages therefore reach every peer in the
//! order they were enqueued, and fan-out never runs concurrently with itself.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{domain::Message, registry::Registry};

/// Producer side of the relay channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl RelayHandle {
    /// Enqueue a message for fan-out.
    ///
    /// Returns `false` when the relay has already stopped; the message is
    /// dropped in that case.
    pub fn publish(&self, message: Message) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(mpsc::error::SendError(message)) => {
                tracing::warn!(
                    "Relay stopped, dropping {:?} message from '{}'",
                    message.kind,
                    message.nickname
                );
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

/// Totals reported by the relay when it stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub messages: u64,
    pub deliveries: u64,
    pub failures: u64,
}

/// Single consumer of the relay channel.
pub struct Relay {
    registry: Arc<Registry>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Relay {
    pub fn new(registry: Arc<Registry>) -> (Self, RelayHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { registry, rx }, RelayHandle { tx })
    }

    /// Start the relay on its own task.
    ///
    /// The task ends once every [`RelayHandle`] is dropped and the queue is
    /// drained.
    pub fn spawn(registry: Arc<Registry>) -> (RelayHandle, JoinHandle<RelayStats>) {
        let (relay, handle) = Self::new(registry);
        (handle, tokio::spawn(relay.run()))
    }

    pub async fn run(mut self) -> RelayStats {
        let mut stats = RelayStats::default();

        while let Some(message) = self.rx.recv().await {
            let outcome = self.registry.fan_out(&message).await;
            tracing::debug!(
                "Relayed {:?} from '{}' to {} peer(s), {} failed",
                message.kind,
                message.nickname,
                outcome.delivered,
                outcome.failed
            );
            stats.messages += 1;
            stats.deliveries += outcome.delivered as u64;
            stats.failures += outcome.failed as u64;
        }

        tracing::debug!("Relay channel closed");
        stats
    }
}
