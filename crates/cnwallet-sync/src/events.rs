//! Synchronizer events
//!
//! Events are logged through `tracing` and fanned out to subscribers over a
//! broadcast channel. Slow subscribers miss events rather than stall the
//! synchronizer.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Event emitted by the synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Synchronizer task started
    Started {
        /// Height scanning starts from
        start_height: u64,
        /// Timestamp scanning starts from
        start_timestamp: u64,
    },
    /// New heights observed
    HeightUpdate {
        /// Highest height processed by the wallet
        scanned_height: u64,
        /// Height of the network
        network_height: u64,
    },
    /// The daemon could not be queried
    DaemonError {
        /// Error description
        message: String,
    },
    /// Synchronizer task stopped
    Stopped {
        /// Highest height processed by the wallet
        scanned_height: u64,
    },
}

/// Receiver of synchronizer events
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not block.
    fn emit(&self, event: SyncEvent);
}

/// Default sink: structured log line plus broadcast to subscribers
#[derive(Debug, Clone)]
pub struct EventHandler {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventHandler {
    /// Create a handler buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for EventHandler {
    fn emit(&self, event: SyncEvent) {
        match &event {
            SyncEvent::Started {
                start_height,
                start_timestamp,
            } => info!(
                event = "sync_started",
                start_height,
                start_timestamp,
                "Wallet synchronizer started"
            ),
            SyncEvent::HeightUpdate {
                scanned_height,
                network_height,
            } => debug!(
                event = "sync_height",
                scanned_height,
                network_height,
                "Sync height update"
            ),
            SyncEvent::DaemonError { message } => warn!(
                event = "sync_daemon_error",
                error = %message,
                "Daemon query failed"
            ),
            SyncEvent::Stopped { scanned_height } => info!(
                event = "sync_stopped",
                scanned_height,
                "Wallet synchronizer stopped"
            ),
        }

        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}
