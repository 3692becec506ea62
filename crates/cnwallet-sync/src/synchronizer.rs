//! Background wallet synchronizer
//!
//! Runs as a task on the wallet's runtime, polling the daemon for the network
//! height and reporting through the event sink. Block scanning feeds its
//! progress back through [`WalletSynchronizer::record_scanned`].

use crate::cancel::CancelToken;
use crate::daemon::Daemon;
use crate::events::{EventSink, SyncEvent};
use cnwallet_core::{PublicKey, SubWallets};
use cnwallet_storage::SynchronizerState;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handles the synchronizer runs against
#[derive(Clone)]
pub struct SyncContext {
    /// Daemon to poll
    pub daemon: Arc<dyn Daemon>,
    /// Where progress is reported
    pub events: Arc<dyn EventSink>,
    /// Subwallets being scanned for
    pub sub_wallets: Arc<RwLock<SubWallets>>,
    /// Runtime the background task is spawned on
    pub runtime: Handle,
    /// Delay between daemon height queries
    pub poll_interval: Duration,
}

/// Snapshot of sync progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    /// Highest height processed by the wallet
    pub scanned_height: u64,
    /// Last network height reported by the daemon (0 before the first poll)
    pub network_height: u64,
    /// Whether the background task is running
    pub running: bool,
}

/// Wallet synchronizer
pub struct WalletSynchronizer {
    context: SyncContext,
    state: Arc<Mutex<SynchronizerState>>,
    network_height: Arc<AtomicU64>,
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

impl WalletSynchronizer {
    /// Fresh synchronizer starting at `(start_height, start_timestamp)`
    pub fn new(context: SyncContext, start_height: u64, start_timestamp: u64) -> Self {
        Self::resume(
            context,
            SynchronizerState::starting_at(start_height, start_timestamp),
        )
    }

    /// Synchronizer continuing from saved progress
    pub fn resume(context: SyncContext, state: SynchronizerState) -> Self {
        Self {
            context,
            state: Arc::new(Mutex::new(state)),
            network_height: Arc::new(AtomicU64::new(0)),
            cancel: CancelToken::new(),
            task: None,
        }
    }

    /// Spawn the background task. Returns immediately; a second call while
    /// running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.cancel = CancelToken::new();
        let task = run(
            Arc::clone(&self.context.daemon),
            Arc::clone(&self.context.events),
            Arc::clone(&self.state),
            Arc::clone(&self.network_height),
            self.cancel.clone(),
            self.context.poll_interval,
        );
        self.task = Some(self.context.runtime.spawn(task));
    }

    /// Ask the background task to stop. Does not wait for it.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.task = None;
    }

    /// Whether the background task is running
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Progress to persist
    pub fn state(&self) -> SynchronizerState {
        *self.state.lock()
    }

    /// Current progress
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            scanned_height: self.state.lock().scanned_height,
            network_height: self.network_height.load(Ordering::Acquire),
            running: self.is_running(),
        }
    }

    /// Record that blocks up to `height` have been processed
    ///
    /// Progress never moves backwards.
    pub fn record_scanned(&self, height: u64) {
        let mut state = self.state.lock();
        if height > state.scanned_height {
            state.scanned_height = height;
        }
    }

    /// Public spend keys of the subwallets being scanned for
    pub fn tracked_spend_keys(&self) -> Vec<PublicKey> {
        self.context
            .sub_wallets
            .read()
            .sub_wallets()
            .iter()
            .filter_map(|w| w.public_spend_key().copied())
            .collect()
    }

    /// Daemon the synchronizer polls
    pub fn daemon(&self) -> &Arc<dyn Daemon> {
        &self.context.daemon
    }
}

impl Drop for WalletSynchronizer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    daemon: Arc<dyn Daemon>,
    events: Arc<dyn EventSink>,
    state: Arc<Mutex<SynchronizerState>>,
    network_height: Arc<AtomicU64>,
    cancel: CancelToken,
    poll_interval: Duration,
) {
    let start = *state.lock();
    events.emit(SyncEvent::Started {
        start_height: start.start_height,
        start_timestamp: start.start_timestamp,
    });

    let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match daemon.network_height().await {
                    Ok(height) => {
                        network_height.store(height, Ordering::Release);
                        let scanned_height = state.lock().scanned_height;
                        events.emit(SyncEvent::HeightUpdate {
                            scanned_height,
                            network_height: height,
                        });
                    }
                    Err(e) => {
                        debug!("Height poll against {} failed: {}", daemon.endpoint(), e);
                        events.emit(SyncEvent::DaemonError {
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    let scanned_height = state.lock().scanned_height;
    events.emit(SyncEvent::Stopped { scanned_height });
}
