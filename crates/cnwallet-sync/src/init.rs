//! Daemon handshake and synchronizer startup
//!
//! Runs right after a wallet is constructed or loaded: handshake with the
//! daemon, then build (or re-attach) and start the synchronizer.

use crate::daemon::Daemon;
use crate::events::EventSink;
use crate::synchronizer::{SyncContext, WalletSynchronizer};
use cnwallet_core::{Result, SubWallets, WalletError};
use cnwallet_storage::SynchronizerState;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// How long to wait for the daemon handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeWait {
    /// Wait until the daemon answers, however long that takes
    #[default]
    Unbounded,
    /// Give up after the duration and report `FailedToInitDaemon`
    Timeout(Duration),
}

/// Block the calling thread until `daemon` completes its handshake
///
/// Must not be called from inside an async context.
pub fn wait_for_handshake(daemon: &dyn Daemon, wait: HandshakeWait, runtime: &Handle) -> Result<()> {
    let (tx, rx) = oneshot::channel();
    daemon.init(Box::new(move |outcome: crate::Result<()>| {
        let _ = tx.send(outcome);
    }));

    let outcome = match wait {
        HandshakeWait::Unbounded => {
            info!(
                "Waiting for daemon {} to respond, this may hang if it never does",
                daemon.endpoint()
            );
            rx.blocking_recv().map_err(|_| {
                warn!("Daemon handshake callback was dropped");
                WalletError::FailedToInitDaemon
            })?
        }
        HandshakeWait::Timeout(limit) => runtime
            .block_on(tokio::time::timeout(limit, rx))
            .map_err(|_| {
                warn!("Daemon {} did not respond within {:?}", daemon.endpoint(), limit);
                WalletError::FailedToInitDaemon
            })?
            .map_err(|_| {
                warn!("Daemon handshake callback was dropped");
                WalletError::FailedToInitDaemon
            })?,
    };

    outcome.map_err(|e| {
        error!("Failed to init daemon {}: {}", daemon.endpoint(), e);
        WalletError::from(e)
    })
}

/// Post-construction initialization of a wallet
#[derive(Debug, Clone)]
pub struct InitOrchestrator {
    runtime: Handle,
    wait: HandshakeWait,
    poll_interval: Duration,
}

impl InitOrchestrator {
    /// Create an orchestrator spawning on `runtime`
    pub fn new(runtime: Handle, wait: HandshakeWait, poll_interval: Duration) -> Self {
        Self {
            runtime,
            wait,
            poll_interval,
        }
    }

    /// Handshake with the daemon, then start a synchronizer
    ///
    /// With `restored` progress the synchronizer resumes from it; otherwise it
    /// starts from the earliest sync start point of the subwallets.
    ///
    /// # Panics
    /// If `daemon` is `None`. Calling init on a wallet without a daemon is a
    /// programming error.
    pub fn init(
        &self,
        daemon: Option<&Arc<dyn Daemon>>,
        events: Arc<dyn EventSink>,
        sub_wallets: &Arc<RwLock<SubWallets>>,
        restored: Option<SynchronizerState>,
    ) -> Result<WalletSynchronizer> {
        let daemon = match daemon {
            Some(daemon) => daemon,
            None => panic!("wallet init called without a daemon"),
        };

        wait_for_handshake(&**daemon, self.wait, &self.runtime)?;

        let context = SyncContext {
            daemon: Arc::clone(daemon),
            events,
            sub_wallets: Arc::clone(sub_wallets),
            runtime: self.runtime.clone(),
            poll_interval: self.poll_interval,
        };

        let mut synchronizer = match restored {
            Some(state) => {
                info!(
                    scanned_height = state.scanned_height,
                    "Resuming wallet synchronizer"
                );
                WalletSynchronizer::resume(context, state)
            }
            None => {
                let (start_height, start_timestamp) = sub_wallets.read().min_initial_sync_start();
                WalletSynchronizer::new(context, start_height, start_timestamp)
            }
        };

        synchronizer.start();
        Ok(synchronizer)
    }
}
