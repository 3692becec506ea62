//! Handles a wallet depends on
//!
//! Everything a wallet needs from its host is passed in through
//! [`WalletServices`] rather than reached through globals: the tokio runtime
//! its tasks run on, how daemons are reached, how seeds are decoded, and the
//! sync tuning knobs.

use crate::config::WalletConfig;
use cnwallet_core::MnemonicDecoder;
use cnwallet_params::Network;
use cnwallet_sync::{DaemonFactory, HandshakeWait, HttpDaemonFactory, InitOrchestrator};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Injected dependencies shared by the wallets of one host
#[derive(Clone)]
pub struct WalletServices {
    runtime: Arc<Runtime>,
    network: Network,
    daemon_factory: Arc<dyn DaemonFactory>,
    mnemonic_decoder: Arc<dyn MnemonicDecoder>,
    handshake_wait: HandshakeWait,
    poll_interval: Duration,
    event_capacity: usize,
}

impl WalletServices {
    /// Services with default tuning
    pub fn new(
        runtime: Arc<Runtime>,
        daemon_factory: Arc<dyn DaemonFactory>,
        mnemonic_decoder: Arc<dyn MnemonicDecoder>,
    ) -> Self {
        let config = WalletConfig::default();
        Self {
            runtime,
            network: config.network(),
            daemon_factory,
            mnemonic_decoder,
            handshake_wait: config.handshake_wait(),
            poll_interval: config.poll_interval,
            event_capacity: config.event_capacity,
        }
    }

    /// Services reaching daemons over HTTP as configured
    pub fn from_config(
        config: &WalletConfig,
        runtime: Arc<Runtime>,
        mnemonic_decoder: Arc<dyn MnemonicDecoder>,
    ) -> Self {
        let daemon_factory = Arc::new(HttpDaemonFactory::new(
            config.daemon.clone(),
            runtime.handle().clone(),
        ));

        Self {
            runtime,
            network: config.network(),
            daemon_factory,
            mnemonic_decoder,
            handshake_wait: config.handshake_wait(),
            poll_interval: config.poll_interval,
            event_capacity: config.event_capacity,
        }
    }

    /// Use a different network
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Use a different handshake wait strategy
    pub fn with_handshake_wait(mut self, wait: HandshakeWait) -> Self {
        self.handshake_wait = wait;
        self
    }

    /// Use a different height poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Use a different event buffer size
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Runtime wallets run their tasks on
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Network addresses are encoded for
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Builds a daemon for each wallet
    pub fn daemon_factory(&self) -> &Arc<dyn DaemonFactory> {
        &self.daemon_factory
    }

    /// Seed phrase decoder used by seed imports
    pub fn mnemonic_decoder(&self) -> &dyn MnemonicDecoder {
        &*self.mnemonic_decoder
    }

    /// Events buffered per subscriber
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    pub(crate) fn orchestrator(&self) -> InitOrchestrator {
        InitOrchestrator::new(
            self.runtime.handle().clone(),
            self.handshake_wait,
            self.poll_interval,
        )
    }
}
