//! Wallet service configuration

use anyhow::{Context, Result};
use cnwallet_params::{Network, NetworkType};
use cnwallet_sync::{DaemonConfig, HandshakeWait};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay between daemon height polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default per-subscriber event buffer
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for wallets opened through [`WalletServices`](crate::WalletServices)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Network addresses are encoded for
    pub network: NetworkType,
    /// Give up on the daemon handshake after this long. `None` waits forever.
    pub handshake_timeout: Option<Duration>,
    /// Delay between daemon height polls
    pub poll_interval: Duration,
    /// Events buffered per subscriber before the oldest are dropped
    pub event_capacity: usize,
    /// HTTP daemon client settings
    pub daemon: DaemonConfig,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::Mainnet,
            handshake_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            daemon: DaemonConfig::default(),
        }
    }
}

impl WalletConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Network parameters for [`network`](Self::network)
    pub fn network(&self) -> Network {
        Network::from_type(self.network)
    }

    /// Handshake wait strategy
    pub fn handshake_wait(&self) -> HandshakeWait {
        match self.handshake_timeout {
            Some(limit) => HandshakeWait::Timeout(limit),
            None => HandshakeWait::Unbounded,
        }
    }
}
