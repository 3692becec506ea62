//! Daemon connection and wallet synchronization
//!
//! Provides the daemon seam with its HTTP adapter, the startup handshake, and
//! the background synchronizer that tracks chain height and reports progress
//! through an event sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod daemon;
pub mod error;
pub mod events;
pub mod init;
pub mod synchronizer;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use cancel::CancelToken;
pub use daemon::{
    Daemon, DaemonConfig, DaemonFactory, HttpDaemon, HttpDaemonFactory, InitCallback, RetryConfig,
};
pub use error::{Error, Result};
pub use events::{EventHandler, EventSink, SyncEvent};
pub use init::{wait_for_handshake, HandshakeWait, InitOrchestrator};
pub use synchronizer::{SyncContext, SyncStatus, WalletSynchronizer};
