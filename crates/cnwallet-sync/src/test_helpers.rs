//! In-process daemon doubles for tests

use crate::daemon::{Daemon, DaemonFactory, InitCallback};
use crate::events::{EventSink, SyncEvent};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a [`FakeDaemon`] answers the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeBehavior {
    /// Report success from another thread
    Succeed,
    /// Report success from another thread after a delay
    SucceedAfter(Duration),
    /// Report failure from another thread
    Fail,
    /// Drop the callback without calling it
    DropCallback,
    /// Hold on to the callback forever
    NeverRespond,
}

/// Scripted daemon
pub struct FakeDaemon {
    endpoint: String,
    behavior: Mutex<HandshakeBehavior>,
    network_height: AtomicU64,
    offline: AtomicBool,
    init_calls: AtomicUsize,
    pending: Mutex<Vec<InitCallback>>,
}

impl FakeDaemon {
    /// Daemon at a placeholder endpoint
    pub fn new(behavior: HandshakeBehavior) -> Self {
        Self::with_endpoint("127.0.0.1:11898", behavior)
    }

    /// Daemon reporting `endpoint`
    pub fn with_endpoint(endpoint: &str, behavior: HandshakeBehavior) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            behavior: Mutex::new(behavior),
            network_height: AtomicU64::new(0),
            offline: AtomicBool::new(false),
            init_calls: AtomicUsize::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Height returned by `network_height`
    pub fn set_network_height(&self, height: u64) {
        self.network_height.store(height, Ordering::Release);
    }

    /// Change how later handshakes are answered
    pub fn set_behavior(&self, behavior: HandshakeBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Make `network_height` fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    /// Number of handshakes started
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Daemon for FakeDaemon {
    fn init(&self, callback: InitCallback) {
        self.init_calls.fetch_add(1, Ordering::AcqRel);
        let behavior = *self.behavior.lock();
        match behavior {
            HandshakeBehavior::Succeed => {
                std::thread::spawn(move || callback(Ok(())));
            }
            HandshakeBehavior::SucceedAfter(delay) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    callback(Ok(()))
                });
            }
            HandshakeBehavior::Fail => {
                std::thread::spawn(move || {
                    callback(Err(Error::Connection("fake daemon refused".to_string())))
                });
            }
            HandshakeBehavior::DropCallback => drop(callback),
            HandshakeBehavior::NeverRespond => self.pending.lock().push(callback),
        }
    }

    async fn network_height(&self) -> Result<u64> {
        if self.offline.load(Ordering::Acquire) {
            return Err(Error::Network("fake daemon offline".to_string()));
        }
        Ok(self.network_height.load(Ordering::Acquire))
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Factory handing out [`FakeDaemon`]s
pub struct FakeDaemonFactory {
    behavior: HandshakeBehavior,
    network_height: u64,
    created: Mutex<Vec<Arc<FakeDaemon>>>,
}

impl FakeDaemonFactory {
    /// Factory whose daemons handshake with `behavior`
    pub fn new(behavior: HandshakeBehavior) -> Self {
        Self {
            behavior,
            network_height: 0,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Network height new daemons start with
    pub fn with_network_height(mut self, height: u64) -> Self {
        self.network_height = height;
        self
    }

    /// Most recently created daemon
    pub fn last_daemon(&self) -> Option<Arc<FakeDaemon>> {
        self.created.lock().last().cloned()
    }

    /// Endpoints of every daemon created so far
    pub fn endpoints(&self) -> Vec<String> {
        self.created.lock().iter().map(|d| d.endpoint()).collect()
    }
}

impl DaemonFactory for FakeDaemonFactory {
    fn create(&self, host: &str, port: u16) -> Result<Arc<dyn Daemon>> {
        let daemon = Arc::new(FakeDaemon::with_endpoint(
            &format!("{}:{}", host, port),
            self.behavior,
        ));
        daemon.set_network_height(self.network_height);
        self.created.lock().push(Arc::clone(&daemon));
        Ok(daemon)
    }
}

/// Sink keeping every event in memory
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().push(event);
    }
}
