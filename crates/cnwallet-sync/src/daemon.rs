//! Daemon seam and the HTTP daemon adapter
//!
//! The wallet talks to its daemon through [`Daemon`]. [`HttpDaemon`] speaks
//! the daemon's JSON HTTP interface; tests plug in their own implementations
//! through [`DaemonFactory`].

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Single-fire handshake completion callback
pub type InitCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Connection to a daemon
#[async_trait]
pub trait Daemon: Send + Sync {
    /// Start the handshake and return immediately
    ///
    /// `callback` is invoked exactly once with the outcome, from any thread.
    /// Dropping it without calling it counts as a failed handshake.
    fn init(&self, callback: InitCallback);

    /// Current height of the network as seen by the daemon
    async fn network_height(&self) -> Result<u64>;

    /// `host:port` of the daemon, for logging
    fn endpoint(&self) -> String;
}

/// Builds daemon handles for a wallet
pub trait DaemonFactory: Send + Sync {
    /// Create a handle for the daemon at `host:port`. Does not connect.
    fn create(&self, host: &str, port: u16) -> Result<Arc<dyn Daemon>>;
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retry attempts
    pub max_attempts: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    fn next_backoff(&self, backoff: Duration) -> Duration {
        std::cmp::min(
            Duration::from_millis((backoff.as_millis() as f64 * self.backoff_multiplier) as u64),
            self.max_backoff,
        )
    }
}

/// HTTP daemon client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Handshake retry policy
    pub retry: RetryConfig,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeightResponse {
    height: u64,
    network_height: u64,
}

/// Daemon reached over its JSON HTTP interface
pub struct HttpDaemon {
    endpoint: String,
    base_url: String,
    client: reqwest::Client,
    retry: RetryConfig,
    runtime: Handle,
}

impl HttpDaemon {
    /// Create a client for `host:port`. The handshake runs on `runtime`.
    pub fn new(host: &str, port: u16, config: &DaemonConfig, runtime: Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            endpoint: format!("{}:{}", host, port),
            base_url: format!("http://{}:{}", host, port),
            client,
            retry: config.retry.clone(),
            runtime,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_height(client: &reqwest::Client, base_url: &str) -> Result<HeightResponse> {
        let response = client
            .get(format!("{}/getheight", base_url))
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// Query the daemon until it answers or the retry budget runs out
    async fn connect(
        client: &reqwest::Client,
        base_url: &str,
        retry: &RetryConfig,
    ) -> Result<HeightResponse> {
        let mut attempt = 0;
        let mut backoff = retry.initial_backoff;

        loop {
            match Self::fetch_height(client, base_url).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    attempt += 1;
                    if attempt >= retry.max_attempts {
                        error!("Failed to reach daemon after {} attempts: {}", attempt, e);
                        return Err(Error::Connection(e.to_string()));
                    }

                    warn!(
                        "Daemon attempt {} failed, retrying in {:?}: {}",
                        attempt, backoff, e
                    );

                    tokio::time::sleep(backoff).await;
                    backoff = retry.next_backoff(backoff);
                }
            }
        }
    }
}

#[async_trait]
impl Daemon for HttpDaemon {
    fn init(&self, callback: InitCallback) {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let retry = self.retry.clone();

        debug!("Starting daemon handshake with {}", base_url);
        self.runtime.spawn(async move {
            let outcome = Self::connect(&client, &base_url, &retry).await.map(|info| {
                info!(
                    daemon = %base_url,
                    height = info.height,
                    network_height = info.network_height,
                    "Connected to daemon"
                );
            });
            callback(outcome);
        });
    }

    async fn network_height(&self) -> Result<u64> {
        Self::fetch_height(&self.client, &self.base_url)
            .await
            .map(|info| info.network_height)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Factory producing [`HttpDaemon`] handles
#[derive(Clone)]
pub struct HttpDaemonFactory {
    config: DaemonConfig,
    runtime: Handle,
}

impl HttpDaemonFactory {
    /// Create a factory whose daemons run their handshakes on `runtime`
    pub fn new(config: DaemonConfig, runtime: Handle) -> Self {
        Self { config, runtime }
    }
}

impl DaemonFactory for HttpDaemonFactory {
    fn create(&self, host: &str, port: u16) -> Result<Arc<dyn Daemon>> {
        let daemon = HttpDaemon::new(host, port, &self.config, self.runtime.clone())?;
        Ok(Arc::new(daemon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryConfig {
            max_backoff: Duration::from_millis(300),
            ..RetryConfig::default()
        };
        let first = retry.next_backoff(retry.initial_backoff);
        assert_eq!(first, Duration::from_millis(200));
        assert_eq!(retry.next_backoff(first), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_http_daemon_urls() {
        let daemon =
            HttpDaemon::new("127.0.0.1", 11898, &DaemonConfig::default(), Handle::current()).unwrap();
        assert_eq!(daemon.base_url(), "http://127.0.0.1:11898");
        assert_eq!(daemon.endpoint(), "127.0.0.1:11898");
    }

    #[test]
    fn test_retry_config_from_partial_json() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_attempts": 2}"#).unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.initial_backoff, RetryConfig::default().initial_backoff);
    }
}
