//! Integration tests for HttpDaemon
//!
//! Run live tests with:
//!   cargo test --package cnwallet-sync --features live_daemon -- --ignored
//!
//! The loopback tests serve canned `/getheight` answers from a local socket.

use cnwallet_core::WalletError;
use cnwallet_sync::{
    wait_for_handshake, Daemon, DaemonConfig, DaemonFactory, HandshakeWait, HttpDaemon,
    HttpDaemonFactory, RetryConfig,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn quick_config(max_attempts: u32) -> DaemonConfig {
    DaemonConfig {
        retry: RetryConfig {
            max_attempts,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(20),
            backoff_multiplier: 2.0,
        },
        request_timeout: Duration::from_secs(2),
    }
}

/// Serve `body` with `status` to every connection, returning the bound port
async fn serve(status: &'static str, body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    port
}

/// Port with nothing listening on it
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ============================================================================
// Loopback tests
// ============================================================================

#[test]
fn test_handshake_against_height_endpoint() {
    let rt = runtime();
    let port = rt.block_on(serve(
        "200 OK",
        r#"{"height":1000,"network_height":1002,"status":"OK"}"#,
    ));

    let daemon = HttpDaemon::new("127.0.0.1", port, &quick_config(3), rt.handle().clone()).unwrap();
    assert_eq!(wait_for_handshake(&daemon, HandshakeWait::Unbounded, rt.handle()), Ok(()));
    assert_eq!(rt.block_on(daemon.network_height()).unwrap(), 1002);
}

#[test]
fn test_handshake_fails_when_nothing_listens() {
    let rt = runtime();
    let factory = HttpDaemonFactory::new(quick_config(2), rt.handle().clone());
    let daemon = factory.create("127.0.0.1", closed_port()).unwrap();

    assert_eq!(
        wait_for_handshake(daemon.as_ref(), HandshakeWait::Unbounded, rt.handle()),
        Err(WalletError::FailedToInitDaemon)
    );
}

#[test]
fn test_handshake_fails_on_http_error() {
    let rt = runtime();
    let port = rt.block_on(serve("500 Internal Server Error", "{}"));
    let daemon = HttpDaemon::new("127.0.0.1", port, &quick_config(1), rt.handle().clone()).unwrap();

    assert_eq!(
        wait_for_handshake(&daemon, HandshakeWait::Unbounded, rt.handle()),
        Err(WalletError::FailedToInitDaemon)
    );
}

#[test]
fn test_handshake_fails_on_malformed_body() {
    let rt = runtime();
    let port = rt.block_on(serve("200 OK", r#"{"status":"OK"}"#));
    let daemon = HttpDaemon::new("127.0.0.1", port, &quick_config(1), rt.handle().clone()).unwrap();

    assert_eq!(
        wait_for_handshake(&daemon, HandshakeWait::Unbounded, rt.handle()),
        Err(WalletError::FailedToInitDaemon)
    );
    assert!(rt.block_on(daemon.network_height()).is_err());
}

// ============================================================================
// Feature-gated live integration tests
// ============================================================================

#[cfg(feature = "live_daemon")]
mod live_tests {
    use super::*;

    /// Test handshake with a daemon on the default mainnet port
    #[test]
    #[ignore = "Requires a running daemon"]
    fn test_live_handshake() {
        let rt = runtime();
        let network = cnwallet_params::Network::mainnet();
        let daemon =
            HttpDaemon::new("127.0.0.1", network.rpc_port, &DaemonConfig::default(), rt.handle().clone())
                .unwrap();

        let result = wait_for_handshake(&daemon, HandshakeWait::Timeout(Duration::from_secs(30)), rt.handle());
        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
    }
}
