//! Error types for daemon and sync operations

use cnwallet_core::WalletError;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Daemon answered with something we could not use
    #[error("Invalid daemon response: {0}")]
    InvalidResponse(String),

    /// Operation cancelled
    #[error("Cancelled")]
    Cancelled,

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<Error> for WalletError {
    fn from(_: Error) -> Self {
        WalletError::FailedToInitDaemon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_failed_to_init_daemon() {
        let err: WalletError = Error::Connection("refused".to_string()).into();
        assert_eq!(err, WalletError::FailedToInitDaemon);
        assert_eq!(WalletError::from(Error::Cancelled), WalletError::FailedToInitDaemon);
    }
}
