//! Error types for the wallet backend
//!
//! Closed taxonomy of lifecycle and file-format failures. Success is `Ok(_)`;
//! the numeric codes match the wallet API's historical `WalletError` values.

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, WalletError>;

/// Wallet lifecycle and codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum WalletError {
    /// The wallet file to open does not exist or cannot be read
    #[error("The wallet file does not exist or cannot be read")]
    FilenameNonExistent,

    /// The wallet file cannot be opened for writing
    #[error("The wallet filename is invalid or cannot be written to")]
    InvalidWalletFilename,

    /// The file lacks the wallet file identifier
    #[error("The file is not a wallet file")]
    NotAWalletFile,

    /// The wallet file is truncated or its contents are malformed
    #[error("The wallet file is corrupted")]
    WalletFileCorrupted,

    /// The password check identifier did not decrypt correctly
    #[error("The password is incorrect")]
    WrongPassword,

    /// A wallet creation target already exists
    #[error("A file with that name already exists")]
    WalletFileAlreadyExists,

    /// The mnemonic seed could not be converted to a key
    #[error("The mnemonic seed is invalid")]
    InvalidMnemonic,

    /// The daemon handshake reported a failure
    #[error("Failed to initialize the daemon connection")]
    FailedToInitDaemon,

    /// The address has the wrong length
    #[error("The address is the wrong length")]
    AddressWrongLength,

    /// The address is not valid base58 or fails its checksum
    #[error("The address is not valid")]
    AddressNotValid,

    /// The address belongs to a different network
    #[error("The address has the wrong prefix")]
    AddressWrongPrefix,

    /// The address is valid but not one of this wallet's addresses
    #[error("The address is not in this wallet")]
    AddressNotInWallet,
}

impl WalletError {
    /// Numeric code reported for success.
    pub const SUCCESS_CODE: u32 = 0;

    /// Stable numeric code for this error.
    pub fn code(&self) -> u32 {
        match self {
            WalletError::FilenameNonExistent => 1,
            WalletError::InvalidWalletFilename => 2,
            WalletError::NotAWalletFile => 3,
            WalletError::WalletFileCorrupted => 4,
            WalletError::WrongPassword => 5,
            WalletError::WalletFileAlreadyExists => 6,
            WalletError::InvalidMnemonic => 7,
            WalletError::FailedToInitDaemon => 8,
            WalletError::AddressWrongLength => 9,
            WalletError::AddressNotValid => 10,
            WalletError::AddressWrongPrefix => 11,
            WalletError::AddressNotInWallet => 12,
        }
    }

    /// Numeric code of a result, `SUCCESS_CODE` for `Ok`.
    pub fn code_of<T>(result: &Result<T>) -> u32 {
        match result {
            Ok(_) => Self::SUCCESS_CODE,
            Err(e) => e.code(),
        }
    }

    /// Check if error is caused by user input (vs environment/internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            WalletError::WrongPassword
                | WalletError::WalletFileAlreadyExists
                | WalletError::InvalidMnemonic
                | WalletError::AddressWrongLength
                | WalletError::AddressNotValid
                | WalletError::AddressWrongPrefix
                | WalletError::AddressNotInWallet
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            WalletError::FilenameNonExistent
            | WalletError::InvalidWalletFilename
            | WalletError::WalletFileAlreadyExists => ErrorCategory::Filesystem,
            WalletError::NotAWalletFile
            | WalletError::WalletFileCorrupted
            | WalletError::WrongPassword => ErrorCategory::WalletFile,
            WalletError::InvalidMnemonic => ErrorCategory::Keys,
            WalletError::FailedToInitDaemon => ErrorCategory::Network,
            WalletError::AddressWrongLength
            | WalletError::AddressNotValid
            | WalletError::AddressWrongPrefix
            | WalletError::AddressNotInWallet => ErrorCategory::Address,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wallet path errors
    Filesystem,
    /// Container decoding errors
    WalletFile,
    /// Key material errors
    Keys,
    /// Daemon errors
    Network,
    /// Address errors
    Address,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Filesystem => write!(f, "Filesystem"),
            ErrorCategory::WalletFile => write!(f, "WalletFile"),
            ErrorCategory::Keys => write!(f, "Keys"),
            ErrorCategory::Network => write!(f, "Network"),
            ErrorCategory::Address => write!(f, "Address"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_nonzero() {
        let all = [
            WalletError::FilenameNonExistent,
            WalletError::InvalidWalletFilename,
            WalletError::NotAWalletFile,
            WalletError::WalletFileCorrupted,
            WalletError::WrongPassword,
            WalletError::WalletFileAlreadyExists,
            WalletError::InvalidMnemonic,
            WalletError::FailedToInitDaemon,
            WalletError::AddressWrongLength,
            WalletError::AddressNotValid,
            WalletError::AddressWrongPrefix,
            WalletError::AddressNotInWallet,
        ];
        let mut codes: Vec<u32> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
        assert!(!codes.contains(&WalletError::SUCCESS_CODE));
    }

    #[test]
    fn test_code_of_result() {
        assert_eq!(WalletError::code_of(&Ok::<(), WalletError>(())), 0);
        assert_eq!(WalletError::code_of::<()>(&Err(WalletError::WrongPassword)), 5);
    }

    #[test]
    fn test_user_error_detection() {
        assert!(WalletError::WrongPassword.is_user_error());
        assert!(WalletError::InvalidMnemonic.is_user_error());
        assert!(!WalletError::FailedToInitDaemon.is_user_error());
        assert!(!WalletError::WalletFileCorrupted.is_user_error());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(WalletError::NotAWalletFile.category(), ErrorCategory::WalletFile);
        assert_eq!(WalletError::FailedToInitDaemon.category(), ErrorCategory::Network);
        assert_eq!(WalletError::AddressNotInWallet.category(), ErrorCategory::Address);
        assert_eq!(ErrorCategory::Filesystem.to_string(), "Filesystem");
    }
}
