//! Wallet file IO
//!
//! Writes go through a temporary file in the target directory that is renamed
//! over the wallet, so a failed save never leaves a half-written file. A new
//! wallet's path is reserved with an empty file until its first save.

use cnwallet_core::{Result, WalletError};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Reserve `path` for a wallet that is about to be created
///
/// Leaves an empty file at `path` so no other writer can claim it while the
/// wallet is set up. The first save replaces it through
/// [`write_new_wallet_file`]; [`release_wallet_reservation`] removes it if
/// creation is abandoned.
///
/// # Errors
/// - `WalletFileAlreadyExists`: something already exists at `path`
/// - `InvalidWalletFilename`: the file cannot be created
pub fn reserve_new_wallet_file(path: &Path) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            debug!("Reserved wallet file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(WalletError::WalletFileAlreadyExists)
        }
        Err(e) => {
            debug!("Cannot create wallet file {}: {}", path.display(), e);
            Err(WalletError::InvalidWalletFilename)
        }
    }
}

/// Remove a reservation left by [`reserve_new_wallet_file`]
///
/// Only an empty file is removed. Anything written there since belongs to
/// someone else and is left alone.
pub fn release_wallet_reservation(path: &Path) {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove reserved wallet file {}: {}", path.display(), e);
            }
        }
        Ok(_) => warn!(
            "Reserved wallet file {} was replaced by another writer, leaving it in place",
            path.display()
        ),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Cannot inspect reserved wallet file {}: {}", path.display(), e),
    }
}

/// Read the raw wallet file image
pub fn read_wallet_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    fs::read(path).map(Zeroizing::new).map_err(|e| {
        debug!("Cannot read wallet file {}: {}", path.display(), e);
        WalletError::FilenameNonExistent
    })
}

/// Atomically replace the wallet file at `path` with `contents`
pub fn write_wallet_file(path: &Path, contents: &[u8]) -> Result<()> {
    let temp = stage(path, contents).map_err(|e| write_failed(path, e))?;
    temp.persist(path).map_err(|e| write_failed(path, e.error))?;
    Ok(())
}

/// First save of a new wallet into the path reserved for it
///
/// Only an empty reservation may be replaced. The rename never clobbers a
/// file, so a wallet written at `path` by someone else survives.
///
/// # Errors
/// - `WalletFileAlreadyExists`: `path` holds data that is not ours
/// - `InvalidWalletFilename`: the file cannot be written
pub fn write_new_wallet_file(path: &Path, contents: &[u8]) -> Result<()> {
    let temp = stage(path, contents).map_err(|e| write_failed(path, e))?;

    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == 0 => {
            fs::remove_file(path).map_err(|e| write_failed(path, e))?;
        }
        Ok(_) => {
            warn!(
                "Wallet file {} was written by someone else while it was reserved",
                path.display()
            );
            return Err(WalletError::WalletFileAlreadyExists);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(write_failed(path, e)),
    }

    temp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            warn!("Wallet file {} appeared before the first save", path.display());
            WalletError::WalletFileAlreadyExists
        } else {
            write_failed(path, e.error)
        }
    })?;
    Ok(())
}

/// Write `contents` to a synced temporary file next to `path`
fn stage(path: &Path, contents: &[u8]) -> io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    Ok(temp)
}

fn write_failed(path: &Path, e: io::Error) -> WalletError {
    warn!("Failed to write wallet file {}: {}", path.display(), e);
    WalletError::InvalidWalletFilename
}
