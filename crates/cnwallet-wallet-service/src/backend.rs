//! Wallet lifecycle
//!
//! [`WalletBackend`] owns one wallet file. It is created through one of the
//! five entry points, connects to its daemon and starts synchronizing before
//! it is handed back, and saves itself when dropped.
//!
//! ```text
//! Uninitialized -> IdentityEstablished -> Persisted -> DaemonConnecting -> SynchronizerRunning
//! ```
//!
//! Every entry point fails fast. On error no wallet is returned and no wallet
//! file is created or overwritten.

use crate::services::WalletServices;
use cnwallet_core::{
    parse_address, Result, SecretKey, SubWallets, WalletError, WalletIdentity,
};
use cnwallet_params::Network;
use cnwallet_storage::{
    decrypt, encrypt, read_wallet_file, release_wallet_reservation, reserve_new_wallet_file,
    write_new_wallet_file, write_wallet_file, PartialWalletDocument, RestoredWallet,
    SynchronizerState, WalletDocument,
};
use cnwallet_sync::{
    Daemon, EventHandler, InitOrchestrator, SyncEvent, SyncStatus, WalletSynchronizer,
};
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

/// Lifecycle state of a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WalletState {
    /// Empty wallet: no identity, no daemon
    Uninitialized,
    /// Keys are known, nothing written or connected yet
    IdentityEstablished,
    /// Loaded from its wallet file
    Persisted,
    /// Daemon handshake in progress
    DaemonConnecting,
    /// Synchronizer running; the wallet is usable
    SynchronizerRunning,
}

/// Where a wallet lives and which daemon it talks to
#[derive(Clone, Copy)]
struct Target<'a> {
    filename: &'a Path,
    password: &'a str,
    daemon_host: &'a str,
    daemon_port: u16,
}

/// Path held for a wallet under construction, released unless kept
struct Reservation<'a> {
    path: &'a Path,
    kept: bool,
}

impl<'a> Reservation<'a> {
    fn new(path: &'a Path) -> Result<Self> {
        reserve_new_wallet_file(path)?;
        Ok(Self { path, kept: false })
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.kept {
            release_wallet_reservation(self.path);
        }
    }
}

struct LoadedWallet {
    identity: WalletIdentity,
    sub_wallets: Arc<RwLock<SubWallets>>,
}

/// A wallet bound to its file and daemon
pub struct WalletBackend {
    state: WalletState,
    filename: PathBuf,
    password: Zeroizing<String>,
    network: Network,
    wallet: Option<LoadedWallet>,
    daemon: Option<Arc<dyn Daemon>>,
    orchestrator: Option<InitOrchestrator>,
    synchronizer: Option<WalletSynchronizer>,
    restored_sync: Option<SynchronizerState>,
    events: EventHandler,
    // Declared last so the runtime outlives the synchronizer task handles
    _runtime: Option<Arc<Runtime>>,
}

impl WalletBackend {
    /// Create a brand new wallet with fresh keys
    ///
    /// Scanning starts from the creation time.
    pub fn create(
        filename: impl AsRef<Path>,
        password: &str,
        daemon_host: &str,
        daemon_port: u16,
        services: &WalletServices,
    ) -> Result<Self> {
        let target = Target {
            filename: filename.as_ref(),
            password,
            daemon_host,
            daemon_port,
        };
        let reservation = Reservation::new(target.filename)?;

        let identity = WalletIdentity::create(services.network());
        Self::finish_new(target, reservation, identity, 0, true, services)
    }

    /// Restore a wallet from its mnemonic seed, scanning from `scan_height`
    pub fn import_from_seed(
        mnemonic: &str,
        filename: impl AsRef<Path>,
        password: &str,
        scan_height: u64,
        daemon_host: &str,
        daemon_port: u16,
        services: &WalletServices,
    ) -> Result<Self> {
        let target = Target {
            filename: filename.as_ref(),
            password,
            daemon_host,
            daemon_port,
        };
        let reservation = Reservation::new(target.filename)?;

        let identity =
            WalletIdentity::from_seed(mnemonic, services.mnemonic_decoder(), services.network())?;
        Self::finish_new(target, reservation, identity, scan_height, false, services)
    }

    /// Restore a wallet from its private spend and view keys
    #[allow(clippy::too_many_arguments)]
    pub fn import_from_keys(
        private_spend_key: SecretKey,
        private_view_key: SecretKey,
        filename: impl AsRef<Path>,
        password: &str,
        scan_height: u64,
        daemon_host: &str,
        daemon_port: u16,
        services: &WalletServices,
    ) -> Result<Self> {
        let target = Target {
            filename: filename.as_ref(),
            password,
            daemon_host,
            daemon_port,
        };
        let reservation = Reservation::new(target.filename)?;

        let identity =
            WalletIdentity::from_keys(private_spend_key, private_view_key, services.network());
        Self::finish_new(target, reservation, identity, scan_height, false, services)
    }

    /// Create a view-only wallet from a private view key and its address
    ///
    /// The address is not checked against the view key.
    #[allow(clippy::too_many_arguments)]
    pub fn import_view_wallet(
        private_view_key: SecretKey,
        address: &str,
        filename: impl AsRef<Path>,
        password: &str,
        scan_height: u64,
        daemon_host: &str,
        daemon_port: u16,
        services: &WalletServices,
    ) -> Result<Self> {
        let target = Target {
            filename: filename.as_ref(),
            password,
            daemon_host,
            daemon_port,
        };
        let reservation = Reservation::new(target.filename)?;

        let identity = WalletIdentity::from_view_key(private_view_key, address, services.network());
        Self::finish_new(target, reservation, identity, scan_height, false, services)
    }

    /// Open an existing wallet file
    pub fn open(
        filename: impl AsRef<Path>,
        password: &str,
        daemon_host: &str,
        daemon_port: u16,
        services: &WalletServices,
    ) -> Result<Self> {
        let target = Target {
            filename: filename.as_ref(),
            password,
            daemon_host,
            daemon_port,
        };

        let image = read_wallet_file(target.filename)?;
        let payload = decrypt(&image, password)?;
        let document = PartialWalletDocument::from_bytes(&payload)?;
        let restored = document.into_parts(services.network())?;

        let mut wallet = Self::attach(target, restored, services)?;
        info!(
            wallet = %wallet.filename.display(),
            view_wallet = wallet.is_view_wallet(),
            "Opened wallet"
        );

        if let Err(e) = wallet.init() {
            wallet.discard();
            return Err(e);
        }
        Ok(wallet)
    }

    /// Bind a loaded document to its file, daemon and runtime
    fn attach(target: Target<'_>, restored: RestoredWallet, services: &WalletServices) -> Result<Self> {
        let RestoredWallet {
            identity,
            sub_wallets,
            synchronizer,
        } = restored;

        let mut wallet = Self::assemble(target, identity, sub_wallets, services)?;
        wallet.restored_sync = synchronizer;
        wallet.state = WalletState::Persisted;
        Ok(wallet)
    }

    fn finish_new(
        target: Target<'_>,
        reservation: Reservation<'_>,
        identity: WalletIdentity,
        scan_height: u64,
        new_wallet: bool,
        services: &WalletServices,
    ) -> Result<Self> {
        let sub_wallets = SubWallets::new(&identity, scan_height, new_wallet);
        let mut wallet = Self::assemble(target, identity, sub_wallets, services)?;

        let result = wallet
            .init()
            .and_then(|()| wallet.write_image(write_new_wallet_file));
        if let Err(e) = result {
            wallet.discard();
            return Err(e);
        }
        reservation.keep();

        info!(
            wallet = %wallet.filename.display(),
            view_wallet = wallet.is_view_wallet(),
            scan_height,
            "Created wallet"
        );
        Ok(wallet)
    }

    fn assemble(
        target: Target<'_>,
        identity: WalletIdentity,
        sub_wallets: SubWallets,
        services: &WalletServices,
    ) -> Result<Self> {
        let daemon = services
            .daemon_factory()
            .create(target.daemon_host, target.daemon_port)
            .map_err(|e| {
                error!(
                    "Failed to create daemon handle for {}:{}: {}",
                    target.daemon_host, target.daemon_port, e
                );
                WalletError::from(e)
            })?;

        Ok(Self {
            state: WalletState::IdentityEstablished,
            filename: target.filename.to_path_buf(),
            password: Zeroizing::new(target.password.to_string()),
            network: services.network().clone(),
            wallet: Some(LoadedWallet {
                identity,
                sub_wallets: Arc::new(RwLock::new(sub_wallets)),
            }),
            daemon: Some(daemon),
            orchestrator: Some(services.orchestrator()),
            synchronizer: None,
            restored_sync: None,
            events: EventHandler::new(services.event_capacity()),
            _runtime: Some(Arc::clone(services.runtime())),
        })
    }

    /// Empty wallet with no identity and no daemon
    pub fn empty() -> Self {
        Self {
            state: WalletState::Uninitialized,
            filename: PathBuf::new(),
            password: Zeroizing::new(String::new()),
            network: Network::mainnet(),
            wallet: None,
            daemon: None,
            orchestrator: None,
            synchronizer: None,
            restored_sync: None,
            events: EventHandler::new(1),
            _runtime: None,
        }
    }

    /// Move the wallet out, leaving an empty one in its place
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Connect to the daemon and start synchronizing
    ///
    /// A running synchronizer is stopped first and its progress carried over.
    /// On failure the wallet keeps its previous state and no synchronizer runs.
    ///
    /// # Panics
    /// On an empty wallet, which has no daemon to connect to.
    pub fn init(&mut self) -> Result<()> {
        let (orchestrator, wallet) = match (&self.orchestrator, &self.wallet) {
            (Some(orchestrator), Some(wallet)) => (orchestrator, wallet),
            _ => panic!("wallet init called without a daemon"),
        };

        if let Some(mut running) = self.synchronizer.take() {
            running.stop();
            self.restored_sync = Some(running.state());
        }

        let previous = self.state;
        self.state = WalletState::DaemonConnecting;

        let result = orchestrator.init(
            self.daemon.as_ref(),
            Arc::new(self.events.clone()),
            &wallet.sub_wallets,
            self.restored_sync,
        );

        match result {
            Ok(synchronizer) => {
                self.synchronizer = Some(synchronizer);
                self.restored_sync = None;
                self.state = WalletState::SynchronizerRunning;
                Ok(())
            }
            Err(e) => {
                self.state = previous.min(WalletState::Persisted);
                Err(e)
            }
        }
    }

    /// Encrypt the wallet and atomically replace its file
    ///
    /// Callers must not save the same wallet from two threads at once.
    pub fn save(&self) -> Result<()> {
        self.write_image(write_wallet_file)
    }

    fn write_image(&self, write: fn(&Path, &[u8]) -> Result<()>) -> Result<()> {
        let wallet = self.wallet.as_ref().ok_or_else(|| {
            debug!("Refusing to save an empty wallet");
            WalletError::InvalidWalletFilename
        })?;

        let sync_state = self.sync_state_to_persist(wallet);
        let payload = {
            let sub_wallets = wallet.sub_wallets.read();
            WalletDocument::new(&wallet.identity, &sub_wallets, sync_state).to_bytes()?
        };

        let image = encrypt(&payload, &self.password);
        write(&self.filename, &image)?;

        debug!(
            wallet = %self.filename.display(),
            scanned_height = sync_state.scanned_height,
            "Saved wallet"
        );
        Ok(())
    }

    fn sync_state_to_persist(&self, wallet: &LoadedWallet) -> SynchronizerState {
        if let Some(synchronizer) = &self.synchronizer {
            return synchronizer.state();
        }
        if let Some(restored) = self.restored_sync {
            return restored;
        }
        let (height, timestamp) = wallet.sub_wallets.read().min_initial_sync_start();
        SynchronizerState::starting_at(height, timestamp)
    }

    /// Stop everything without saving
    fn discard(&mut self) {
        if let Some(mut synchronizer) = self.synchronizer.take() {
            synchronizer.stop();
        }
        self.state = WalletState::Uninitialized;
    }

    /// Unlocked balance of one of this wallet's addresses
    ///
    /// # Errors
    /// - `AddressWrongLength`, `AddressNotValid`, `AddressWrongPrefix`: the
    ///   address does not parse for this wallet's network
    /// - `AddressNotInWallet`: the address is valid but not ours
    pub fn get_balance(&self, address: &str) -> Result<u64> {
        let parsed = parse_address(&self.network, address)?;

        let wallet = self.wallet.as_ref().ok_or(WalletError::AddressNotInWallet)?;
        let sub_wallets = wallet.sub_wallets.read();
        if !sub_wallets.owns_public_spend_key(&parsed.public_spend_key) {
            return Err(WalletError::AddressNotInWallet);
        }

        Ok(sub_wallets.get_balance(&[parsed.public_spend_key], false))
    }

    /// Unlocked balance across every address of the wallet
    pub fn get_total_balance(&self) -> u64 {
        self.wallet
            .as_ref()
            .map_or(0, |wallet| wallet.sub_wallets.read().get_balance(&[], true))
    }

    /// Current lifecycle state
    pub fn state(&self) -> WalletState {
        self.state
    }

    /// Keys and primary address; `None` for an empty wallet
    pub fn identity(&self) -> Option<&WalletIdentity> {
        self.wallet.as_ref().map(|wallet| &wallet.identity)
    }

    /// Primary address; `None` for an empty wallet
    pub fn primary_address(&self) -> Option<&str> {
        self.identity().map(WalletIdentity::address)
    }

    /// Whether the wallet can only view incoming funds
    pub fn is_view_wallet(&self) -> bool {
        self.identity().is_some_and(WalletIdentity::is_view_wallet)
    }

    /// Private view key
    pub fn private_view_key(&self) -> Option<&SecretKey> {
        self.identity().map(WalletIdentity::private_view_key)
    }

    /// Private spend key; the null key for view wallets
    pub fn private_spend_key(&self) -> Option<&SecretKey> {
        self.identity().map(WalletIdentity::private_spend_key)
    }

    /// Wallet file path
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Subwallet container shared with the synchronizer
    pub fn sub_wallets(&self) -> Option<&Arc<RwLock<SubWallets>>> {
        self.wallet.as_ref().map(|wallet| &wallet.sub_wallets)
    }

    /// Running synchronizer, once init has succeeded
    pub fn synchronizer(&self) -> Option<&WalletSynchronizer> {
        self.synchronizer.as_ref()
    }

    /// Scan and network heights, once init has succeeded
    pub fn sync_status(&self) -> Option<SyncStatus> {
        self.synchronizer.as_ref().map(WalletSynchronizer::status)
    }

    /// Subscribe to synchronizer events
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }
}

impl Default for WalletBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for WalletBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletBackend")
            .field("state", &self.state)
            .field("filename", &self.filename)
            .field("address", &self.primary_address())
            .field("view_wallet", &self.is_view_wallet())
            .finish_non_exhaustive()
    }
}

impl Drop for WalletBackend {
    fn drop(&mut self) {
        // Nothing to save for discarded or empty wallets
        if self.state < WalletState::Persisted || self.wallet.is_none() || self.daemon.is_none() {
            return;
        }

        if let Some(synchronizer) = self.synchronizer.as_mut() {
            synchronizer.stop();
        }

        match self.save() {
            Ok(()) => info!(wallet = %self.filename.display(), "Saved wallet on shutdown"),
            Err(e) => warn!(
                "Failed to save wallet {} on shutdown: {}",
                self.filename.display(),
                e
            ),
        }
    }
}
