// Application state management

use crate::config::MarketConfig;
use crate::ledger::{BalanceLedger, Ledger, LedgerError};
use crate::marketplace::Marketplace;
use crate::units::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub type SharedState = Arc<Mutex<AppState>>;

#[derive(Debug)]
pub enum StateError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Io(e) => write!(f, "State file I/O failed: {}", e),
            StateError::Json(e) => write!(f, "State file is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for StateError {}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        StateError::Io(e)
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Json(e)
    }
}

/// On-disk snapshot
#[derive(Serialize, Deserialize)]
struct PersistedState {
    marketplace: Marketplace,
    ledger: Ledger,
}

pub struct AppState {
    pub config: MarketConfig,
    pub marketplace: Marketplace,
    pub ledger: Ledger,
}

impl AppState {
    /// Fresh state with only the operator account
    pub fn new(config: MarketConfig) -> Self {
        let mut ledger = Ledger::new();
        if let Err(e) = ledger.register(&config.operator, 0) {
            warn!("⚠️  Operator account not created: {}", e);
        }
        let marketplace = Marketplace::new(config.listing_fee, &config.operator);

        Self { config, marketplace, ledger }
    }

    /// Restore from `config.state_path` if a snapshot exists, otherwise start fresh
    pub fn load_or_new(config: MarketConfig) -> Self {
        match Self::load_from_disk(&config.state_path) {
            Ok((marketplace, ledger)) => {
                if marketplace.listing_fee() != config.listing_fee {
                    warn!(
                        "⚠️  Snapshot listing fee {} wei overrides configured {} wei",
                        marketplace.listing_fee(),
                        config.listing_fee
                    );
                }
                info!("✅ Loaded persisted state ({} items)", marketplace.total_minted());
                Self { config, marketplace, ledger }
            }
            Err(StateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("ℹ️  No persisted state found, starting fresh");
                Self::new(config)
            }
            Err(e) => {
                warn!("⚠️  Ignoring unreadable state file: {}", e);
                Self::new(config)
            }
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Create an account funded with the configured dev balance
    pub fn open_account(&mut self, address: &str) -> Result<Amount, LedgerError> {
        let funding = self.config.dev_funding;
        self.ledger.register(address, funding)?;
        Ok(self.ledger.balance(address).unwrap_or(funding))
    }

    pub fn save_to_disk(&self) -> Result<(), StateError> {
        let path = &self.config.state_path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let snapshot = PersistedState {
            marketplace: self.marketplace.clone(),
            ledger: self.ledger.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;

        info!("💾 State saved to {}", path.display());
        Ok(())
    }

    fn load_from_disk(path: &Path) -> Result<(Marketplace, Ledger), StateError> {
        let json = std::fs::read_to_string(path)?;
        let state: PersistedState = serde_json::from_str(&json)?;
        Ok((state.marketplace, state.ledger))
    }
}
