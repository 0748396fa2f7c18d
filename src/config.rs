// Service configuration, read from the environment (and `.env` via dotenv)

use crate::units::{format_ether, parse_ether, Address, Amount, UnitsError, WEI_PER_ETHER};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_LISTING_FEE: &str = "0.025";
pub const DEFAULT_OPERATOR: &str = "MARKETPLACE_OPERATOR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:1234";
pub const DEFAULT_STATE_PATH: &str = "data/marketplace.json";
pub const DEFAULT_DEV_FUNDING: &str = "10000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidAmount { key: &'static str, source: UnitsError },
    InvalidAddr { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidAmount { key, source } => write!(f, "{}: {}", key, source),
            ConfigError::InvalidAddr { key, value } => {
                write!(f, "{}: not a socket address: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    /// Listing fee in wei
    pub listing_fee: Amount,
    /// Account receiving listing fees
    pub operator: Address,
    pub bind_addr: SocketAddr,
    /// JSON snapshot location
    pub state_path: PathBuf,
    /// Balance given to accounts created through `POST /accounts`
    pub dev_funding: Amount,
}

impl MarketConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listing_fee = parse_ether(&get("LISTING_FEE", DEFAULT_LISTING_FEE))
            .map_err(|source| ConfigError::InvalidAmount { key: "LISTING_FEE", source })?;
        let dev_funding = parse_ether(&get("DEV_FUNDING", DEFAULT_DEV_FUNDING))
            .map_err(|source| ConfigError::InvalidAmount { key: "DEV_FUNDING", source })?;

        let bind = get("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr { key: "BIND_ADDR", value: bind.clone() })?;

        Ok(Self {
            listing_fee,
            operator: get("OPERATOR_ADDRESS", DEFAULT_OPERATOR),
            bind_addr,
            state_path: PathBuf::from(get("STATE_PATH", DEFAULT_STATE_PATH)),
            dev_funding,
        })
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "⚙️  listing fee {} ETH, operator {}, state {}",
            format_ether(self.listing_fee),
            self.operator,
            self.state_path.display()
        );
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            listing_fee: 25_000_000_000_000_000,
            operator: DEFAULT_OPERATOR.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 1234)),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            dev_funding: 10_000 * WEI_PER_ETHER,
        }
    }
}
