/// NFT Marketplace Ledger
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod ledger;
pub mod marketplace;
pub mod models;
pub mod routes;
pub mod units;

pub use app_state::{AppState, SharedState, StateError};
pub use config::{ConfigError, MarketConfig};
pub use ledger::{BalanceLedger, Ledger, LedgerError, LedgerStats, Transaction, TxType};
pub use marketplace::{Item, MarketError, MarketEvent, MarketStats, Marketplace, FIRST_ITEM_ID};
pub use units::{format_ether, parse_amount, parse_ether, Address, Amount, ItemId, WEI_PER_ETHER};
