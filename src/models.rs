// Request and response bodies for the marketplace HTTP API

use crate::ledger::LedgerStats;
use crate::marketplace::MarketStats;
use crate::units::{format_ether, Address, Amount, ItemId};
use serde::{Deserialize, Serialize};

// ===== REQUESTS =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccountRequest {
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintRequest {
    pub caller: Address,
    pub token_uri: String,
    /// Asking price, wei string or "<n> ether"
    #[serde(with = "crate::units::wei_string")]
    pub price: Amount,
    /// Must equal the listing fee
    #[serde(with = "crate::units::wei_string")]
    pub fee_paid: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyRequest {
    pub caller: Address,
    #[serde(with = "crate::units::wei_string")]
    pub amount_paid: Amount,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsQuery {
    /// Only items still for sale
    #[serde(default)]
    pub unsold: bool,
    pub owner: Option<Address>,
}

// ===== RESPONSES =====

/// An amount rendered both ways
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountView {
    #[serde(with = "crate::units::wei_string")]
    pub wei: Amount,
    pub ether: String,
}

impl From<Amount> for AmountView {
    fn from(wei: Amount) -> Self {
        Self { wei, ether: format_ether(wei) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: AmountView,
    /// Items currently held
    pub items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintResponse {
    pub success: bool,
    pub item_id: ItemId,
    pub owner: Address,
    pub token_uri: String,
    pub new_balance: AmountView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyResponse {
    pub success: bool,
    pub item_id: ItemId,
    pub seller: Address,
    pub owner: Address,
    pub price: AmountView,
    pub new_balance: AmountView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerResponse {
    pub item_id: ItemId,
    pub owner: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub market: MarketStats,
    pub ledger: LedgerStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
