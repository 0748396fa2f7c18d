// ============================================================================
// Items & Events - NFT Marketplace
// ============================================================================
//
// An Item is the marketplace's record of a minted token. It is created by
// `mint`, flips from unsold to sold exactly once via `buy`, and is never
// removed.
//
// ============================================================================

use crate::units::{format_ether, Address, Amount, ItemId};
use serde::{Deserialize, Serialize};

// ============================================================================
// ITEM
// ============================================================================

/// A minted, tradable token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub token_uri: String,
    /// Current holder
    pub owner: Address,
    /// Account that minted the item
    pub seller: Address,
    /// Asking price in wei
    #[serde(with = "crate::units::wei_string")]
    pub price: Amount,
    pub sold: bool,
    pub minted_at: i64,
    #[serde(default)]
    pub sold_at: Option<i64>,
}

impl Item {
    pub fn new(id: ItemId, token_uri: &str, owner: &str, price: Amount) -> Self {
        Self {
            id,
            token_uri: token_uri.to_string(),
            owner: owner.to_string(),
            seller: owner.to_string(),
            price,
            sold: false,
            minted_at: chrono::Utc::now().timestamp(),
            sold_at: None,
        }
    }

    /// Hand the item to a new owner and close it for sale
    pub(crate) fn mark_sold(&mut self, buyer: &str) {
        self.owner = buyer.to_string();
        self.sold = true;
        self.sold_at = Some(chrono::Utc::now().timestamp());
    }

    pub fn price_ether(&self) -> String {
        format_ether(self.price)
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Append-only record of marketplace state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    Minted {
        id: ItemId,
        owner: Address,
        #[serde(with = "crate::units::wei_string")]
        price: Amount,
        token_uri: String,
        #[serde(with = "crate::units::wei_string")]
        fee: Amount,
    },
    Sold {
        id: ItemId,
        seller: Address,
        buyer: Address,
        #[serde(with = "crate::units::wei_string")]
        price: Amount,
    },
}

impl MarketEvent {
    pub fn item_id(&self) -> ItemId {
        match self {
            MarketEvent::Minted { id, .. } | MarketEvent::Sold { id, .. } => *id,
        }
    }
}
