// ============================================================================
// Marketplace Module - NFT Marketplace Ledger
// ============================================================================
//
// Owns every minted item, the fixed listing fee and the operator's revenue.
//
// Flow:
//   mint: minter pays exactly the listing fee to the operator -> new Item
//   buy:  buyer pays exactly the item price to the current owner -> ownership
//         moves to the buyer and the item is closed for sale
//
// Money never moves here. Both entry points validate everything first, then
// ask the `BalanceLedger` for a single atomic transfer, then update items.
// A failure at any step leaves the marketplace untouched.
//
// ============================================================================

pub mod items;

pub use items::*;

use crate::ledger::{BalanceLedger, LedgerError};
use crate::units::{format_ether, Address, Amount, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Id handed to the first minted item
pub const FIRST_ITEM_ID: ItemId = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// `fee_paid` differs from the listing fee
    InsufficientFee { required: Amount, paid: Amount },
    /// Mint price must be greater than zero
    InvalidPrice,
    ItemNotFound(ItemId),
    AlreadySold(ItemId),
    /// `amount_paid` differs from the item price
    WrongAmount { expected: Amount, paid: Amount },
    /// Caller already owns the item
    SelfPurchase(ItemId),
    Overflow(String),
    Ledger(LedgerError),
}

impl std::fmt::Display for MarketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketError::InsufficientFee { required, paid } => write!(
                f,
                "Listing fee must be exactly {} wei, got {} wei",
                required, paid
            ),
            MarketError::InvalidPrice => write!(f, "Price must be greater than zero"),
            MarketError::ItemNotFound(id) => write!(f, "Item not found: {}", id),
            MarketError::AlreadySold(id) => write!(f, "Item already sold: {}", id),
            MarketError::WrongAmount { expected, paid } => write!(
                f,
                "Payment must equal the item price: expected {} wei, got {} wei",
                expected, paid
            ),
            MarketError::SelfPurchase(id) => write!(f, "Owner cannot buy own item: {}", id),
            MarketError::Overflow(what) => write!(f, "Counter overflow: {}", what),
            MarketError::Ledger(e) => write!(f, "Ledger rejected transfer: {}", e),
        }
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MarketError::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LedgerError> for MarketError {
    fn from(e: LedgerError) -> Self {
        MarketError::Ledger(e)
    }
}

// ============================================================================
// MARKETPLACE
// ============================================================================

/// The marketplace's item registry and fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace {
    /// Charged on every mint, fixed at creation
    #[serde(with = "crate::units::wei_string")]
    listing_fee: Amount,
    /// Receives listing fees
    operator: Address,
    items: BTreeMap<ItemId, Item>,
    next_id: ItemId,
    #[serde(with = "crate::units::wei_string")]
    fee_revenue: Amount,
    #[serde(with = "crate::units::wei_string")]
    sales_volume: Amount,
    events: Vec<MarketEvent>,
}

impl Marketplace {
    pub fn new(listing_fee: Amount, operator: &str) -> Self {
        info!(
            "🏪 Marketplace opened (operator: {}, listing fee: {} ETH)",
            operator,
            format_ether(listing_fee)
        );
        Self {
            listing_fee,
            operator: operator.to_string(),
            items: BTreeMap::new(),
            next_id: FIRST_ITEM_ID,
            fee_revenue: 0,
            sales_volume: 0,
            events: Vec::new(),
        }
    }

    /// Mint a new item owned by `caller`.
    ///
    /// `fee_paid` must equal the listing fee exactly and is transferred from
    /// the caller to the operator.
    pub fn mint<L: BalanceLedger>(
        &mut self,
        ledger: &mut L,
        caller: &str,
        token_uri: &str,
        price: Amount,
        fee_paid: Amount,
    ) -> Result<ItemId, MarketError> {
        if fee_paid != self.listing_fee {
            warn!("⛔ Mint rejected for {}: fee {} != {}", caller, fee_paid, self.listing_fee);
            return Err(MarketError::InsufficientFee {
                required: self.listing_fee,
                paid: fee_paid,
            });
        }
        if price == 0 {
            warn!("⛔ Mint rejected for {}: zero price", caller);
            return Err(MarketError::InvalidPrice);
        }

        let id = self.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| MarketError::Overflow("item id".to_string()))?;
        let fee_revenue = self
            .fee_revenue
            .checked_add(fee_paid)
            .ok_or_else(|| MarketError::Overflow("fee revenue".to_string()))?;

        if fee_paid > 0 {
            ledger.transfer(caller, &self.operator, fee_paid)?;
        } else if ledger.balance(caller).is_none() {
            return Err(LedgerError::AccountNotFound(caller.to_string()).into());
        }

        self.items.insert(id, Item::new(id, token_uri, caller, price));
        self.next_id = next_id;
        self.fee_revenue = fee_revenue;
        self.events.push(MarketEvent::Minted {
            id,
            owner: caller.to_string(),
            price,
            token_uri: token_uri.to_string(),
            fee: fee_paid,
        });

        info!("🎨 Minted item {} for {} at {} ETH", id, caller, format_ether(price));
        Ok(id)
    }

    /// Buy an unsold item at exactly its price.
    ///
    /// Checks run in order: existence, sold flag, amount, ownership. The
    /// payment goes straight to the current owner; no resale fee is taken.
    pub fn buy<L: BalanceLedger>(
        &mut self,
        ledger: &mut L,
        caller: &str,
        id: ItemId,
        amount_paid: Amount,
    ) -> Result<(), MarketError> {
        let item = self.items.get(&id).ok_or(MarketError::ItemNotFound(id))?;

        if item.sold {
            warn!("⛔ Buy rejected for {}: item {} already sold", caller, id);
            return Err(MarketError::AlreadySold(id));
        }
        if amount_paid != item.price {
            warn!(
                "⛔ Buy rejected for {}: paid {} for item {} priced {}",
                caller, amount_paid, id, item.price
            );
            return Err(MarketError::WrongAmount {
                expected: item.price,
                paid: amount_paid,
            });
        }
        if item.owner == caller {
            return Err(MarketError::SelfPurchase(id));
        }

        let sales_volume = self
            .sales_volume
            .checked_add(amount_paid)
            .ok_or_else(|| MarketError::Overflow("sales volume".to_string()))?;
        let seller = item.owner.clone();

        ledger.transfer(caller, &seller, amount_paid)?;

        // Transfer succeeded, nothing below can fail
        if let Some(item) = self.items.get_mut(&id) {
            item.mark_sold(caller);
        }
        self.sales_volume = sales_volume;
        self.events.push(MarketEvent::Sold {
            id,
            seller: seller.clone(),
            buyer: caller.to_string(),
            price: amount_paid,
        });

        info!("🤝 Item {} sold: {} -> {} for {} ETH", id, seller, caller, format_ether(amount_paid));
        Ok(())
    }

    // ========================================================================
    // READ ACCESSORS
    // ========================================================================

    pub fn listing_fee(&self) -> Amount {
        self.listing_fee
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn owner_of(&self, id: ItemId) -> Result<&str, MarketError> {
        self.items
            .get(&id)
            .map(|item| item.owner.as_str())
            .ok_or(MarketError::ItemNotFound(id))
    }

    pub fn token_uri(&self, id: ItemId) -> Result<&str, MarketError> {
        self.items
            .get(&id)
            .map(|item| item.token_uri.as_str())
            .ok_or(MarketError::ItemNotFound(id))
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// All items in id order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items still open for purchase
    pub fn unsold_items(&self) -> impl Iterator<Item = &Item> {
        self.items.values().filter(|item| !item.sold)
    }

    pub fn items_owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.values().filter(move |item| item.owner == owner)
    }

    /// Number of items held by an account
    pub fn balance_of(&self, owner: &str) -> usize {
        self.items_owned_by(owner).count()
    }

    pub fn total_minted(&self) -> usize {
        self.items.len()
    }

    pub fn fee_revenue(&self) -> Amount {
        self.fee_revenue
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn stats(&self) -> MarketStats {
        let sold = self.items.values().filter(|item| item.sold).count();
        MarketStats {
            minted: self.items.len(),
            sold,
            unsold: self.items.len() - sold,
            listing_fee: self.listing_fee,
            fee_revenue: self.fee_revenue,
            sales_volume: self.sales_volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    pub minted: usize,
    pub sold: usize,
    pub unsold: usize,
    #[serde(with = "crate::units::wei_string")]
    pub listing_fee: Amount,
    #[serde(with = "crate::units::wei_string")]
    pub fee_revenue: Amount,
    #[serde(with = "crate::units::wei_string")]
    pub sales_volume: Amount,
}

// ============================================================================
// TESTS
// ============================================================================
