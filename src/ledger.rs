/// Balance Ledger for the NFT Marketplace
///
/// The account/balance store the marketplace settles against. The marketplace
/// never touches balances directly; it asks this ledger, through the
/// `BalanceLedger` trait, to move value between accounts.
///
/// KEY FEATURES:
/// - Checked u128 wei arithmetic, no silent wrap-around
/// - Transfers validate both sides before mutating either
/// - Every movement is recorded as a hashed `Transaction`

use crate::units::{format_ether, Address, Amount};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

// ============================================================================
// COLLABORATOR TRAIT
// ============================================================================

/// Atomic debit/credit primitives keyed by account address
pub trait BalanceLedger {
    /// Current balance, `None` if the account is unknown
    fn balance(&self, address: &str) -> Option<Amount>;

    /// Add `amount` to an account, returning the new balance
    fn credit(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError>;

    /// Remove `amount` from an account, returning the new balance
    fn debit(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError>;

    /// Move `amount` from one account to another. Either both sides change
    /// or neither does.
    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<Transaction, LedgerError>;
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    AccountNotFound(String),
    AccountExists(String),
    InsufficientBalance { address: String, available: Amount, required: Amount },
    InvalidAmount(String),
    Overflow(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::AccountNotFound(addr) => write!(f, "Account not found: {}", addr),
            LedgerError::AccountExists(addr) => write!(f, "Account already exists: {}", addr),
            LedgerError::InsufficientBalance { address, available, required } => write!(
                f,
                "Insufficient balance for {}: {} < {}",
                address, available, required
            ),
            LedgerError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            LedgerError::Overflow(addr) => write!(f, "Balance overflow for {}", addr),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Transaction types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxType {
    AccountCreated,
    Deposit,
    Withdraw,
    Transfer,
}

/// A single balance movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub tx_type: TxType,
    pub from: Option<Address>,
    pub to: Option<Address>,
    #[serde(with = "crate::units::wei_string")]
    pub amount: Amount,
    pub timestamp: i64,
    /// SHA-256 over the fields above
    pub hash: String,
}

impl Transaction {
    fn new(tx_type: TxType, from: Option<&str>, to: Option<&str>, amount: Amount) -> Self {
        let mut tx = Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx_type,
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            amount,
            timestamp: chrono::Utc::now().timestamp(),
            hash: String::new(),
        };
        tx.hash = tx.digest();
        tx
    }

    pub fn transfer(from: &str, to: &str, amount: Amount) -> Self {
        Self::new(TxType::Transfer, Some(from), Some(to), amount)
    }

    pub fn deposit(to: &str, amount: Amount) -> Self {
        Self::new(TxType::Deposit, None, Some(to), amount)
    }

    pub fn withdraw(from: &str, amount: Amount) -> Self {
        Self::new(TxType::Withdraw, Some(from), None, amount)
    }

    pub fn account_created(address: &str, initial: Amount) -> Self {
        Self::new(TxType::AccountCreated, None, Some(address), initial)
    }

    /// Recompute the content hash
    pub fn digest(&self) -> String {
        let data = format!(
            "{}:{:?}:{}:{}:{}:{}",
            self.id,
            self.tx_type,
            self.from.as_deref().unwrap_or(""),
            self.to.as_deref().unwrap_or(""),
            self.amount,
            self.timestamp
        );
        hash(&data)
    }

    /// Whether the stored hash still matches the contents
    pub fn verify(&self) -> bool {
        self.hash == self.digest()
    }

    pub fn involves(&self, address: &str) -> bool {
        self.from.as_deref() == Some(address) || self.to.as_deref() == Some(address)
    }
}

// ============================================================================
// LEDGER
// ============================================================================

/// In-memory account ledger
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Account balances (address -> wei)
    balances: HashMap<Address, Amount>,
    /// All transactions, oldest first
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with an initial balance
    pub fn register(&mut self, address: &str, initial: Amount) -> Result<Transaction, LedgerError> {
        if self.balances.contains_key(address) {
            return Err(LedgerError::AccountExists(address.to_string()));
        }
        self.balances.insert(address.to_string(), initial);

        let tx = Transaction::account_created(address, initial);
        self.transactions.push(tx.clone());

        info!("👤 Registered {} with {} ETH", address, format_ether(initial));
        Ok(tx)
    }

    /// Add funds to an existing account
    pub fn deposit(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("deposit of zero".to_string()));
        }
        let new_balance = self.credit(address, amount)?;
        self.transactions.push(Transaction::deposit(address, amount));
        info!("📥 Deposit: {} received {} ETH", address, format_ether(amount));
        Ok(new_balance)
    }

    /// Remove funds from an existing account
    pub fn withdraw(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("withdraw of zero".to_string()));
        }
        let new_balance = self.debit(address, amount)?;
        self.transactions.push(Transaction::withdraw(address, amount));
        info!("📤 Withdraw: {} took {} ETH", address, format_ether(amount));
        Ok(new_balance)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.balances.contains_key(address)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions touching an address
    pub fn transactions_for(&self, address: &str) -> Vec<&Transaction> {
        self.transactions.iter().filter(|tx| tx.involves(address)).collect()
    }

    /// Most recent transactions, newest first
    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(limit).collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let transfer_volume = self
            .transactions
            .iter()
            .filter(|tx| tx.tx_type == TxType::Transfer)
            .fold(0u128, |acc, tx| acc.saturating_add(tx.amount));

        LedgerStats {
            accounts: self.balances.len(),
            transactions: self.transactions.len(),
            transfer_volume,
            total_supply: self.balances.values().fold(0u128, |acc, b| acc.saturating_add(*b)),
        }
    }
}

impl BalanceLedger for Ledger {
    fn balance(&self, address: &str) -> Option<Amount> {
        self.balances.get(address).copied()
    }

    fn credit(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let bal = self
            .balances
            .get_mut(address)
            .ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))?;
        *bal = bal
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(address.to_string()))?;
        Ok(*bal)
    }

    fn debit(&mut self, address: &str, amount: Amount) -> Result<Amount, LedgerError> {
        let bal = self
            .balances
            .get_mut(address)
            .ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))?;
        let available = *bal;
        *bal = available.checked_sub(amount).ok_or_else(|| LedgerError::InsufficientBalance {
            address: address.to_string(),
            available,
            required: amount,
        })?;
        Ok(*bal)
    }

    fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<Transaction, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("transfer of zero".to_string()));
        }

        let from_bal = self
            .balance(from)
            .ok_or_else(|| LedgerError::AccountNotFound(from.to_string()))?;
        let to_bal = self
            .balance(to)
            .ok_or_else(|| LedgerError::AccountNotFound(to.to_string()))?;

        if from_bal < amount {
            return Err(LedgerError::InsufficientBalance {
                address: from.to_string(),
                available: from_bal,
                required: amount,
            });
        }
        if from != to && to_bal.checked_add(amount).is_none() {
            return Err(LedgerError::Overflow(to.to_string()));
        }

        // Both sides validated above, neither call can fail now
        self.debit(from, amount)?;
        self.credit(to, amount)?;

        let tx = Transaction::transfer(from, to, amount);
        self.transactions.push(tx.clone());

        debug!("💸 Transfer: {} -> {} ({} ETH)", from, to, format_ether(amount));
        Ok(tx)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStats {
    pub accounts: usize,
    pub transactions: usize,
    #[serde(with = "crate::units::wei_string")]
    pub transfer_volume: Amount,
    #[serde(with = "crate::units::wei_string")]
    pub total_supply: Amount,
}

// ============================================================================
// HELPERS
// ============================================================================

/// Compute SHA256 hash
pub fn hash(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::WEI_PER_ETHER;

    fn funded() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.register("ALICE", 10 * WEI_PER_ETHER).unwrap();
        ledger.register("BOB", 5 * WEI_PER_ETHER).unwrap();
        ledger
    }

    #[test]
    fn test_register_twice_fails() {
        let mut ledger = funded();
        assert!(matches!(
            ledger.register("ALICE", 1),
            Err(LedgerError::AccountExists(addr)) if addr == "ALICE"
        ));
        assert_eq!(ledger.balance("ALICE"), Some(10 * WEI_PER_ETHER));
    }

    #[test]
    fn test_transfer_moves_exact_amount() {
        let mut ledger = funded();
        let tx = ledger.transfer("ALICE", "BOB", WEI_PER_ETHER).unwrap();

        assert_eq!(ledger.balance("ALICE"), Some(9 * WEI_PER_ETHER));
        assert_eq!(ledger.balance("BOB"), Some(6 * WEI_PER_ETHER));
        assert_eq!(tx.tx_type, TxType::Transfer);
        assert!(tx.verify());
        assert_eq!(ledger.transactions_for("BOB").len(), 2);
    }

    #[test]
    fn test_transfer_insufficient_leaves_balances() {
        let mut ledger = funded();
        let before = ledger.transactions().len();

        let err = ledger.transfer("BOB", "ALICE", 6 * WEI_PER_ETHER).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(ledger.balance("ALICE"), Some(10 * WEI_PER_ETHER));
        assert_eq!(ledger.balance("BOB"), Some(5 * WEI_PER_ETHER));
        assert_eq!(ledger.transactions().len(), before);
    }

    #[test]
    fn test_transfer_unknown_recipient_leaves_sender() {
        let mut ledger = funded();
        let err = ledger.transfer("ALICE", "CAROL", 1).unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound("CAROL".into()));
        assert_eq!(ledger.balance("ALICE"), Some(10 * WEI_PER_ETHER));
    }

    #[test]
    fn test_credit_overflow() {
        let mut ledger = Ledger::new();
        ledger.register("WHALE", Amount::MAX).unwrap();
        ledger.register("ALICE", 1).unwrap();

        assert_eq!(ledger.credit("WHALE", 1), Err(LedgerError::Overflow("WHALE".into())));
        assert_eq!(
            ledger.transfer("ALICE", "WHALE", 1).unwrap_err(),
            LedgerError::Overflow("WHALE".into())
        );
        assert_eq!(ledger.balance("ALICE"), Some(1));
    }

    #[test]
    fn test_zero_amount_movements_rejected() {
        let mut ledger = funded();
        let before = ledger.transactions().len();

        assert!(matches!(ledger.deposit("ALICE", 0), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(ledger.withdraw("ALICE", 0), Err(LedgerError::InvalidAmount(_))));
        assert!(matches!(ledger.transfer("ALICE", "BOB", 0), Err(LedgerError::InvalidAmount(_))));

        assert_eq!(ledger.balance("ALICE"), Some(10 * WEI_PER_ETHER));
        assert_eq!(ledger.balance("BOB"), Some(5 * WEI_PER_ETHER));
        assert_eq!(ledger.transactions().len(), before);
    }

    #[test]
    fn test_deposit_withdraw_and_stats() {
        let mut ledger = funded();
        assert_eq!(ledger.deposit("BOB", WEI_PER_ETHER).unwrap(), 6 * WEI_PER_ETHER);
        assert_eq!(ledger.withdraw("BOB", 2 * WEI_PER_ETHER).unwrap(), 4 * WEI_PER_ETHER);
        ledger.transfer("ALICE", "BOB", 3).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.accounts, 2);
        assert_eq!(stats.transactions, 5);
        assert_eq!(stats.transfer_volume, 3);
        assert_eq!(stats.total_supply, 14 * WEI_PER_ETHER);
    }
}
