// ============================================================================
// Units - NFT Marketplace Ledger
// ============================================================================
//
// Amounts are tracked in wei as u128 with checked arithmetic everywhere.
// Ether strings are only used at the edges (config, HTTP, logs).
//
//   1 ether = 1_000_000_000_000_000_000 wei
//
// ============================================================================

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Amount of value in wei
pub type Amount = u128;

/// Sequential item identifier, first minted item is 1
pub type ItemId = u64;

/// Account identifier on the balance ledger
pub type Address = String;

/// Number of decimals in one ether
pub const ETHER_DECIMALS: u32 = 18;

/// 10^18
pub const WEI_PER_ETHER: Amount = 1_000_000_000_000_000_000;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitsError {
    Malformed(String),
    Negative(String),
    TooPrecise(String),
    OutOfRange(String),
}

impl std::fmt::Display for UnitsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitsError::Malformed(s) => write!(f, "Malformed amount: {}", s),
            UnitsError::Negative(s) => write!(f, "Negative amount: {}", s),
            UnitsError::TooPrecise(s) => write!(f, "More than 18 decimals: {}", s),
            UnitsError::OutOfRange(s) => write!(f, "Amount out of range: {}", s),
        }
    }
}

impl std::error::Error for UnitsError {}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Parse a decimal ether string ("1", "0.025") into wei
pub fn parse_ether(input: &str) -> Result<Amount, UnitsError> {
    let trimmed = input.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|_| UnitsError::Malformed(trimmed.to_string()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(trimmed.to_string()));
    }
    if value.normalize().scale() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(trimmed.to_string()));
    }

    value
        .checked_mul(Decimal::from(WEI_PER_ETHER as u64))
        .and_then(|wei| wei.trunc().to_u128())
        .ok_or_else(|| UnitsError::OutOfRange(trimmed.to_string()))
}

/// Render wei as an ether string without trailing zeros
pub fn format_ether(wei: Amount) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:018}", frac);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse an amount as either plain wei ("1000") or ether ("1.5 ether", "2 eth")
pub fn parse_amount(input: &str) -> Result<Amount, UnitsError> {
    let trimmed = input.trim();
    let lowered = trimmed.to_ascii_lowercase();

    for suffix in [" ether", "ether", " eth", "eth"] {
        if let Some(value) = lowered.strip_suffix(suffix) {
            return parse_ether(value);
        }
    }

    let without_wei = lowered
        .strip_suffix("wei")
        .map(str::trim_end)
        .unwrap_or(&lowered);

    without_wei
        .parse::<Amount>()
        .map_err(|_| UnitsError::Malformed(trimmed.to_string()))
}

/// Serde adapter: wei amounts travel as decimal strings because u128 does
/// not survive JSON number handling in most clients.
pub mod wei_string {
    use super::{parse_amount, Amount};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => parse_amount(&s).map_err(de::Error::custom),
            Raw::Number(n) => Ok(n as Amount),
        }
    }
}
