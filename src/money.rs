//! Money Module
//!
//! Fixed-point monetary amounts with exactly two fractional digits.
//! All amounts that enter the system MUST go through this module.
//!
//! ## Design Principles
//! 1. Single representation: `Amount` wraps a `rust_decimal::Decimal` rescaled to 2 digits
//! 2. Explicit Error Handling: No silent truncation or rounding
//! 3. Storage bound: values fit a `NUMERIC(15,2)` column
//!
//! ## Usage
//! ```rust
//! use wallet_ledger::money::Amount;
//!
//! let amount = Amount::parse("30.5").unwrap();
//! assert_eq!(amount.to_string(), "30.50");
//! assert_eq!(amount.cents(), 3050);
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits carried by every amount
pub const MONEY_SCALE: u32 = 2;

/// Largest representable value in cents (`NUMERIC(15,2)` upper bound)
pub const MAX_CENTS: i64 = 999_999_999_999_999;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Amount
// ============================================================================

/// Fixed-point decimal with two fractional digits.
///
/// Can hold zero and negative values so that the coordinators, not the
/// parser, decide what a non-positive request means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));

    /// Build from an integer number of cents
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Build from a Decimal, rejecting anything finer than a cent
    ///
    /// Trailing zeros are ignored: `1.500` is accepted as `1.50`.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let normalized = value.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyError::PrecisionOverflow {
                provided: normalized.scale(),
                max: MONEY_SCALE,
            });
        }

        let mut scaled = normalized;
        scaled.rescale(MONEY_SCALE);
        if scaled.abs() > Decimal::new(MAX_CENTS, MONEY_SCALE) {
            return Err(MoneyError::Overflow);
        }
        Ok(Self(scaled))
    }

    /// Parse a client-supplied amount string
    ///
    /// Strict format, mirroring what the gateway accepts:
    /// - Rejects `.5` (must be `0.5`) and `5.` (must be `5` or `5.0`)
    /// - Rejects signs, scientific notation, separators and whitespace inside
    /// - Rejects more than two fractional digits (no silent truncation)
    /// - Rejects zero (amounts entering the system are always positive)
    pub fn parse(amount_str: &str) -> Result<Self, MoneyError> {
        let amount_str = amount_str.trim();
        if amount_str.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }

        if amount_str.starts_with('-') {
            return Err(MoneyError::InvalidAmount);
        }
        if amount_str.starts_with('+') {
            return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
        }

        let parts: Vec<&str> = amount_str.split('.').collect();
        let (whole, frac) = match parts.len() {
            1 => (parts[0], ""),
            2 => {
                if parts[0].is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                    ));
                }
                if parts[1].is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                    ));
                }
                (parts[0], parts[1])
            }
            _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
        };

        if !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(format!(
                "invalid character in whole part: {}",
                whole
            )));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyError::InvalidFormat(format!(
                "invalid character in fractional part: {}",
                frac
            )));
        }

        let significant_frac = frac.trim_end_matches('0');
        if significant_frac.len() > MONEY_SCALE as usize {
            return Err(MoneyError::PrecisionOverflow {
                provided: significant_frac.len() as u32,
                max: MONEY_SCALE,
            });
        }

        let whole_num: i64 = whole.parse().map_err(|_| MoneyError::Overflow)?;
        let frac_padded = format!("{:0<width$}", significant_frac, width = MONEY_SCALE as usize);
        let frac_num: i64 = frac_padded
            .parse()
            .map_err(|_| MoneyError::InvalidFormat("invalid fractional part".into()))?;

        let cents = whole_num
            .checked_mul(10i64.pow(MONEY_SCALE))
            .and_then(|v| v.checked_add(frac_num))
            .filter(|v| *v <= MAX_CENTS)
            .ok_or(MoneyError::Overflow)?;

        if cents == 0 {
            return Err(MoneyError::InvalidAmount);
        }

        Ok(Self::from_cents(cents))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Value in cents
    pub fn cents(&self) -> i64 {
        // Invariant: scale is always MONEY_SCALE and |value| <= MAX_CENTS
        self.0.mantissa() as i64
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Add, returning `None` past the storage bound
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.cents()
            .checked_add(other.cents())
            .filter(|c| c.abs() <= MAX_CENTS)
            .map(Amount::from_cents)
    }

    /// Subtract, returning `None` past the storage bound
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.cents()
            .checked_sub(other.cents())
            .filter(|c| c.abs() <= MAX_CENTS)
            .map(Amount::from_cents)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.prec$}", self.0, prec = MONEY_SCALE as usize)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::from_decimal(value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as string to preserve precision
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Only accept JSON strings; numbers would bypass format validation
        let s = String::deserialize(deserializer)?;
        let d = Decimal::from_str(s.trim())
            .map_err(|e| D::Error::custom(format!("Invalid decimal: {}", e)))?;
        Amount::from_decimal(d).map_err(D::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
