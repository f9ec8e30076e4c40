//! Whole-unit price representation.
//!
//! The store sells in Pakistani rupees and never uses fractional amounts, so
//! prices are plain unsigned integers. Serialization is transparent: a price
//! is written as a bare JSON number, matching the stored cart snapshot.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A non-negative amount in whole PKR.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Create a price from a whole-unit amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The whole-unit amount.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price of `qty` units at this unit price.
    #[must_use]
    pub fn times(self, qty: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(qty)))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Format for display, e.g. `PKR 2,599`.
    #[must_use]
    pub fn display(self) -> String {
        format!("{} {}", CurrencyCode::PKR.code(), group_thousands(self.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

/// ISO 4217 currency codes the store prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    PKR,
}

impl CurrencyCode {
    /// The three-letter code shown before amounts.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PKR => "PKR",
        }
    }
}

/// Group digits in threes with `,` (`1234567` -> `1,234,567`).
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(100_000), "100,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(2599).display(), "PKR 2,599");
        assert_eq!(Price::ZERO.to_string(), "PKR 0");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::new(500).times(2), Price::new(1200).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::new(2200));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&Price::new(1500)).ok().as_deref(),
            Some("1500")
        );
    }
}
