use std::fmt;

use serde::{Deserialize, Serialize};

/// Monetary amount in whole rupiah.
///
/// Signed so that boundary layers can accept externally supplied values and
/// reject negatives with a typed error instead of failing at conversion.
/// Bookkeeping arithmetic is checked or clamped; arithmetic operator
/// overloads are deliberately not provided.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw rupiah value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw rupiah value.
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is below zero.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `true` if the amount is strictly above zero.
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction; `None` on overflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating addition, for report aggregation.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// `self - other`, clamped at zero.
    ///
    /// The remaining-debt primitive: an overpaid balance reads as zero,
    /// never negative.
    pub fn sub_or_zero(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0).max(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-Rp{grouped}")
        } else {
            write!(f, "Rp{grouped}")
        }
    }
}
