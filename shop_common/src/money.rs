use std::{fmt::Display, iter::Sum, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "gbp";

//--------------------------------------        Money        ---------------------------------------------------------
/// An amount of money in the minor unit of the store currency (e.g. pence).
///
/// Prices, totals and payment amounts are all carried as whole minor units, so `12.99` is `Money(1299)`. This is also
/// the unit the payment processor uses for intent amounts, which means a charged amount can be compared with an order
/// total without any rounding.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as money: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {value} is too large to convert to Money")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Parses a decimal amount in major units, e.g. "12.99", "50" or "0.5". At most two decimal places are accepted.
impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };
        let is_numeric = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if major.is_empty() || !is_numeric(major) || !is_numeric(minor) || minor.len() > 2 {
            return Err(MoneyConversionError(format!("'{s}' is not a valid amount")));
        }
        let major =
            major.parse::<i64>().map_err(|e| MoneyConversionError(format!("'{s}' is not a valid amount. {e}")))?;
        let minor = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().unwrap_or_default() * 10,
            _ => minor.parse::<i64>().unwrap_or_default(),
        };
        let value = major
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(|| MoneyConversionError(format!("'{s}' is too large")))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_minor(units: i64) -> Self {
        Self(units)
    }

    pub fn from_major(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `self × rhs`, or `None` if the result cannot be represented.
    pub fn checked_mul(&self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Adds up `amounts`, or returns `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::default(), |acc, m| acc.checked_add(m))
    }

    /// `percent`% of this amount, rounded half away from zero to the nearest minor unit. Percentages above 100 are
    /// treated as 100.
    pub fn percent(&self, percent: u32) -> Self {
        let scaled = i128::from(self.0) * i128::from(percent.min(100));
        let rounded = if scaled >= 0 { (scaled + 50) / 100 } else { (scaled - 50) / 100 };
        // |rounded| <= |self|, so this always fits
        Self(i64::try_from(rounded).unwrap_or(self.0))
    }
}
