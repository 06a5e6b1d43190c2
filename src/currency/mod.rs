//! Exact, non-negative money amounts counted in minor units (cents).

use std::{cmp::Ordering, fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::MoneyError;

/// Minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// Canonical text form: ASCII digits, a comma, exactly two digits.
static CANONICAL_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+,[0-9]{2}$").expect("canonical amount pattern"));

/// Immutable money value. Equality, hashing and ordering compare the cent
/// count only; negative values cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MoneyAmount {
    cents: i64,
}

impl MoneyAmount {
    /// Largest representable cent count.
    pub const MAX_MINOR_UNITS: i64 = i64::MAX;

    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    pub fn from_minor_units(cents: i64) -> Result<Self, MoneyError> {
        if cents < 0 {
            return Err(MoneyError::InvalidAmount(format!(
                "minor units must not be negative (got {cents})"
            )));
        }
        Ok(Self { cents })
    }

    pub fn from_major_and_minor(major: i64, minor: i64) -> Result<Self, MoneyError> {
        if major < 0 {
            return Err(MoneyError::InvalidAmount(format!(
                "major units must not be negative (got {major})"
            )));
        }
        if !(0..MINOR_PER_MAJOR).contains(&minor) {
            return Err(MoneyError::InvalidAmount(format!(
                "minor units must be within 0..{MINOR_PER_MAJOR} (got {minor})"
            )));
        }
        let cents = major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|value| value.checked_add(minor))
            .ok_or_else(|| {
                MoneyError::InvalidAmount(format!("{major},{minor:02} is out of range"))
            })?;
        Self::from_minor_units(cents)
    }

    /// Parses the canonical `"{major},{minor:02}"` form, e.g. `"12,50"`.
    /// Leading zeros in the major part are accepted.
    pub fn from_text(text: &str) -> Result<Self, MoneyError> {
        if !CANONICAL_TEXT.is_match(text) {
            return Err(MoneyError::InvalidAmount(format!(
                "`{text}` is not in the form 12,50"
            )));
        }
        let (major, minor) = text
            .split_once(',')
            .ok_or_else(|| MoneyError::InvalidAmount(format!("`{text}` has no comma")))?;
        let major = major
            .parse::<i64>()
            .map_err(|_| MoneyError::InvalidAmount(format!("`{text}` is out of range")))?;
        let minor = minor
            .parse::<i64>()
            .map_err(|_| MoneyError::InvalidAmount(format!("`{text}` has invalid cents")))?;
        Self::from_major_and_minor(major, minor)
    }

    /// Total counterpart of [`MoneyAmount::from_text`]; accepts exactly the
    /// inputs `from_text` accepts.
    pub fn is_valid_text(text: &str) -> bool {
        Self::from_text(text).is_ok()
    }

    pub const fn to_minor_units(self) -> i64 {
        self.cents
    }

    pub const fn is_zero(self) -> bool {
        self.cents == 0
    }

    pub fn add(self, other: MoneyAmount) -> Result<Self, MoneyError> {
        self.cents
            .checked_add(other.cents)
            .map(|cents| Self { cents })
            .ok_or(MoneyError::Overflow)
    }

    pub fn can_add(self, other: MoneyAmount) -> bool {
        self.cents.checked_add(other.cents).is_some()
    }

    pub fn subtract(self, other: MoneyAmount) -> Result<Self, MoneyError> {
        if !self.can_subtract(other) {
            return Err(MoneyError::NegativeResult);
        }
        Ok(Self {
            cents: self.cents - other.cents,
        })
    }

    pub fn can_subtract(self, other: MoneyAmount) -> bool {
        self.cents >= other.cents
    }

    /// Multiplies by a non-negative integer factor. The overflow check
    /// happens before multiplying.
    pub fn scale(self, factor: i64) -> Result<Self, MoneyError> {
        if factor < 0 {
            return Err(MoneyError::InvalidFactor(factor));
        }
        if factor == 0 {
            return Ok(Self::zero());
        }
        if self.cents > Self::MAX_MINOR_UNITS / factor {
            return Err(MoneyError::Overflow);
        }
        Ok(Self {
            cents: self.cents * factor,
        })
    }

    pub fn can_scale(self, factor: i64) -> bool {
        match factor {
            f if f < 0 => false,
            0 => true,
            f => self.cents <= Self::MAX_MINOR_UNITS / f,
        }
    }

    pub fn compare(self, other: MoneyAmount) -> Ordering {
        self.cents.cmp(&other.cents)
    }

    /// Absolute difference. Both operands are non-negative, so it cannot
    /// overflow.
    pub(crate) fn distance(self, other: MoneyAmount) -> Self {
        Self {
            cents: (self.cents - other.cents).abs(),
        }
    }

    /// Canonical text form, e.g. `"8,10"`. Never carries a currency symbol.
    pub fn format(self) -> String {
        format!(
            "{},{:02}",
            self.cents / MINOR_PER_MAJOR,
            self.cents % MINOR_PER_MAJOR
        )
    }

    /// Canonical text followed by `symbol`, e.g. `"8,10 €"`.
    pub fn format_with_symbol(self, symbol: &str) -> String {
        if symbol.is_empty() {
            self.format()
        } else {
            format!("{} {}", self.format(), symbol)
        }
    }
}

impl Default for MoneyAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl TryFrom<i64> for MoneyAmount {
    type Error = MoneyError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Self::from_minor_units(cents)
    }
}

impl From<MoneyAmount> for i64 {
    fn from(amount: MoneyAmount) -> Self {
        amount.cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pattern_rejects_non_ascii_digits() {
        assert!(!MoneyAmount::is_valid_text("１２,50"));
        assert!(!MoneyAmount::is_valid_text("12,٥٠"));
    }

    #[test]
    fn serde_rejects_negative_cent_counts() {
        let err = serde_json::from_str::<MoneyAmount>("-5").unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
        let amount: MoneyAmount = serde_json::from_str("1190").unwrap();
        assert_eq!(amount.format(), "11,90");
    }

    #[test]
    fn distance_is_symmetric_and_never_negative() {
        let low = MoneyAmount::from_minor_units(1000).unwrap();
        let high = MoneyAmount::from_minor_units(1190).unwrap();
        assert_eq!(low.distance(high).to_minor_units(), 190);
        assert_eq!(high.distance(low).to_minor_units(), 190);
        assert!(high.distance(high).is_zero());

        let max = MoneyAmount::from_minor_units(MoneyAmount::MAX_MINOR_UNITS).unwrap();
        assert_eq!(MoneyAmount::zero().distance(max), max);
    }
}
