use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------     MinorUnits       --------------------------------------------------------

/// An exact integer amount of minor currency units (cents for USD and friends).
///
/// All cross-system monetary comparisons happen in minor units so that floating point drift on the storefront side
/// can never produce a spurious pass or fail. The two decimal conversions, [`MinorUnits::truncated`] and
/// [`MinorUnits::rounded`], are intentionally different: shipping, discount and line totals truncate, while tax
/// rounds half away from zero. Boundary cents depend on this asymmetry.
#[derive(Debug, Clone, Copy, Default, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MinorUnits {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for MinorUnits {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for MinorUnits {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for MinorUnits {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MinorUnits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MinorUnits {}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Convert a decimal currency amount by multiplying by 100 and truncating toward zero.
    ///
    /// This is the conversion used for shipping, discount and line totals.
    pub fn truncated(amount: f64) -> Self {
        Self((amount * 100.0).trunc() as i64)
    }

    /// Convert a decimal currency amount by multiplying by 100 and rounding half away from zero.
    ///
    /// Tax totals use this conversion. Do not "fix" this to match [`MinorUnits::truncated`]; the provider applies
    /// the same asymmetry on its side.
    pub fn rounded(amount: f64) -> Self {
        Self((amount * 100.0).round() as i64)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid price value: {0}")]
pub struct PriceParseError(String);

/// Storefront platforms frequently express prices as decimal strings ("12.34").
pub fn parse_decimal_price(price: &str) -> Result<MinorUnits, PriceParseError> {
    let negative = price.trim().starts_with('-');
    let trimmed = price.trim().trim_start_matches('-');
    let mut parts = trimmed.split('.');
    let whole_units = parts
        .next()
        .ok_or_else(|| PriceParseError(price.to_string()))?
        .parse::<i64>()
        .map_err(|e| PriceParseError(format!("{price}. {e}.")))?;
    let cents = match parts.next() {
        None => 0,
        Some(c) if c.len() > 2 => return Err(PriceParseError(format!("{price}. Too many decimal places."))),
        Some(c) => {
            let scale = if c.len() == 1 { 10 } else { 1 };
            c.parse::<i64>().map_err(|e| PriceParseError(format!("{price}. {e}.")))? * scale
        },
    };
    let value = 100 * whole_units + cents;
    Ok(MinorUnits::from(if negative { -value } else { value }))
}
