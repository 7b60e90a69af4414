//! Line quantity value object.

use core::num::NonZeroU32;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A strictly positive item quantity.
///
/// Anything that reaches the cart as a raw number or string goes through
/// `Quantity::new` / `Quantity::parse`, so non-positive and non-numeric input
/// is rejected with `DomainError::InvalidQuantity` at the boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl ValueObject for Quantity {}

impl Quantity {
    pub const ONE: Quantity = Quantity(NonZeroU32::MIN);

    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 1 {
            return Err(DomainError::invalid_quantity(format!(
                "quantity must be at least 1, got {value}"
            )));
        }
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or_else(|| DomainError::invalid_quantity(format!("quantity {value} is too large")))
    }

    /// Parse user-entered text (surrounding whitespace allowed).
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let value: i64 = trimmed.parse().map_err(|_| {
            DomainError::invalid_quantity(format!("'{trimmed}' is not a whole number"))
        })?;
        Self::new(value)
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity; overflow is an `InvalidQuantity`.
    pub fn checked_add(self, other: Quantity) -> DomainResult<Self> {
        self.0
            .checked_add(other.get())
            .map(Self)
            .ok_or_else(|| DomainError::invalid_quantity("quantity overflow"))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
