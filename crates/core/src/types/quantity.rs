//! Cart line quantity.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,
    /// Quantity was above the per-line cap.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// A positive item count for a single cart line.
///
/// Zero is unrepresentable: a line that would drop to zero is removed from
/// the cart instead.
///
/// ```
/// use rxshop_core::Quantity;
///
/// assert_eq!(Quantity::new(3).unwrap().get(), 3);
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(Quantity::MAX + 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Largest quantity a single line may hold.
    pub const MAX: u32 = 999;

    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// The largest quantity, [`Quantity::MAX`].
    pub const LARGEST: Self = match NonZeroU32::new(Self::MAX) {
        Some(n) => Self(n),
        None => Self::ONE,
    };

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` is zero or above [`Quantity::MAX`].
    pub const fn new(n: u32) -> Result<Self, QuantityError> {
        if n > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        match NonZeroU32::new(n) {
            Some(n) => Ok(Self(n)),
            None => Err(QuantityError::Zero),
        }
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, failing if the sum exceeds [`Quantity::MAX`].
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooLarge`] when the sum is over the cap.
    pub const fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        match self.get().checked_add(other.get()) {
            Some(sum) => Self::new(sum),
            None => Err(QuantityError::TooLarge { max: Self::MAX }),
        }
    }

    /// Add two quantities, clamping at [`Quantity::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        self.checked_add(other).unwrap_or(Self::LARGEST)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add_within_cap() {
        let sum = Quantity::new(2)
            .unwrap()
            .checked_add(Quantity::new(3).unwrap())
            .unwrap();
        assert_eq!(sum.get(), 5);
    }

    #[test]
    fn test_checked_add_over_cap() {
        let big = Quantity::new(Quantity::MAX).unwrap();
        assert_eq!(
            big.checked_add(Quantity::ONE),
            Err(QuantityError::TooLarge { max: Quantity::MAX })
        );
    }

    #[test]
    fn test_saturating_add_clamps() {
        let big = Quantity::new(998).unwrap();
        assert_eq!(big.saturating_add(Quantity::new(5).unwrap()), Quantity::LARGEST);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("-2").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
    }
}
