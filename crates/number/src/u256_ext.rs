//! Extension trait for U256 arithmetic with explicit rounding.
//!
//! Every operation is checked: `None` means the result does not fit into 256
//! bits or a division by zero was attempted.

use alloy::primitives::U256;

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Ceiling division: (self + other - 1) / other
    fn checked_ceil_div(&self, other: &Self) -> Option<Self>;

    /// `self * numerator / denominator` only if the division is exact.
    fn checked_mul_div_exact(&self, numerator: &Self, denominator: &Self) -> Option<Self>;
}

impl U256Ext for U256 {
    fn checked_ceil_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        // Written without the `+ other - 1` so that values close to
        // `U256::MAX` do not overflow.
        if self.is_zero() {
            return Some(U256::ZERO);
        }
        Some((*self - U256::from(1u64)) / *other + U256::from(1u64))
    }

    fn checked_mul_div_exact(&self, numerator: &Self, denominator: &Self) -> Option<Self> {
        let product = self.checked_mul(*numerator)?;
        if denominator.is_zero() || !(product % *denominator).is_zero() {
            return None;
        }
        Some(product / *denominator)
    }
}
