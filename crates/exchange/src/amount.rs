//! Amounts of items at a point in time and for a fill fraction.
//!
//! Items whose start and end amounts differ change linearly over the order's
//! lifetime. Rounding never favours the party that pays: amounts owed to
//! somebody (consideration) round up, amounts given away (offer) round down.

use {
    crate::Error,
    alloy::primitives::U256,
    number::U256Ext,
};

/// The amount at `now` of an item moving linearly from `start` at
/// `start_time` to `end` at `end_time`.
///
/// Callers must check `start_time <= now < end_time` first.
pub fn locate_current_amount(
    start: U256,
    end: U256,
    start_time: U256,
    end_time: U256,
    now: U256,
    round_up: bool,
) -> Result<U256, Error> {
    if start == end {
        return Ok(end);
    }
    let duration = end_time.checked_sub(start_time).ok_or(Error::InvalidTime)?;
    let elapsed = now.checked_sub(start_time).ok_or(Error::InvalidTime)?;
    let remaining = duration.checked_sub(elapsed).ok_or(Error::InvalidTime)?;
    let total = start
        .checked_mul(remaining)
        .and_then(|a| end.checked_mul(elapsed).and_then(|b| a.checked_add(b)))
        .ok_or(Error::Overflow)?;
    let amount = if round_up {
        total.checked_ceil_div(&duration)
    } else {
        total.checked_div(duration)
    };
    amount.ok_or(Error::InvalidTime)
}

/// `value * numerator / denominator`, which must divide without remainder.
pub fn apply_fraction(value: U256, numerator: u128, denominator: u128) -> Result<U256, Error> {
    if numerator == denominator {
        return Ok(value);
    }
    let (numerator, denominator) = (U256::from(numerator), U256::from(denominator));
    value.checked_mul(numerator).ok_or(Error::Overflow)?;
    value
        .checked_mul_div_exact(&numerator, &denominator)
        .ok_or(Error::InexactFraction)
}

/// Scales an item by the fill fraction and locates its amount at `now`.
pub fn current_amount(
    start: U256,
    end: U256,
    fraction: (u128, u128),
    window: (U256, U256),
    now: U256,
    round_up: bool,
) -> Result<U256, Error> {
    let (numerator, denominator) = fraction;
    locate_current_amount(
        apply_fraction(start, numerator, denominator)?,
        apply_fraction(end, numerator, denominator)?,
        window.0,
        window.1,
        now,
        round_up,
    )
}
