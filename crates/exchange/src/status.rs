//! Fill and cancellation state of orders and the counters of offerers.
//!
//! The store is the only owner of this state. Every mutation is journalled so
//! that a failed call can be undone with [`Store::rollback`].

use {
    alloy::primitives::{Address, B256, U256},
    serde::Serialize,
    std::collections::HashMap,
};

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum Error {
    #[error("order {0} is cancelled")]
    Cancelled(B256),
    #[error("order {0} is already filled")]
    Filled(B256),
    #[error("fill fraction must satisfy 0 < numerator <= denominator")]
    BadFraction,
    #[error("fill fraction does not fit into 128 bits")]
    Overflow,
}

/// What is known about an order. Orders that were never validated, filled or
/// cancelled have the default status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub is_validated: bool,
    pub is_cancelled: bool,
    pub numerator: u128,
    pub denominator: u128,
}

impl OrderStatus {
    pub fn is_unused(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_fully_filled(&self) -> bool {
        self.numerator != 0 && self.numerator >= self.denominator
    }
}

#[derive(Debug)]
enum Undo {
    Status(B256, Option<OrderStatus>),
    Counter(Address, Option<U256>),
}

/// Position in the journal to roll back to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint(usize);

#[derive(Debug, Default)]
pub struct Store {
    statuses: HashMap<B256, OrderStatus>,
    counters: HashMap<Address, U256>,
    journal: Vec<Undo>,
}

impl Store {
    pub fn status(&self, order_hash: &B256) -> OrderStatus {
        self.statuses.get(order_hash).copied().unwrap_or_default()
    }

    pub fn counter(&self, offerer: &Address) -> U256 {
        self.counters.get(offerer).copied().unwrap_or_default()
    }

    /// Marks the order as validated so later fulfillments skip the signature
    /// check. Returns whether the order was not validated before.
    pub fn validate(&mut self, order_hash: B256) -> Result<bool, Error> {
        let status = self.status(&order_hash);
        if status.is_cancelled {
            return Err(Error::Cancelled(order_hash));
        }
        if status.is_validated {
            return Ok(false);
        }
        if status.is_fully_filled() {
            return Err(Error::Filled(order_hash));
        }
        self.set_status(
            order_hash,
            OrderStatus {
                is_validated: true,
                ..status
            },
        );
        Ok(true)
    }

    /// Cancels the order for good, at any fill level.
    pub fn cancel(&mut self, order_hash: B256) {
        let status = self.status(&order_hash);
        self.set_status(
            order_hash,
            OrderStatus {
                is_validated: false,
                is_cancelled: true,
                ..status
            },
        );
    }

    /// Increments the counter of `offerer`, invalidating every order signed
    /// for the previous value.
    pub fn increment_counter(&mut self, offerer: Address) -> Result<U256, Error> {
        let previous = self.counters.get(&offerer).copied();
        let counter = previous
            .unwrap_or_default()
            .checked_add(U256::from(1))
            .ok_or(Error::Overflow)?;
        self.journal.push(Undo::Counter(offerer, previous));
        self.counters.insert(offerer, counter);
        Ok(counter)
    }

    /// Clamps the requested fill fraction to what is left of the order.
    ///
    /// The result is the fraction of the whole order that will actually be
    /// filled. It is expressed over a common denominator with the already
    /// filled part so that [`Store::record_fill`] can add it exactly.
    pub fn clamp_fill(
        &self,
        order_hash: &B256,
        numerator: u128,
        denominator: u128,
    ) -> Result<(u128, u128), Error> {
        check_fraction(numerator, denominator)?;
        let status = self.status(order_hash);
        if status.is_cancelled {
            return Err(Error::Cancelled(*order_hash));
        }
        if status.is_unused() {
            return Ok((numerator, denominator));
        }
        if status.is_fully_filled() {
            return Err(Error::Filled(*order_hash));
        }

        let (filled, requested, size) = if denominator == status.denominator {
            (
                U256::from(status.numerator),
                U256::from(numerator),
                U256::from(denominator),
            )
        } else {
            (
                U256::from(status.numerator) * U256::from(denominator),
                U256::from(numerator) * U256::from(status.denominator),
                U256::from(status.denominator) * U256::from(denominator),
            )
        };
        fit(requested.min(size - filled), size)
    }

    /// Adds `numerator / denominator` to the filled fraction of the order and
    /// marks it validated.
    pub fn record_fill(
        &mut self,
        order_hash: B256,
        numerator: u128,
        denominator: u128,
    ) -> Result<(), Error> {
        check_fraction(numerator, denominator)?;
        let status = self.status(&order_hash);
        if status.is_cancelled {
            return Err(Error::Cancelled(order_hash));
        }

        let (numerator, denominator) = if status.is_unused() {
            (numerator, denominator)
        } else if denominator == status.denominator {
            let filled = status
                .numerator
                .checked_add(numerator)
                .ok_or(Error::Filled(order_hash))?;
            (filled, denominator)
        } else {
            let filled = U256::from(status.numerator) * U256::from(denominator)
                + U256::from(numerator) * U256::from(status.denominator);
            let size = U256::from(status.denominator) * U256::from(denominator);
            if filled > size {
                return Err(Error::Filled(order_hash));
            }
            fit(filled, size)?
        };
        if numerator > denominator {
            return Err(Error::Filled(order_hash));
        }

        self.set_status(
            order_hash,
            OrderStatus {
                is_validated: true,
                is_cancelled: false,
                numerator,
                denominator,
            },
        );
        Ok(())
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Undoes every mutation since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.0 {
            match self.journal.pop() {
                Some(Undo::Status(hash, Some(status))) => {
                    self.statuses.insert(hash, status);
                }
                Some(Undo::Status(hash, None)) => {
                    self.statuses.remove(&hash);
                }
                Some(Undo::Counter(offerer, Some(counter))) => {
                    self.counters.insert(offerer, counter);
                }
                Some(Undo::Counter(offerer, None)) => {
                    self.counters.remove(&offerer);
                }
                None => break,
            }
        }
    }

    /// Forgets the journal, making every mutation so far permanent.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    fn set_status(&mut self, order_hash: B256, status: OrderStatus) {
        let previous = self.statuses.insert(order_hash, status);
        self.journal.push(Undo::Status(order_hash, previous));
    }
}

fn check_fraction(numerator: u128, denominator: u128) -> Result<(), Error> {
    if numerator == 0 || numerator > denominator {
        return Err(Error::BadFraction);
    }
    Ok(())
}

/// Narrows a fraction to 128 bits, reducing it first if it does not fit.
fn fit(numerator: U256, denominator: U256) -> Result<(u128, u128), Error> {
    let narrow = |numerator: U256, denominator: U256| {
        Some((
            u128::try_from(numerator).ok()?,
            u128::try_from(denominator).ok()?,
        ))
    };
    if let Some(fraction) = narrow(numerator, denominator) {
        return Ok(fraction);
    }
    let divisor = numerator.gcd(denominator);
    narrow(numerator / divisor, denominator / divisor).ok_or(Error::Overflow)
}
