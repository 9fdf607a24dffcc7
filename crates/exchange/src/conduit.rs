//! Performing executions, either directly or through conduits.
//!
//! A conduit is an operator that accounts approve once and that every
//! exchange sharing the conduit can then transfer through. Executions name
//! the conduit they run through by its key; the zero key stands for the
//! exchange itself.

use {
    crate::{
        Error,
        infra::{Ledger, Transfer},
        metrics::Metrics,
    },
    alloy::primitives::{Address, B256, U256},
    itertools::Itertools,
    model::{NO_CONDUIT, fulfillment::Execution, item::ItemType},
    std::collections::BTreeMap,
};

/// Conduits with an open channel to the exchange, by key.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Registry {
    channels: BTreeMap<B256, Address>,
}

impl Registry {
    pub fn open_channel(&mut self, key: B256, conduit: Address) {
        tracing::info!(?key, ?conduit, "opened conduit channel");
        self.channels.insert(key, conduit);
    }

    pub fn close_channel(&mut self, key: &B256) -> Option<Address> {
        let conduit = self.channels.remove(key);
        tracing::info!(?key, ?conduit, "closed conduit channel");
        conduit
    }

    pub fn get(&self, key: &B256) -> Option<Address> {
        self.channels.get(key).copied()
    }

    pub fn channels(&self) -> impl Iterator<Item = (B256, Address)> + '_ {
        self.channels.iter().map(|(key, conduit)| (*key, *conduit))
    }
}

impl FromIterator<(B256, Address)> for Registry {
    fn from_iter<T: IntoIterator<Item = (B256, Address)>>(iter: T) -> Self {
        Self {
            channels: iter.into_iter().collect(),
        }
    }
}

/// Native value sent along with a call that has not been paid out yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Budget(U256);

impl Budget {
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    pub fn remaining(&self) -> U256 {
        self.0
    }

    fn spend(&mut self, amount: U256) -> Result<(), Error> {
        self.0 = self
            .0
            .checked_sub(amount)
            .ok_or(Error::InsufficientNativeSupplied)?;
        Ok(())
    }

    /// Returns whatever is left to `caller`.
    pub fn refund(self, ledger: &mut impl Ledger, caller: Address) -> Result<(), Error> {
        pay_native(ledger, caller, self.0)
    }
}

/// Performs `executions` in order on behalf of the exchange at `exchange`.
///
/// Consecutive executions sharing a conduit key form one batch sent through
/// that conduit. Native items are paid out of `budget` instead and never
/// need the conduit to be open.
pub fn execute(
    ledger: &mut impl Ledger,
    registry: &Registry,
    exchange: Address,
    executions: &[Execution],
    budget: &mut Budget,
) -> Result<(), Error> {
    let batches = executions
        .iter()
        .enumerate()
        .chunk_by(|(_, execution)| execution.conduit_key);
    for (conduit_key, batch) in &batches {
        let mut resolved = None;
        let mut resolve = || -> Result<Address, Error> {
            if let Some(resolved) = resolved {
                return Ok(resolved);
            }
            let channel = operator(registry, exchange, conduit_key)?;
            resolved = Some(channel);
            Ok(channel)
        };
        for (index, execution) in batch {
            perform(ledger, &mut resolve, index, execution, budget)?;
        }
    }
    Ok(())
}

fn operator(registry: &Registry, exchange: Address, conduit_key: B256) -> Result<Address, Error> {
    if conduit_key == NO_CONDUIT {
        return Ok(exchange);
    }
    registry
        .get(&conduit_key)
        .ok_or(Error::ConduitChannelClosed(conduit_key))
}

fn perform(
    ledger: &mut impl Ledger,
    operator: &mut impl FnMut() -> Result<Address, Error>,
    index: usize,
    execution: &Execution,
    budget: &mut Budget,
) -> Result<(), Error> {
    let item = &execution.item;
    let item_type: &'static str = item.item_type.into();
    Metrics::get()
        .executions
        .with_label_values(&[item_type])
        .inc();
    match item.item_type {
        ItemType::Native => {
            if !item.token.is_zero() || !item.identifier.is_zero() {
                return Err(Error::UnusedItemParameters);
            }
            budget.spend(item.amount)?;
            return pay_native(ledger, item.recipient, item.amount);
        }
        ItemType::Erc20 if !item.identifier.is_zero() => {
            return Err(Error::UnusedItemParameters);
        }
        ItemType::Erc721 | ItemType::Erc721WithCriteria if item.amount != U256::from(1) => {
            return Err(Error::InvalidErc721TransferAmount(item.amount));
        }
        _ => (),
    }
    let operator = operator()?;
    let transfer = Transfer {
        item_type: item.item_type,
        token: item.token,
        from: execution.offerer,
        to: item.recipient,
        identifier: item.identifier,
        amount: item.amount,
    };
    ledger
        .transfer(operator, &transfer)
        .map_err(|source| Error::TransferFailed {
            index,
            token: transfer.token,
            from: transfer.from,
            to: transfer.to,
            identifier: transfer.identifier,
            amount: transfer.amount,
            source,
        })
}

fn pay_native(ledger: &mut impl Ledger, to: Address, amount: U256) -> Result<(), Error> {
    if amount.is_zero() {
        return Ok(());
    }
    ledger.transfer_native(to, amount).map_err(|err| {
        tracing::debug!(?to, ?amount, ?err, "native transfer failed");
        Error::NativeTransferFailed { to, amount }
    })
}
