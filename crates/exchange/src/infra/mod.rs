//! Boundary to everything the exchange does not own: asset ledgers, contract
//! offerers validating signatures, and zones approving restricted orders.

pub mod cli;
pub mod config;

pub use config::Config;
use {
    alloy::primitives::{Address, B256, Bytes, FixedBytes, U256},
    model::{fulfillment::CriteriaResolver, item::ItemType, order::AdvancedOrder},
};

/// A non-native transfer performed by an operator on behalf of `from`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transfer {
    /// Always a concrete kind: ERC-20, ERC-721 or ERC-1155.
    pub item_type: ItemType,
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub identifier: U256,
    pub amount: U256,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("operator {0} is not approved")]
    NotApproved(Address),
    #[error("recipient rejected the transfer")]
    Rejected,
}

/// A call into a contract reverted or returned malformed data.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("call reverted: {0}")]
pub struct Revert(pub String);

/// Handle to a ledger checkpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint(pub usize);

/// Asset balances and the authorisation to move them.
#[cfg_attr(test, mockall::automock)]
pub trait Ledger {
    /// Moves a token on behalf of `transfer.from`, authorised by `operator`
    /// (the exchange itself or a conduit).
    fn transfer(&mut self, operator: Address, transfer: &Transfer) -> Result<(), TransferError>;

    /// Pays native value held by the exchange to `to`.
    fn transfer_native(&mut self, to: Address, amount: U256) -> Result<(), TransferError>;

    fn checkpoint(&mut self) -> Checkpoint;

    /// Undoes everything since `checkpoint`, including later checkpoints.
    fn rollback(&mut self, checkpoint: Checkpoint);

    /// Keeps everything since `checkpoint`.
    fn commit(&mut self, checkpoint: Checkpoint);

    /// Current time in seconds since the unix epoch.
    fn timestamp(&self) -> u64;
}

/// Accounts that validate signatures with `isValidSignature` (EIP-1271).
#[cfg_attr(test, mockall::automock)]
pub trait ContractSigners {
    /// Calls `isValidSignature(digest, signature)` on `account`. Returns `None`
    /// when the account has no code and therefore cannot validate anything.
    fn is_valid_signature(
        &self,
        account: Address,
        digest: B256,
        signature: &Bytes,
    ) -> Option<Result<FixedBytes<4>, Revert>>;
}

/// Zones approving restricted orders.
#[cfg_attr(test, mockall::automock)]
pub trait Zones {
    fn is_valid_order(
        &self,
        zone: Address,
        order_hash: B256,
        caller: Address,
        offerer: Address,
        zone_hash: B256,
    ) -> Result<FixedBytes<4>, Revert>;

    #[allow(clippy::too_many_arguments)]
    fn is_valid_order_including_extra_data(
        &self,
        zone: Address,
        order_hash: B256,
        caller: Address,
        order: &AdvancedOrder,
        prior_order_hashes: &[B256],
        criteria_resolvers: &[CriteriaResolver],
    ) -> Result<FixedBytes<4>, Revert>;
}

/// Everything the exchange calls out to.
pub trait Environment: Ledger + ContractSigners + Zones {}

impl<T> Environment for T where T: Ledger + ContractSigners + Zones {}
