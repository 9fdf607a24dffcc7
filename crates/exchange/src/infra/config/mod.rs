use alloy::primitives::{Address, B256};

pub mod file;

pub use file::load;

/// Configuration of the exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Name of the EIP-712 signing domain.
    pub name: String,
    /// Version of the EIP-712 signing domain.
    pub version: String,
    pub chain_id: u64,
    /// Address of the exchange, the verifying contract of the signing domain.
    pub address: Address,
    pub conduit_controller: Address,
    /// Conduits with an open channel at startup.
    pub conduits: Vec<(B256, Address)>,
}
