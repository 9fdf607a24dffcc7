//! Contains the order model of the exchange: items, orders, basic orders,
//! fulfillments and their EIP-712 hashing. Everything an off-engine signer
//! needs to reproduce order hashes and signing digests lives here.

pub mod abi;
pub mod basic;
pub mod fulfillment;
pub mod item;
pub mod order;
pub mod signature;

use {
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    std::{fmt, str::FromStr},
};

/// The null conduit key. Transfers for orders using it are performed by the
/// exchange itself.
pub const NO_CONDUIT: B256 = B256::ZERO;

type DomainSeparatorSol = sol! {
    tuple(
        bytes32, // EIP712_DOMAIN_TYPEHASH
        bytes32, // keccak(domain.name)
        bytes32, // keccak(domain.version)
        uint256, // block.chainId
        address, // address(this)
    )
};

/// The EIP-712 domain type used computing the domain separator.
pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// EIP-712 domain separator distinguishing one exchange deployment (name,
/// version, chain and contract address) from every other.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub B256);

impl DomainSeparator {
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
        Self(keccak256(DomainSeparatorSol::abi_encode_sequence(&(
            keccak256(DOMAIN_TYPE.as_bytes()),
            keccak256(name.as_bytes()),
            keccak256(version.as_bytes()),
            U256::from(chain_id),
            verifying_contract,
        ))))
    }
}

impl FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        const_hex::decode_to_slice(s.strip_prefix("0x").unwrap_or(s), &mut bytes)?;
        Ok(Self(B256::from(bytes)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl fmt::Display for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode_prefixed(self.0))
    }
}
