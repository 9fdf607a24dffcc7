use {
    crate::DomainSeparator,
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        signers::{SignerSync, local::PrivateKeySigner},
    },
    serde::{Deserialize, Serialize},
    std::fmt::{self, Debug, Formatter},
};

/// Returns the digest an offerer signs for an order hash:
/// `keccak256(0x1901 ‖ domainSeparator ‖ orderHash)`.
///
/// https://eips.ethereum.org/EIPS/eip-712#specification
pub fn signing_digest(domain: &DomainSeparator, order_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain.0.as_slice());
    message[34..66].copy_from_slice(order_hash.as_slice());
    keccak256(message)
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum RecoveryError {
    #[error("signature must be 64 or 65 bytes, got {0}")]
    BadLength(usize),
    #[error("signature v value {0} is not 27 or 28")]
    BadV(u8),
    #[error("no signer could be recovered from the signature")]
    Unrecoverable,
}

/// An ECDSA signature over secp256k1 in `r ‖ s ‖ v` form.
#[derive(Eq, PartialEq, Clone, Copy, Default, Hash, Deserialize, Serialize)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl EcdsaSignature {
    /// Parses a 65 byte `r ‖ s ‖ v` signature or a 64 byte compact
    /// `r ‖ vs` signature as defined by EIP-2098.
    ///
    /// https://eips.ethereum.org/EIPS/eip-2098
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecoveryError> {
        match bytes.len() {
            65 => Ok(Self {
                r: B256::from_slice(&bytes[..32]),
                s: B256::from_slice(&bytes[32..64]),
                v: bytes[64],
            }),
            64 => {
                let mut s = B256::from_slice(&bytes[32..64]);
                let y_parity = s[0] >> 7;
                s[0] &= 0x7f;
                Ok(Self {
                    r: B256::from_slice(&bytes[..32]),
                    s,
                    v: 27 + y_parity,
                })
            }
            len => Err(RecoveryError::BadLength(len)),
        }
    }

    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    /// Returns the EIP-2098 compact form of the signature.
    pub fn to_compact(self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..].copy_from_slice(self.s.as_slice());
        if self.v == 28 {
            bytes[32] |= 0x80;
        }
        bytes
    }

    /// Recovers the address that signed `digest`.
    pub fn recover(&self, digest: &B256) -> Result<Address, RecoveryError> {
        let y_parity = match self.v {
            27 => false,
            28 => true,
            v => return Err(RecoveryError::BadV(v)),
        };
        let signature = alloy::primitives::Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            y_parity,
        );
        match signature.recover_address_from_prehash(digest) {
            Ok(signer) if !signer.is_zero() => Ok(signer),
            _ => Err(RecoveryError::Unrecoverable),
        }
    }

    /// Signs a digest without any further prefixing.
    pub fn sign(signer: &PrivateKeySigner, digest: &B256) -> alloy::signers::Result<Self> {
        let signature = signer.sign_hash_sync(digest)?;
        Ok(Self {
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
            v: 27 + u8::from(signature.v()),
        })
    }
}

impl Debug for EcdsaSignature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&const_hex::encode_prefixed(self.to_bytes()))
    }
}
