//! Verification of order signatures, either ECDSA (plain or EIP-2098 compact)
//! or EIP-1271 for offerers that are contracts.

use {
    crate::{Error, infra::ContractSigners},
    alloy::{
        primitives::{Address, B256, Bytes, FixedBytes},
        sol_types::SolCall,
    },
    model::{
        abi::ContractSigner,
        signature::{EcdsaSignature, RecoveryError},
    },
};

/// The value `isValidSignature` returns for valid signatures.
pub const EIP1271_MAGIC_VALUE: FixedBytes<4> =
    FixedBytes(ContractSigner::isValidSignatureCall::SELECTOR);

/// Checks that `offerer` signed `digest`.
///
/// 64 and 65 byte signatures are tried as ECDSA signatures first. Failing
/// that, or for any other length, offerers with code get to validate the
/// signature themselves.
pub fn verify(
    signers: &impl ContractSigners,
    offerer: Address,
    digest: B256,
    signature: &Bytes,
) -> Result<(), Error> {
    let ecdsa = EcdsaSignature::from_bytes(signature)
        .and_then(|signature| signature.recover(&digest))
        .map_err(|err| match err {
            RecoveryError::BadV(v) => Error::BadSignatureV(v),
            RecoveryError::BadLength(_) | RecoveryError::Unrecoverable => Error::InvalidSignature,
        })
        .and_then(|signer| match signer == offerer {
            true => Ok(()),
            false => Err(Error::InvalidSigner(signer)),
        });
    let Err(err) = ecdsa else {
        return Ok(());
    };

    match signers.is_valid_signature(offerer, digest, signature) {
        None => {
            tracing::debug!(?offerer, ?err, "rejected ECDSA signature");
            Err(err)
        }
        Some(Ok(magic)) if magic == EIP1271_MAGIC_VALUE => Ok(()),
        Some(result) => {
            tracing::debug!(?offerer, ?result, "contract offerer rejected signature");
            Err(Error::BadContractSignature)
        }
    }
}
