//! Resolution of criteria items to concrete identifiers.
//!
//! A criteria item commits to a merkle root over `keccak256(identifier)`
//! leaves, with pairs hashed in sorted order. A root of zero accepts any
//! identifier.

use {
    crate::{Error, fulfillment::Prepared},
    alloy::primitives::{B256, U256, keccak256},
    model::fulfillment::{CriteriaResolver, Side},
};

/// Applies every resolver to its item and checks that no criteria item of an
/// available order is left unresolved.
pub(crate) fn apply(orders: &mut [Prepared], resolvers: &[CriteriaResolver]) -> Result<(), Error> {
    for resolver in resolvers {
        let order = orders
            .get_mut(resolver.order_index)
            .ok_or(Error::OrderCriteriaResolverOutOfRange)?;
        if !order.is_available() {
            continue;
        }
        let parameters = &mut order.parameters;
        let (item_type, criteria) = match resolver.side {
            Side::Offer => {
                let item = parameters
                    .offer
                    .get_mut(resolver.index)
                    .ok_or(Error::OfferCriteriaResolverOutOfRange)?;
                (&mut item.item_type, &mut item.identifier_or_criteria)
            }
            Side::Consideration => {
                let item = parameters
                    .consideration
                    .get_mut(resolver.index)
                    .ok_or(Error::ConsiderationCriteriaResolverOutOfRange)?;
                (&mut item.item_type, &mut item.identifier_or_criteria)
            }
        };
        if !item_type.is_criteria() {
            return Err(Error::CriteriaNotEnabledForItem);
        }
        verify_proof(resolver.identifier, *criteria, &resolver.criteria_proof)?;
        *item_type = item_type.resolved();
        *criteria = resolver.identifier;
    }

    for order in orders.iter().filter(|order| order.is_available()) {
        if order.parameters.offer.iter().any(|item| item.item_type.is_criteria()) {
            return Err(Error::UnresolvedOfferCriteria);
        }
        if order
            .parameters
            .consideration
            .iter()
            .any(|item| item.item_type.is_criteria())
        {
            return Err(Error::UnresolvedConsiderationCriteria);
        }
    }
    Ok(())
}

/// Checks that `identifier` is part of the set committed to by `root`.
pub fn verify_proof(identifier: U256, root: U256, proof: &[B256]) -> Result<(), Error> {
    if root.is_zero() {
        return match proof.is_empty() {
            true => Ok(()),
            false => Err(Error::InvalidProof),
        };
    }
    let computed = proof
        .iter()
        .fold(leaf(identifier), |hash, sibling| hash_pair(hash, *sibling));
    match U256::from_be_bytes(computed.0) == root {
        true => Ok(()),
        false => Err(Error::InvalidProof),
    }
}

fn leaf(identifier: U256) -> B256 {
    keccak256(identifier.to_be_bytes::<32>())
}

fn hash_pair(a: B256, b: B256) -> B256 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    keccak256([low.as_slice(), high.as_slice()].concat())
}
