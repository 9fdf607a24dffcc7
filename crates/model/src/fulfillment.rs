//! Instructions from the fulfiller on how items of several orders are routed,
//! and the transfers that result from them.

use {
    crate::item::ReceivedItem,
    alloy::primitives::{Address, B256, U256},
    serde::{Deserialize, Serialize},
};

/// Refers to one item of one order in a list of orders.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentComponent {
    pub order_index: usize,
    pub item_index: usize,
}

/// Matches a group of offer items against a group of consideration items of
/// the same asset.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    pub offer_components: Vec<FulfillmentComponent>,
    pub consideration_components: Vec<FulfillmentComponent>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Offer,
    Consideration,
}

impl From<Side> for u8 {
    fn from(value: Side) -> Self {
        match value {
            Side::Offer => 0,
            Side::Consideration => 1,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Offer),
            1 => Ok(Self::Consideration),
            other => Err(other),
        }
    }
}

/// Picks a concrete identifier for a criteria item together with the proof
/// that it is part of the item's criteria.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaResolver {
    pub order_index: usize,
    pub side: Side,
    pub index: usize,
    pub identifier: U256,
    pub criteria_proof: Vec<B256>,
}

/// A single transfer: `item.amount` of the asset moves from `offerer` to
/// `item.recipient`, through the conduit with key `conduit_key`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub item: ReceivedItem,
    pub offerer: Address,
    pub conduit_key: B256,
}
