//! Orders as signed by offerers and as submitted by fulfillers.

use {
    crate::{
        DomainSeparator,
        item::{self, CONSIDERATION_ITEM_TYPE, ConsiderationItem, OFFER_ITEM_TYPE, OfferItem},
        signature,
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::sync::LazyLock,
};

/// Whether an order may be partially filled and whether it must be approved
/// by its zone.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, strum::IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    #[default]
    FullOpen,
    PartialOpen,
    FullRestricted,
    PartialRestricted,
}

impl OrderType {
    pub fn allows_partial_fills(self) -> bool {
        matches!(self, Self::PartialOpen | Self::PartialRestricted)
    }

    pub fn is_restricted(self) -> bool {
        matches!(self, Self::FullRestricted | Self::PartialRestricted)
    }
}

impl From<OrderType> for u8 {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::FullOpen => 0,
            OrderType::PartialOpen => 1,
            OrderType::FullRestricted => 2,
            OrderType::PartialRestricted => 3,
        }
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown order type {0}")]
pub struct UnknownOrderType(pub u8);

impl TryFrom<u8> for OrderType {
    type Error = UnknownOrderType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::FullOpen,
            1 => Self::PartialOpen,
            2 => Self::FullRestricted,
            3 => Self::PartialRestricted,
            other => return Err(UnknownOrderType(other)),
        })
    }
}

static ORDER_COMPONENTS_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
    keccak256(
        [
            "OrderComponents(address offerer,address zone,OfferItem[] offer,ConsiderationItem[] \
             consideration,uint8 orderType,uint256 startTime,uint256 endTime,bytes32 \
             zoneHash,uint256 salt,bytes32 conduitKey,uint256 counter)",
            CONSIDERATION_ITEM_TYPE,
            OFFER_ITEM_TYPE,
        ]
        .concat(),
    )
});

type OrderComponentsSol = sol! {
    tuple(
        bytes32, // ORDER_COMPONENTS_TYPEHASH
        address, // offerer
        address, // zone
        bytes32, // keccak(offer item hashes)
        bytes32, // keccak(consideration item hashes)
        uint8,   // orderType
        uint256, // startTime
        uint256, // endTime
        bytes32, // zoneHash
        uint256, // salt
        bytes32, // conduitKey
        uint256, // counter
    )
};

/// The order as seen by a fulfiller.
///
/// Fulfillers may append consideration items (tips) after the first
/// `total_original_consideration_items` ones. Appended items are paid by the
/// fulfiller and are not covered by the order hash.
#[serde_as]
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderParameters {
    pub offerer: Address,
    pub zone: Address,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub order_type: OrderType,
    #[serde_as(as = "HexOrDecimalU256")]
    pub start_time: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub end_time: U256,
    pub zone_hash: B256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    pub conduit_key: B256,
    pub total_original_consideration_items: usize,
}

impl OrderParameters {
    /// The signed components of the order for the given offerer counter.
    ///
    /// Tips appended by the fulfiller are dropped. Callers are expected to
    /// check that the consideration has at least
    /// `total_original_consideration_items` items; missing items are simply
    /// absent from the components.
    pub fn components(&self, counter: U256) -> OrderComponents {
        let original = self
            .total_original_consideration_items
            .min(self.consideration.len());
        OrderComponents {
            offerer: self.offerer,
            zone: self.zone,
            offer: self.offer.clone(),
            consideration: self.consideration[..original].to_vec(),
            order_type: self.order_type,
            start_time: self.start_time,
            end_time: self.end_time,
            zone_hash: self.zone_hash,
            salt: self.salt,
            conduit_key: self.conduit_key,
            counter,
        }
    }

    /// The order hash for the given offerer counter. This is the identity
    /// under which the order status is tracked.
    pub fn order_hash(&self, counter: U256) -> B256 {
        order_hash(
            self.offerer,
            self.zone,
            &self.offer,
            &self.consideration[..self
                .total_original_consideration_items
                .min(self.consideration.len())],
            self.order_type,
            OrderTimes {
                start: self.start_time,
                end: self.end_time,
            },
            self.zone_hash,
            self.salt,
            self.conduit_key,
            counter,
        )
    }

    /// Whether `now` lies within `[start_time, end_time)`.
    pub fn is_active(&self, now: u64) -> bool {
        let now = U256::from(now);
        self.start_time <= now && now < self.end_time
    }
}

/// The order as signed by the offerer.
#[serde_as]
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderComponents {
    pub offerer: Address,
    pub zone: Address,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub order_type: OrderType,
    #[serde_as(as = "HexOrDecimalU256")]
    pub start_time: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub end_time: U256,
    pub zone_hash: B256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    pub conduit_key: B256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub counter: U256,
}

impl OrderComponents {
    /// Returns the value of hashStruct() over the order components as defined
    /// by EIP-712.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
    pub fn hash_struct(&self) -> B256 {
        order_hash(
            self.offerer,
            self.zone,
            &self.offer,
            &self.consideration,
            self.order_type,
            OrderTimes {
                start: self.start_time,
                end: self.end_time,
            },
            self.zone_hash,
            self.salt,
            self.conduit_key,
            self.counter,
        )
    }

    /// The digest the offerer signs for this order.
    pub fn signing_digest(&self, domain: &DomainSeparator) -> B256 {
        signature::signing_digest(domain, &self.hash_struct())
    }

    /// Fulfillment parameters for these components without tips.
    pub fn into_parameters(self) -> OrderParameters {
        OrderParameters {
            total_original_consideration_items: self.consideration.len(),
            offerer: self.offerer,
            zone: self.zone,
            offer: self.offer,
            consideration: self.consideration,
            order_type: self.order_type,
            start_time: self.start_time,
            end_time: self.end_time,
            zone_hash: self.zone_hash,
            salt: self.salt,
            conduit_key: self.conduit_key,
        }
    }
}

struct OrderTimes {
    start: U256,
    end: U256,
}

#[allow(clippy::too_many_arguments)]
fn order_hash(
    offerer: Address,
    zone: Address,
    offer: &[OfferItem],
    consideration: &[ConsiderationItem],
    order_type: OrderType,
    times: OrderTimes,
    zone_hash: B256,
    salt: U256,
    conduit_key: B256,
    counter: U256,
) -> B256 {
    keccak256(OrderComponentsSol::abi_encode_sequence(&(
        *ORDER_COMPONENTS_TYPE_HASH,
        offerer,
        zone,
        item::hash_array(offer.iter().map(OfferItem::hash_struct)),
        item::hash_array(consideration.iter().map(ConsiderationItem::hash_struct)),
        u8::from(order_type),
        times.start,
        times.end,
        zone_hash,
        salt,
        conduit_key,
        counter,
    )))
}

/// An order with its signature, always filled completely.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub parameters: OrderParameters,
    pub signature: Bytes,
}

/// An order with a requested fill fraction and data for the zone.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedOrder {
    pub parameters: OrderParameters,
    pub numerator: u128,
    pub denominator: u128,
    pub signature: Bytes,
    pub extra_data: Bytes,
}

impl From<Order> for AdvancedOrder {
    fn from(order: Order) -> Self {
        Self {
            parameters: order.parameters,
            numerator: 1,
            denominator: 1,
            signature: order.signature,
            extra_data: Bytes::new(),
        }
    }
}
