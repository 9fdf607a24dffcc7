//! Orders trading a single asset for a single payment asset, optionally with
//! tips to additional recipients.

use {
    crate::{
        item::{ConsiderationItem, ItemType, OfferItem},
        order::{OrderParameters, OrderType},
    },
    alloy::primitives::{Address, B256, Bytes, U256},
    serde::{Deserialize, Serialize},
};

/// What is traded for what on the basic order path.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize, strum::EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum BasicOrderRoute {
    EthToErc721,
    EthToErc1155,
    Erc20ToErc721,
    Erc20ToErc1155,
    Erc721ToErc20,
    Erc1155ToErc20,
}

impl BasicOrderRoute {
    /// Kind of the single offer item.
    pub fn offer_item_type(self) -> ItemType {
        match self {
            Self::EthToErc721 | Self::Erc20ToErc721 => ItemType::Erc721,
            Self::EthToErc1155 | Self::Erc20ToErc1155 => ItemType::Erc1155,
            Self::Erc721ToErc20 | Self::Erc1155ToErc20 => ItemType::Erc20,
        }
    }

    /// Kind of the primary consideration item, received by the offerer.
    pub fn consideration_item_type(self) -> ItemType {
        match self {
            Self::EthToErc721 | Self::EthToErc1155 => ItemType::Native,
            Self::Erc20ToErc721 | Self::Erc20ToErc1155 => ItemType::Erc20,
            Self::Erc721ToErc20 => ItemType::Erc721,
            Self::Erc1155ToErc20 => ItemType::Erc1155,
        }
    }

    /// Whether the offerer gives the ERC-20 payment and receives the token,
    /// in which case tips are paid out of the offered amount.
    pub fn is_inverse(self) -> bool {
        matches!(self, Self::Erc721ToErc20 | Self::Erc1155ToErc20)
    }

    /// Kind of the tips: always the payment asset.
    pub fn tip_item_type(self) -> ItemType {
        if self.is_inverse() {
            ItemType::Erc20
        } else {
            self.consideration_item_type()
        }
    }

    fn index(self) -> u8 {
        match self {
            Self::EthToErc721 => 0,
            Self::EthToErc1155 => 1,
            Self::Erc20ToErc721 => 2,
            Self::Erc20ToErc1155 => 3,
            Self::Erc721ToErc20 => 4,
            Self::Erc1155ToErc20 => 5,
        }
    }
}

/// Combined route and order type of a basic order, `order_type + 4 * route`
/// on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BasicOrderType {
    pub route: BasicOrderRoute,
    pub order_type: OrderType,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("invalid basic order type {0}")]
pub struct InvalidBasicOrderType(pub u8);

impl TryFrom<u8> for BasicOrderType {
    type Error = InvalidBasicOrderType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let route = match value / 4 {
            0 => BasicOrderRoute::EthToErc721,
            1 => BasicOrderRoute::EthToErc1155,
            2 => BasicOrderRoute::Erc20ToErc721,
            3 => BasicOrderRoute::Erc20ToErc1155,
            4 => BasicOrderRoute::Erc721ToErc20,
            5 => BasicOrderRoute::Erc1155ToErc20,
            _ => return Err(InvalidBasicOrderType(value)),
        };
        let order_type =
            OrderType::try_from(value % 4).map_err(|_| InvalidBasicOrderType(value))?;
        Ok(Self { route, order_type })
    }
}

impl From<BasicOrderType> for u8 {
    fn from(value: BasicOrderType) -> Self {
        u8::from(value.order_type) + 4 * value.route.index()
    }
}

/// A tip paid to somebody other than the offerer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalRecipient {
    pub amount: U256,
    pub recipient: Address,
}

/// Parameters of `fulfillBasicOrder`, in wire order.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicOrderParameters {
    pub consideration_token: Address,
    pub consideration_identifier: U256,
    pub consideration_amount: U256,
    pub offerer: Address,
    pub zone: Address,
    pub offer_token: Address,
    pub offer_identifier: U256,
    pub offer_amount: U256,
    pub basic_order_type: u8,
    pub start_time: U256,
    pub end_time: U256,
    pub zone_hash: B256,
    pub salt: U256,
    pub offerer_conduit_key: B256,
    pub fulfiller_conduit_key: B256,
    pub total_original_additional_recipients: usize,
    pub additional_recipients: Vec<AdditionalRecipient>,
    pub signature: Bytes,
}

impl BasicOrderParameters {
    /// The equivalent general order. The primary consideration item goes to
    /// the offerer and every additional recipient becomes a consideration item
    /// of the payment asset. Only the first
    /// `total_original_additional_recipients` tips are part of the order hash.
    pub fn order_parameters(&self, kind: BasicOrderType) -> OrderParameters {
        let tip_token = if kind.route.is_inverse() {
            self.offer_token
        } else {
            self.consideration_token
        };
        let primary = ConsiderationItem {
            item_type: kind.route.consideration_item_type(),
            token: self.consideration_token,
            identifier_or_criteria: self.consideration_identifier,
            start_amount: self.consideration_amount,
            end_amount: self.consideration_amount,
            recipient: self.offerer,
        };
        let tips = self
            .additional_recipients
            .iter()
            .map(|tip| ConsiderationItem {
                item_type: kind.route.tip_item_type(),
                token: tip_token,
                identifier_or_criteria: U256::ZERO,
                start_amount: tip.amount,
                end_amount: tip.amount,
                recipient: tip.recipient,
            });
        OrderParameters {
            offerer: self.offerer,
            zone: self.zone,
            offer: vec![OfferItem {
                item_type: kind.route.offer_item_type(),
                token: self.offer_token,
                identifier_or_criteria: self.offer_identifier,
                start_amount: self.offer_amount,
                end_amount: self.offer_amount,
            }],
            consideration: std::iter::once(primary).chain(tips).collect(),
            order_type: kind.order_type,
            start_time: self.start_time,
            end_time: self.end_time,
            zone_hash: self.zone_hash,
            salt: self.salt,
            conduit_key: self.offerer_conduit_key,
            total_original_consideration_items: self.total_original_additional_recipients + 1,
        }
    }
}
