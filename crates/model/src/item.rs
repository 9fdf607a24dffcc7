//! Offer and consideration items and their resolved forms.

use {
    alloy::{
        primitives::{Address, B256, U256, keccak256},
        sol,
        sol_types::SolType,
    },
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::sync::LazyLock,
};

/// The kind of asset an item refers to.
///
/// The criteria variants commit to a set of identifiers (a merkle root, or
/// zero for "any identifier") instead of a concrete one; they are resolved to
/// the matching concrete kind at fulfillment time.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, strum::IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum ItemType {
    #[default]
    Native,
    Erc20,
    Erc721,
    Erc1155,
    Erc721WithCriteria,
    Erc1155WithCriteria,
}

impl ItemType {
    pub fn is_criteria(self) -> bool {
        matches!(self, Self::Erc721WithCriteria | Self::Erc1155WithCriteria)
    }

    /// The concrete kind a criteria item resolves to. Concrete kinds map to
    /// themselves.
    pub fn resolved(self) -> Self {
        match self {
            Self::Erc721WithCriteria => Self::Erc721,
            Self::Erc1155WithCriteria => Self::Erc1155,
            other => other,
        }
    }

    /// Whether every unit of the item is distinct, i.e. amounts other than
    /// one are meaningless.
    pub fn is_non_fungible(self) -> bool {
        matches!(self, Self::Erc721 | Self::Erc721WithCriteria)
    }
}

impl From<ItemType> for u8 {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Native => 0,
            ItemType::Erc20 => 1,
            ItemType::Erc721 => 2,
            ItemType::Erc1155 => 3,
            ItemType::Erc721WithCriteria => 4,
            ItemType::Erc1155WithCriteria => 5,
        }
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown item type {0}")]
pub struct UnknownItemType(pub u8);

impl TryFrom<u8> for ItemType {
    type Error = UnknownItemType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Native,
            1 => Self::Erc20,
            2 => Self::Erc721,
            3 => Self::Erc1155,
            4 => Self::Erc721WithCriteria,
            5 => Self::Erc1155WithCriteria,
            other => return Err(UnknownItemType(other)),
        })
    }
}

pub const OFFER_ITEM_TYPE: &str = "OfferItem(uint8 itemType,address token,uint256 \
                                   identifierOrCriteria,uint256 startAmount,uint256 endAmount)";

pub const CONSIDERATION_ITEM_TYPE: &str = "ConsiderationItem(uint8 itemType,address \
                                           token,uint256 identifierOrCriteria,uint256 \
                                           startAmount,uint256 endAmount,address recipient)";

static OFFER_ITEM_TYPE_HASH: LazyLock<B256> =
    LazyLock::new(|| keccak256(OFFER_ITEM_TYPE.as_bytes()));

static CONSIDERATION_ITEM_TYPE_HASH: LazyLock<B256> =
    LazyLock::new(|| keccak256(CONSIDERATION_ITEM_TYPE.as_bytes()));

type OfferItemSol = sol! {
    tuple(
        bytes32, // OFFER_ITEM_TYPEHASH
        uint8,   // itemType
        address, // token
        uint256, // identifierOrCriteria
        uint256, // startAmount
        uint256, // endAmount
    )
};

type ConsiderationItemSol = sol! {
    tuple(
        bytes32, // CONSIDERATION_ITEM_TYPEHASH
        uint8,   // itemType
        address, // token
        uint256, // identifierOrCriteria
        uint256, // startAmount
        uint256, // endAmount
        address, // recipient
    )
};

/// An item the offerer gives up.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub item_type: ItemType,
    pub token: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub identifier_or_criteria: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub start_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub end_amount: U256,
}

impl OfferItem {
    /// Returns the value of hashStruct() over the item as defined by EIP-712.
    pub fn hash_struct(&self) -> B256 {
        keccak256(OfferItemSol::abi_encode_sequence(&(
            *OFFER_ITEM_TYPE_HASH,
            u8::from(self.item_type),
            self.token,
            self.identifier_or_criteria,
            self.start_amount,
            self.end_amount,
        )))
    }
}

/// An item the offerer expects to receive, possibly on behalf of somebody
/// else (the recipient).
#[serde_as]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    pub item_type: ItemType,
    pub token: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub identifier_or_criteria: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub start_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub end_amount: U256,
    pub recipient: Address,
}

impl ConsiderationItem {
    /// Returns the value of hashStruct() over the item as defined by EIP-712.
    pub fn hash_struct(&self) -> B256 {
        keccak256(ConsiderationItemSol::abi_encode_sequence(&(
            *CONSIDERATION_ITEM_TYPE_HASH,
            u8::from(self.item_type),
            self.token,
            self.identifier_or_criteria,
            self.start_amount,
            self.end_amount,
            self.recipient,
        )))
    }
}

/// An offer item with its amount resolved for a particular fulfillment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpentItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier: U256,
    pub amount: U256,
}

/// A consideration item with its amount resolved for a particular
/// fulfillment. Also describes the asset moved by an execution.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier: U256,
    pub amount: U256,
    pub recipient: Address,
}

impl ReceivedItem {
    pub fn spent(&self) -> SpentItem {
        SpentItem {
            item_type: self.item_type,
            token: self.token,
            identifier: self.identifier,
            amount: self.amount,
        }
    }
}

/// Hash of an array of structs as defined by EIP-712: the keccak of the
/// concatenated struct hashes.
pub(crate) fn hash_array(hashes: impl IntoIterator<Item = B256>) -> B256 {
    let encoded = hashes
        .into_iter()
        .flat_map(|hash| hash.0)
        .collect::<Vec<_>>();
    keccak256(encoded)
}
