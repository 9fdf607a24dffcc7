use {
    crate::{infra::TransferError, status},
    alloy::primitives::{Address, B256, FixedBytes, U256},
    model::fulfillment::Side,
};

/// Reasons a call into the exchange is rejected. Every rejection undoes all
/// effects of the call.
#[derive(Debug, thiserror::Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
    #[error("signature is malformed or does not recover a signer")]
    InvalidSignature,
    #[error("signature v value {0} is not 27 or 28")]
    BadSignatureV(u8),
    #[error("signature was produced by {0} instead of the offerer")]
    InvalidSigner(Address),
    #[error("contract offerer rejected the signature")]
    BadContractSignature,

    #[error("order is outside of its validity window")]
    InvalidTime,
    #[error("order {0} is already filled")]
    OrderAlreadyFilled(B256),
    #[error("order {0} is partially filled")]
    OrderPartiallyFilled(B256),
    #[error("order {0} is cancelled")]
    OrderIsCancelled(B256),

    #[error("fulfillment component is out of range or does not match its group")]
    InvalidFulfillmentComponentData,
    #[error("offer and consideration components of a fulfillment refer to different assets")]
    MismatchedFulfillmentOfferAndConsiderationComponents,
    #[error("fulfillment has no {0:?} components")]
    MissingFulfillmentComponentOnAggregation(Side),
    #[error(
        "consideration item {consideration_index} of order {order_index} is short by {shortfall}"
    )]
    ConsiderationNotMet {
        order_index: usize,
        consideration_index: usize,
        shortfall: U256,
    },
    #[error("item has no amount")]
    MissingItemAmount,
    #[error("none of the orders are available")]
    NoSpecifiedOrdersAvailable,

    #[error("fill fraction must satisfy 0 < numerator <= denominator")]
    BadFraction,
    #[error("order does not allow partial fills")]
    PartialFillsNotEnabledForOrder,
    #[error("amount cannot be scaled by the fill fraction without remainder")]
    InexactFraction,
    #[error("arithmetic overflow")]
    Overflow,

    #[error("criteria resolver refers to an order that does not exist")]
    OrderCriteriaResolverOutOfRange,
    #[error("criteria resolver refers to an offer item that does not exist")]
    OfferCriteriaResolverOutOfRange,
    #[error("criteria resolver refers to a consideration item that does not exist")]
    ConsiderationCriteriaResolverOutOfRange,
    #[error("criteria resolver refers to an item without criteria")]
    CriteriaNotEnabledForItem,
    #[error("identifier is not part of the item criteria")]
    InvalidProof,
    #[error("offer item with criteria was not resolved")]
    UnresolvedOfferCriteria,
    #[error("consideration item with criteria was not resolved")]
    UnresolvedConsiderationCriteria,

    #[error("zone rejected order {0}")]
    InvalidRestrictedOrder(B256),

    #[error("conduit channel {0} is not open")]
    ConduitChannelClosed(B256),
    #[error("native transfer of {amount} to {to} failed")]
    NativeTransferFailed { to: Address, amount: U256 },
    #[error(
        "transfer {index} of {amount} {token}/{identifier} from {from} to {to} failed: {source}"
    )]
    TransferFailed {
        index: usize,
        token: Address,
        from: Address,
        to: Address,
        identifier: U256,
        amount: U256,
        source: TransferError,
    },
    #[error("ERC-721 transfers must move exactly one token, got {0}")]
    InvalidErc721TransferAmount(U256),

    #[error("native value does not cover the native items")]
    InsufficientNativeSupplied,
    #[error("native value supplied to a call that cannot use it")]
    UnexpectedNativeValue,

    #[error("invalid basic order type {0}")]
    InvalidBasicOrderType(u8),
    #[error("item parameters must be zero for this kind of item")]
    UnusedItemParameters,
    #[error("fewer consideration items than the order was signed with")]
    MissingOriginalConsiderationItems,
    #[error("only the offerer may cancel an order")]
    InvalidCanceller,
    #[error("native items can only be offered when matching orders")]
    InvalidNativeOfferItem,

    #[error("unknown function selector {0}")]
    UnknownSelector(FixedBytes<4>),
    #[error("malformed calldata: {0}")]
    Decode(String),
}

impl Error {
    /// Label for metrics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<status::Error> for Error {
    fn from(err: status::Error) -> Self {
        match err {
            status::Error::Cancelled(hash) => Self::OrderIsCancelled(hash),
            status::Error::Filled(hash) => Self::OrderAlreadyFilled(hash),
            status::Error::BadFraction => Self::BadFraction,
            status::Error::Overflow => Self::Overflow,
        }
    }
}
