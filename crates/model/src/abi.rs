//! Solidity ABI of the exchange and of the contracts it calls back into,
//! together with conversions to and from the order model.

use {
    crate::{
        basic,
        fulfillment,
        item::{self, UnknownItemType},
        order::{self, UnknownOrderType},
    },
    alloy::{
        primitives::{U256, aliases::U120},
        sol,
    },
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct OfferItem {
        uint8 itemType;
        address token;
        uint256 identifierOrCriteria;
        uint256 startAmount;
        uint256 endAmount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ConsiderationItem {
        uint8 itemType;
        address token;
        uint256 identifierOrCriteria;
        uint256 startAmount;
        uint256 endAmount;
        address recipient;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct SpentItem {
        uint8 itemType;
        address token;
        uint256 identifier;
        uint256 amount;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct ReceivedItem {
        uint8 itemType;
        address token;
        uint256 identifier;
        uint256 amount;
        address recipient;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct OrderComponents {
        address offerer;
        address zone;
        OfferItem[] offer;
        ConsiderationItem[] consideration;
        uint8 orderType;
        uint256 startTime;
        uint256 endTime;
        bytes32 zoneHash;
        uint256 salt;
        bytes32 conduitKey;
        uint256 counter;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct OrderParameters {
        address offerer;
        address zone;
        OfferItem[] offer;
        ConsiderationItem[] consideration;
        uint8 orderType;
        uint256 startTime;
        uint256 endTime;
        bytes32 zoneHash;
        uint256 salt;
        bytes32 conduitKey;
        uint256 totalOriginalConsiderationItems;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        OrderParameters parameters;
        bytes signature;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct AdvancedOrder {
        OrderParameters parameters;
        uint120 numerator;
        uint120 denominator;
        bytes signature;
        bytes extraData;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct AdditionalRecipient {
        uint256 amount;
        address recipient;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct BasicOrderParameters {
        address considerationToken;
        uint256 considerationIdentifier;
        uint256 considerationAmount;
        address offerer;
        address zone;
        address offerToken;
        uint256 offerIdentifier;
        uint256 offerAmount;
        uint8 basicOrderType;
        uint256 startTime;
        uint256 endTime;
        bytes32 zoneHash;
        uint256 salt;
        bytes32 offererConduitKey;
        bytes32 fulfillerConduitKey;
        uint256 totalOriginalAdditionalRecipients;
        AdditionalRecipient[] additionalRecipients;
        bytes signature;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct CriteriaResolver {
        uint256 orderIndex;
        uint8 side;
        uint256 index;
        uint256 identifier;
        bytes32[] criteriaProof;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct FulfillmentComponent {
        uint256 orderIndex;
        uint256 itemIndex;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Fulfillment {
        FulfillmentComponent[] offerComponents;
        FulfillmentComponent[] considerationComponents;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Execution {
        ReceivedItem item;
        address offerer;
        bytes32 conduitKey;
    }

    interface Exchange {
        function fulfillBasicOrder(BasicOrderParameters parameters) external payable returns (bool fulfilled);
        function fulfillOrder(Order order, bytes32 fulfillerConduitKey) external payable returns (bool fulfilled);
        function fulfillAdvancedOrder(AdvancedOrder advancedOrder, CriteriaResolver[] criteriaResolvers, bytes32 fulfillerConduitKey, address recipient) external payable returns (bool fulfilled);
        function fulfillAvailableOrders(Order[] orders, FulfillmentComponent[][] offerFulfillments, FulfillmentComponent[][] considerationFulfillments, bytes32 fulfillerConduitKey, uint256 maximumFulfilled) external payable returns (bool[] availableOrders, Execution[] executions);
        function fulfillAvailableAdvancedOrders(AdvancedOrder[] advancedOrders, CriteriaResolver[] criteriaResolvers, FulfillmentComponent[][] offerFulfillments, FulfillmentComponent[][] considerationFulfillments, bytes32 fulfillerConduitKey, address recipient, uint256 maximumFulfilled) external payable returns (bool[] availableOrders, Execution[] executions);
        function matchOrders(Order[] orders, Fulfillment[] fulfillments) external payable returns (Execution[] executions);
        function matchAdvancedOrders(AdvancedOrder[] advancedOrders, CriteriaResolver[] criteriaResolvers, Fulfillment[] fulfillments) external payable returns (Execution[] executions);
        function cancel(OrderComponents[] orders) external returns (bool cancelled);
        function validate(Order[] orders) external returns (bool validated);
        function incrementCounter() external returns (uint256 newCounter);
        function getOrderHash(OrderComponents order) external view returns (bytes32 orderHash);
        function getOrderStatus(bytes32 orderHash) external view returns (bool isValidated, bool isCancelled, uint256 totalFilled, uint256 totalSize);
        function getCounter(address offerer) external view returns (uint256 counter);
        function information() external view returns (string version, bytes32 domainSeparator, address conduitController);
        function name() external view returns (string contractName);
    }

    /// Hooks of the zone of a restricted order. Each returns its own selector
    /// to approve the order.
    interface Zone {
        function isValidOrder(bytes32 orderHash, address caller, address offerer, bytes32 zoneHash) external view returns (bytes4 validOrderMagicValue);
        function isValidOrderIncludingExtraData(bytes32 orderHash, address caller, AdvancedOrder order, bytes32[] priorOrderHashes, CriteriaResolver[] criteriaResolvers) external view returns (bytes4 validOrderMagicValue);
    }

    /// EIP-1271 signature validation. Returns its own selector for valid
    /// signatures.
    interface ContractSigner {
        function isValidSignature(bytes32 hash, bytes signature) external view returns (bytes4 magicValue);
    }
}

/// Error converting decoded ABI values into the order model.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum ConversionError {
    #[error(transparent)]
    ItemType(#[from] UnknownItemType),
    #[error(transparent)]
    OrderType(#[from] UnknownOrderType),
    #[error("unknown side {0}")]
    Side(u8),
}

fn index(value: U256) -> usize {
    // Anything this large is out of range for every list it indexes.
    value.saturating_to()
}

impl From<&item::OfferItem> for OfferItem {
    fn from(item: &item::OfferItem) -> Self {
        Self {
            itemType: item.item_type.into(),
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
        }
    }
}

impl TryFrom<OfferItem> for item::OfferItem {
    type Error = ConversionError;

    fn try_from(item: OfferItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item_type: item.itemType.try_into()?,
            token: item.token,
            identifier_or_criteria: item.identifierOrCriteria,
            start_amount: item.startAmount,
            end_amount: item.endAmount,
        })
    }
}

impl From<&item::ConsiderationItem> for ConsiderationItem {
    fn from(item: &item::ConsiderationItem) -> Self {
        Self {
            itemType: item.item_type.into(),
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
            recipient: item.recipient,
        }
    }
}

impl TryFrom<ConsiderationItem> for item::ConsiderationItem {
    type Error = ConversionError;

    fn try_from(item: ConsiderationItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item_type: item.itemType.try_into()?,
            token: item.token,
            identifier_or_criteria: item.identifierOrCriteria,
            start_amount: item.startAmount,
            end_amount: item.endAmount,
            recipient: item.recipient,
        })
    }
}

impl From<&item::SpentItem> for SpentItem {
    fn from(item: &item::SpentItem) -> Self {
        Self {
            itemType: item.item_type.into(),
            token: item.token,
            identifier: item.identifier,
            amount: item.amount,
        }
    }
}

impl From<&item::ReceivedItem> for ReceivedItem {
    fn from(item: &item::ReceivedItem) -> Self {
        Self {
            itemType: item.item_type.into(),
            token: item.token,
            identifier: item.identifier,
            amount: item.amount,
            recipient: item.recipient,
        }
    }
}

impl TryFrom<ReceivedItem> for item::ReceivedItem {
    type Error = ConversionError;

    fn try_from(item: ReceivedItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item_type: item.itemType.try_into()?,
            token: item.token,
            identifier: item.identifier,
            amount: item.amount,
            recipient: item.recipient,
        })
    }
}

fn offer_items(items: Vec<OfferItem>) -> Result<Vec<item::OfferItem>, ConversionError> {
    items.into_iter().map(TryInto::try_into).collect()
}

fn consideration_items(
    items: Vec<ConsiderationItem>,
) -> Result<Vec<item::ConsiderationItem>, ConversionError> {
    items.into_iter().map(TryInto::try_into).collect()
}

impl From<&order::OrderComponents> for OrderComponents {
    fn from(order: &order::OrderComponents) -> Self {
        Self {
            offerer: order.offerer,
            zone: order.zone,
            offer: order.offer.iter().map(Into::into).collect(),
            consideration: order.consideration.iter().map(Into::into).collect(),
            orderType: order.order_type.into(),
            startTime: order.start_time,
            endTime: order.end_time,
            zoneHash: order.zone_hash,
            salt: order.salt,
            conduitKey: order.conduit_key,
            counter: order.counter,
        }
    }
}

impl TryFrom<OrderComponents> for order::OrderComponents {
    type Error = ConversionError;

    fn try_from(order: OrderComponents) -> Result<Self, Self::Error> {
        Ok(Self {
            offerer: order.offerer,
            zone: order.zone,
            offer: offer_items(order.offer)?,
            consideration: consideration_items(order.consideration)?,
            order_type: order.orderType.try_into()?,
            start_time: order.startTime,
            end_time: order.endTime,
            zone_hash: order.zoneHash,
            salt: order.salt,
            conduit_key: order.conduitKey,
            counter: order.counter,
        })
    }
}

impl From<&order::OrderParameters> for OrderParameters {
    fn from(order: &order::OrderParameters) -> Self {
        Self {
            offerer: order.offerer,
            zone: order.zone,
            offer: order.offer.iter().map(Into::into).collect(),
            consideration: order.consideration.iter().map(Into::into).collect(),
            orderType: order.order_type.into(),
            startTime: order.start_time,
            endTime: order.end_time,
            zoneHash: order.zone_hash,
            salt: order.salt,
            conduitKey: order.conduit_key,
            totalOriginalConsiderationItems: U256::from(order.total_original_consideration_items),
        }
    }
}

impl TryFrom<OrderParameters> for order::OrderParameters {
    type Error = ConversionError;

    fn try_from(order: OrderParameters) -> Result<Self, Self::Error> {
        Ok(Self {
            offerer: order.offerer,
            zone: order.zone,
            offer: offer_items(order.offer)?,
            consideration: consideration_items(order.consideration)?,
            order_type: order.orderType.try_into()?,
            start_time: order.startTime,
            end_time: order.endTime,
            zone_hash: order.zoneHash,
            salt: order.salt,
            conduit_key: order.conduitKey,
            total_original_consideration_items: index(order.totalOriginalConsiderationItems),
        })
    }
}

impl From<&order::Order> for Order {
    fn from(order: &order::Order) -> Self {
        Self {
            parameters: (&order.parameters).into(),
            signature: order.signature.clone(),
        }
    }
}

impl TryFrom<Order> for order::Order {
    type Error = ConversionError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        Ok(Self {
            parameters: order.parameters.try_into()?,
            signature: order.signature,
        })
    }
}

/// Fractions wider than 120 bits cannot be expressed in calldata and
/// saturate.
impl From<&order::AdvancedOrder> for AdvancedOrder {
    fn from(order: &order::AdvancedOrder) -> Self {
        Self {
            parameters: (&order.parameters).into(),
            numerator: U120::saturating_from(order.numerator),
            denominator: U120::saturating_from(order.denominator),
            signature: order.signature.clone(),
            extraData: order.extra_data.clone(),
        }
    }
}

impl TryFrom<AdvancedOrder> for order::AdvancedOrder {
    type Error = ConversionError;

    fn try_from(order: AdvancedOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            parameters: order.parameters.try_into()?,
            numerator: order.numerator.to(),
            denominator: order.denominator.to(),
            signature: order.signature,
            extra_data: order.extraData,
        })
    }
}

impl From<&basic::BasicOrderParameters> for BasicOrderParameters {
    fn from(order: &basic::BasicOrderParameters) -> Self {
        Self {
            considerationToken: order.consideration_token,
            considerationIdentifier: order.consideration_identifier,
            considerationAmount: order.consideration_amount,
            offerer: order.offerer,
            zone: order.zone,
            offerToken: order.offer_token,
            offerIdentifier: order.offer_identifier,
            offerAmount: order.offer_amount,
            basicOrderType: order.basic_order_type,
            startTime: order.start_time,
            endTime: order.end_time,
            zoneHash: order.zone_hash,
            salt: order.salt,
            offererConduitKey: order.offerer_conduit_key,
            fulfillerConduitKey: order.fulfiller_conduit_key,
            totalOriginalAdditionalRecipients: U256::from(
                order.total_original_additional_recipients,
            ),
            additionalRecipients: order
                .additional_recipients
                .iter()
                .map(|tip| AdditionalRecipient {
                    amount: tip.amount,
                    recipient: tip.recipient,
                })
                .collect(),
            signature: order.signature.clone(),
        }
    }
}

impl From<BasicOrderParameters> for basic::BasicOrderParameters {
    fn from(order: BasicOrderParameters) -> Self {
        Self {
            consideration_token: order.considerationToken,
            consideration_identifier: order.considerationIdentifier,
            consideration_amount: order.considerationAmount,
            offerer: order.offerer,
            zone: order.zone,
            offer_token: order.offerToken,
            offer_identifier: order.offerIdentifier,
            offer_amount: order.offerAmount,
            basic_order_type: order.basicOrderType,
            start_time: order.startTime,
            end_time: order.endTime,
            zone_hash: order.zoneHash,
            salt: order.salt,
            offerer_conduit_key: order.offererConduitKey,
            fulfiller_conduit_key: order.fulfillerConduitKey,
            total_original_additional_recipients: index(order.totalOriginalAdditionalRecipients),
            additional_recipients: order
                .additionalRecipients
                .into_iter()
                .map(|tip| basic::AdditionalRecipient {
                    amount: tip.amount,
                    recipient: tip.recipient,
                })
                .collect(),
            signature: order.signature,
        }
    }
}

impl From<&fulfillment::CriteriaResolver> for CriteriaResolver {
    fn from(resolver: &fulfillment::CriteriaResolver) -> Self {
        Self {
            orderIndex: U256::from(resolver.order_index),
            side: resolver.side.into(),
            index: U256::from(resolver.index),
            identifier: resolver.identifier,
            criteriaProof: resolver.criteria_proof.clone(),
        }
    }
}

impl TryFrom<CriteriaResolver> for fulfillment::CriteriaResolver {
    type Error = ConversionError;

    fn try_from(resolver: CriteriaResolver) -> Result<Self, Self::Error> {
        Ok(Self {
            order_index: index(resolver.orderIndex),
            side: resolver.side.try_into().map_err(ConversionError::Side)?,
            index: index(resolver.index),
            identifier: resolver.identifier,
            criteria_proof: resolver.criteriaProof,
        })
    }
}

impl From<&fulfillment::FulfillmentComponent> for FulfillmentComponent {
    fn from(component: &fulfillment::FulfillmentComponent) -> Self {
        Self {
            orderIndex: U256::from(component.order_index),
            itemIndex: U256::from(component.item_index),
        }
    }
}

impl From<FulfillmentComponent> for fulfillment::FulfillmentComponent {
    fn from(component: FulfillmentComponent) -> Self {
        Self {
            order_index: index(component.orderIndex),
            item_index: index(component.itemIndex),
        }
    }
}

impl From<&fulfillment::Fulfillment> for Fulfillment {
    fn from(fulfillment: &fulfillment::Fulfillment) -> Self {
        Self {
            offerComponents: fulfillment.offer_components.iter().map(Into::into).collect(),
            considerationComponents: fulfillment
                .consideration_components
                .iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<Fulfillment> for fulfillment::Fulfillment {
    fn from(fulfillment: Fulfillment) -> Self {
        Self {
            offer_components: fulfillment
                .offerComponents
                .into_iter()
                .map(Into::into)
                .collect(),
            consideration_components: fulfillment
                .considerationComponents
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

impl From<&fulfillment::Execution> for Execution {
    fn from(execution: &fulfillment::Execution) -> Self {
        Self {
            item: (&execution.item).into(),
            offerer: execution.offerer,
            conduitKey: execution.conduit_key,
        }
    }
}

impl TryFrom<Execution> for fulfillment::Execution {
    type Error = ConversionError;

    fn try_from(execution: Execution) -> Result<Self, Self::Error> {
        Ok(Self {
            item: execution.item.try_into()?,
            offerer: execution.offerer,
            conduit_key: execution.conduitKey,
        })
    }
}
