use {
    alloy::primitives::{Address, B256, U256},
    model::item::{ReceivedItem, SpentItem},
    serde::Serialize,
};

/// Observable outcome of a successful call. Events of failed calls are
/// discarded together with their other effects.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    OrderFulfilled {
        order_hash: B256,
        offerer: Address,
        zone: Address,
        /// The fulfiller's recipient, or zero for matched orders.
        recipient: Address,
        offer: Vec<SpentItem>,
        consideration: Vec<ReceivedItem>,
    },
    #[serde(rename_all = "camelCase")]
    OrderValidated {
        order_hash: B256,
        offerer: Address,
        zone: Address,
    },
    #[serde(rename_all = "camelCase")]
    OrderCancelled {
        order_hash: B256,
        offerer: Address,
        zone: Address,
    },
    #[serde(rename_all = "camelCase")]
    CounterIncremented { new_counter: U256, offerer: Address },
}
