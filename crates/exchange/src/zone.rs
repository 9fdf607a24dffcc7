//! Approval of restricted orders by their zone.

use {
    crate::{
        Error,
        infra::{Revert, Zones},
    },
    alloy::{
        primitives::{Address, B256, FixedBytes},
        sol_types::SolCall,
    },
    model::{
        abi::Zone,
        fulfillment::CriteriaResolver,
        order::{AdvancedOrder, OrderParameters},
    },
};

pub const IS_VALID_ORDER_MAGIC_VALUE: FixedBytes<4> =
    FixedBytes(Zone::isValidOrderCall::SELECTOR);

pub const IS_VALID_ORDER_INCLUDING_EXTRA_DATA_MAGIC_VALUE: FixedBytes<4> =
    FixedBytes(Zone::isValidOrderIncludingExtraDataCall::SELECTOR);

/// Asks the zone of a restricted order to approve it. Open orders and calls
/// made by the zone itself need no approval.
pub fn check(
    zones: &impl Zones,
    caller: Address,
    order_hash: B256,
    parameters: &OrderParameters,
) -> Result<(), Error> {
    if !needs_approval(caller, parameters) {
        return Ok(());
    }
    let result = zones.is_valid_order(
        parameters.zone,
        order_hash,
        caller,
        parameters.offerer,
        parameters.zone_hash,
    );
    expect_magic(result, IS_VALID_ORDER_MAGIC_VALUE, parameters.zone, order_hash)
}

/// Like [`check`], but hands the whole order to the zone when the fulfiller
/// supplied extra data or criteria resolvers.
pub fn check_advanced(
    zones: &impl Zones,
    caller: Address,
    order_hash: B256,
    order: &AdvancedOrder,
    prior_order_hashes: &[B256],
    criteria_resolvers: &[CriteriaResolver],
) -> Result<(), Error> {
    if order.extra_data.is_empty() && criteria_resolvers.is_empty() {
        return check(zones, caller, order_hash, &order.parameters);
    }
    if !needs_approval(caller, &order.parameters) {
        return Ok(());
    }
    let result = zones.is_valid_order_including_extra_data(
        order.parameters.zone,
        order_hash,
        caller,
        order,
        prior_order_hashes,
        criteria_resolvers,
    );
    expect_magic(
        result,
        IS_VALID_ORDER_INCLUDING_EXTRA_DATA_MAGIC_VALUE,
        order.parameters.zone,
        order_hash,
    )
}

fn needs_approval(caller: Address, parameters: &OrderParameters) -> bool {
    parameters.order_type.is_restricted() && caller != parameters.zone
}

fn expect_magic(
    result: Result<FixedBytes<4>, Revert>,
    magic: FixedBytes<4>,
    zone: Address,
    order_hash: B256,
) -> Result<(), Error> {
    match result {
        Ok(value) if value == magic => Ok(()),
        other => {
            tracing::debug!(?zone, ?order_hash, ?other, "zone rejected order");
            Err(Error::InvalidRestrictedOrder(order_hash))
        }
    }
}
