//! Matching orders against each other.
//!
//! Every fulfillment pairs a group of offer items with a group of
//! consideration items of the same asset. The smaller side is moved in full;
//! what is left of the larger side stays on its first item and can be used by
//! later fulfillments.

use {
    crate::{
        Call,
        Error,
        Exchange,
        conduit::{self, Budget},
        fulfillment::{self, Admission, Aggregate, Prepared},
        infra::Environment,
        metrics::Metrics,
    },
    alloy::primitives::{Address, U256},
    model::{
        fulfillment::{CriteriaResolver, Execution, Fulfillment, Side},
        item::ReceivedItem,
        order::{AdvancedOrder, Order},
    },
};

impl Exchange {
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn match_orders(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: Vec<Order>,
        fulfillments: &[Fulfillment],
    ) -> Result<Vec<Execution>, Error> {
        let orders = orders.into_iter().map(AdvancedOrder::from).collect::<Vec<_>>();
        self.match_advanced_orders(env, call, &orders, &[], fulfillments)
    }

    /// Fills every order in `orders` by routing offer items of some orders to
    /// the recipients of consideration items of others. Fails unless every
    /// consideration item ends up paid in full.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn match_advanced_orders(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: &[AdvancedOrder],
        criteria_resolvers: &[CriteriaResolver],
        fulfillments: &[Fulfillment],
    ) -> Result<Vec<Execution>, Error> {
        self.atomically(env, "match", |exchange, env| {
            let mut prepared = exchange.prepare(
                env,
                call.caller,
                orders,
                criteria_resolvers,
                Admission::matching(),
            )?;
            let events = prepared
                .iter()
                .map(|order| order.fulfilled(Address::ZERO))
                .collect::<Vec<_>>();

            let mut executions = Vec::with_capacity(fulfillments.len());
            for fulfillment in fulfillments {
                executions.push(apply(&mut prepared, fulfillment)?);
            }
            fulfillment::check_consideration_met(&prepared)?;
            let executions = executions
                .into_iter()
                .filter(|execution| execution.item.recipient != execution.offerer)
                .collect::<Vec<_>>();

            let mut budget = Budget::new(call.value);
            conduit::execute(
                env,
                &exchange.conduits,
                exchange.address(),
                &executions,
                &mut budget,
            )?;
            budget.refund(env, call.caller)?;

            Metrics::fulfilled("match", events.len());
            tracing::debug!(
                orders = events.len(),
                executions = executions.len(),
                "matched orders"
            );
            for event in events {
                exchange.emit(event);
            }
            Ok(executions)
        })
    }
}

/// Turns one fulfillment into the execution moving the matched amount.
fn apply(orders: &mut [Prepared], fulfillment: &Fulfillment) -> Result<Execution, Error> {
    if fulfillment.offer_components.is_empty() {
        return Err(Error::MissingFulfillmentComponentOnAggregation(Side::Offer));
    }
    if fulfillment.consideration_components.is_empty() {
        return Err(Error::MissingFulfillmentComponentOnAggregation(
            Side::Consideration,
        ));
    }
    // Every order of a match is available, so both sides are present.
    let offer = fulfillment::aggregate(orders, Side::Offer, &fulfillment.offer_components)?
        .ok_or(Error::InvalidFulfillmentComponentData)?;
    let consideration = fulfillment::aggregate(
        orders,
        Side::Consideration,
        &fulfillment.consideration_components,
    )?
    .ok_or(Error::InvalidFulfillmentComponentData)?;

    if offer.item.item_type != consideration.item.item_type
        || offer.item.token != consideration.item.token
        || offer.item.identifier != consideration.item.identifier
    {
        return Err(Error::MismatchedFulfillmentOfferAndConsiderationComponents);
    }
    if offer.item.amount.is_zero() || consideration.item.amount.is_zero() {
        return Err(Error::MissingItemAmount);
    }

    let amount = offer.item.amount.min(consideration.item.amount);
    if offer.item.amount > amount {
        leave(orders, Side::Offer, &offer, offer.item.amount - amount);
    } else if consideration.item.amount > amount {
        leave(
            orders,
            Side::Consideration,
            &consideration,
            consideration.item.amount - amount,
        );
    }

    Ok(Execution {
        item: ReceivedItem {
            amount,
            ..consideration.item
        },
        offerer: offer.offerer,
        conduit_key: offer.conduit_key,
    })
}

/// Puts an unmatched remainder back onto the first item of a group.
fn leave(orders: &mut [Prepared], side: Side, aggregate: &Aggregate, remainder: U256) {
    let order = &mut orders[aggregate.first.order_index];
    let index = aggregate.first.item_index;
    match side {
        Side::Offer => order.offer[index].amount = remainder,
        Side::Consideration => order.consideration[index].amount = remainder,
    }
}
