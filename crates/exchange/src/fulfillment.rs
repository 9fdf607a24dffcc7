//! Fulfillment of general orders by the caller: one order at a time, or as
//! many of a list as are still available.

use {
    crate::{
        Call,
        Error,
        Exchange,
        amount,
        conduit::{self, Budget},
        criteria,
        events::Event,
        infra::Environment,
        metrics::Metrics,
        zone,
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        fulfillment::{CriteriaResolver, Execution, FulfillmentComponent, Side},
        item::{ItemType, ReceivedItem, SpentItem},
        order::{AdvancedOrder, Order, OrderParameters},
    },
};

/// An order admitted into a call, with its items resolved.
#[derive(Clone, Debug, Default)]
pub(crate) struct Prepared {
    pub order_hash: B256,
    pub parameters: OrderParameters,
    /// Fraction of the whole order filled by this call. `None` for orders that
    /// were skipped as unavailable.
    pub fraction: Option<(u128, u128)>,
    pub offer: Vec<SpentItem>,
    pub consideration: Vec<ReceivedItem>,
}

impl Prepared {
    pub fn is_available(&self) -> bool {
        self.fraction.is_some()
    }

    /// Scales every item by the fill fraction and locates its amount at
    /// `now`. Offer amounts round down and consideration amounts round up.
    fn resolve_amounts(&mut self, now: u64) -> Result<(), Error> {
        let Some(fraction) = self.fraction else {
            return Ok(());
        };
        let window = (self.parameters.start_time, self.parameters.end_time);
        let now = U256::from(now);
        self.offer = self
            .parameters
            .offer
            .iter()
            .map(|item| {
                Ok(SpentItem {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier_or_criteria,
                    amount: amount::current_amount(
                        item.start_amount,
                        item.end_amount,
                        fraction,
                        window,
                        now,
                        false,
                    )?,
                })
            })
            .collect::<Result<_, Error>>()?;
        self.consideration = self
            .parameters
            .consideration
            .iter()
            .map(|item| {
                Ok(ReceivedItem {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier_or_criteria,
                    amount: amount::current_amount(
                        item.start_amount,
                        item.end_amount,
                        fraction,
                        window,
                        now,
                        true,
                    )?,
                    recipient: item.recipient,
                })
            })
            .collect::<Result<_, Error>>()?;
        Ok(())
    }

    pub fn fulfilled(&self, recipient: Address) -> Event {
        Event::OrderFulfilled {
            order_hash: self.order_hash,
            offerer: self.parameters.offerer,
            zone: self.parameters.zone,
            recipient,
            offer: self.offer.clone(),
            consideration: self.consideration.clone(),
        }
    }
}

/// How orders that cannot be filled are treated.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Admission {
    /// Reject the call instead of skipping unavailable orders.
    pub revert_on_unavailable: bool,
    /// Orders beyond this many available ones are skipped.
    pub maximum_fulfilled: usize,
    /// Native offer items can only be spent when matching orders.
    pub native_offer_items: bool,
}

impl Admission {
    pub fn single() -> Self {
        Self {
            revert_on_unavailable: true,
            maximum_fulfilled: 1,
            native_offer_items: false,
        }
    }

    pub fn matching() -> Self {
        Self {
            revert_on_unavailable: true,
            maximum_fulfilled: usize::MAX,
            native_offer_items: true,
        }
    }

    pub fn available(maximum_fulfilled: usize) -> Self {
        Self {
            revert_on_unavailable: false,
            maximum_fulfilled,
            native_offer_items: false,
        }
    }
}

impl Exchange {
    /// Fills an order completely, paying its consideration from the caller.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn fulfill_order(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        order: Order,
        fulfiller_conduit_key: B256,
    ) -> Result<bool, Error> {
        self.atomically(env, "order", |exchange, env| {
            exchange.fulfill_single(
                env,
                call,
                &AdvancedOrder::from(order),
                &[],
                fulfiller_conduit_key,
                Address::ZERO,
            )?;
            Metrics::fulfilled("order", 1);
            Ok(true)
        })
    }

    /// Fills the requested fraction of an order, or whatever is left of it,
    /// sending the offered items to `recipient` (the caller if zero).
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn fulfill_advanced_order(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        order: &AdvancedOrder,
        criteria_resolvers: &[CriteriaResolver],
        fulfiller_conduit_key: B256,
        recipient: Address,
    ) -> Result<bool, Error> {
        self.atomically(env, "advanced_order", |exchange, env| {
            exchange.fulfill_single(
                env,
                call,
                order,
                criteria_resolvers,
                fulfiller_conduit_key,
                recipient,
            )?;
            Metrics::fulfilled("advanced_order", 1);
            Ok(true)
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn fulfill_available_orders(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: Vec<Order>,
        offer_fulfillments: &[Vec<FulfillmentComponent>],
        consideration_fulfillments: &[Vec<FulfillmentComponent>],
        fulfiller_conduit_key: B256,
        maximum_fulfilled: usize,
    ) -> Result<(Vec<bool>, Vec<Execution>), Error> {
        let orders = orders.into_iter().map(AdvancedOrder::from).collect::<Vec<_>>();
        self.fulfill_available_advanced_orders(
            env,
            call,
            &orders,
            &[],
            offer_fulfillments,
            consideration_fulfillments,
            fulfiller_conduit_key,
            Address::ZERO,
            maximum_fulfilled,
        )
    }

    /// Fills as many of `orders` as are available, up to `maximum_fulfilled`.
    ///
    /// Offer items are aggregated per group and sent to `recipient` (the
    /// caller if zero); consideration items are aggregated per group and paid
    /// by the caller. Returns which orders were filled and the transfers that
    /// were made.
    #[allow(clippy::too_many_arguments)]
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn fulfill_available_advanced_orders(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: &[AdvancedOrder],
        criteria_resolvers: &[CriteriaResolver],
        offer_fulfillments: &[Vec<FulfillmentComponent>],
        consideration_fulfillments: &[Vec<FulfillmentComponent>],
        fulfiller_conduit_key: B256,
        recipient: Address,
        maximum_fulfilled: usize,
    ) -> Result<(Vec<bool>, Vec<Execution>), Error> {
        self.atomically(env, "available_orders", |exchange, env| {
            let recipient = recipient_or_caller(recipient, call.caller);
            let mut prepared = exchange.prepare(
                env,
                call.caller,
                orders,
                criteria_resolvers,
                Admission::available(maximum_fulfilled),
            )?;
            let available = prepared.iter().map(Prepared::is_available).collect::<Vec<_>>();
            if !available.contains(&true) {
                return Err(Error::NoSpecifiedOrdersAvailable);
            }

            let events = prepared
                .iter()
                .filter(|order| order.is_available())
                .map(|order| order.fulfilled(recipient))
                .collect::<Vec<_>>();

            let mut executions = Vec::new();
            for group in offer_fulfillments {
                if let Some(total) = aggregate(&mut prepared, Side::Offer, group)? {
                    executions.push(Execution {
                        item: ReceivedItem {
                            recipient,
                            ..total.item
                        },
                        offerer: total.offerer,
                        conduit_key: total.conduit_key,
                    });
                }
            }
            for group in consideration_fulfillments {
                if let Some(total) = aggregate(&mut prepared, Side::Consideration, group)? {
                    executions.push(Execution {
                        item: total.item,
                        offerer: call.caller,
                        conduit_key: fulfiller_conduit_key,
                    });
                }
            }
            check_consideration_met(&prepared)?;
            let executions = executions
                .into_iter()
                .filter(|execution| {
                    !execution.item.amount.is_zero()
                        && execution.item.recipient != execution.offerer
                })
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

            Metrics::fulfilled("available_orders", events.len());
            tracing::debug!(
                filled = events.len(),
                executions = executions.len(),
                "fulfilled available orders"
            );
            for event in events {
                exchange.emit(event);
            }
            Ok((available, executions))
        })
    }

    fn fulfill_single(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        order: &AdvancedOrder,
        criteria_resolvers: &[CriteriaResolver],
        fulfiller_conduit_key: B256,
        recipient: Address,
    ) -> Result<(), Error> {
        let recipient = recipient_or_caller(recipient, call.caller);
        let prepared = self.prepare(
            env,
            call.caller,
            std::slice::from_ref(order),
            criteria_resolvers,
            Admission::single(),
        )?;
        let Some(order) = prepared.first() else {
            return Err(Error::NoSpecifiedOrdersAvailable);
        };

        let offer = order.offer.iter().map(|item| Execution {
            item: ReceivedItem {
                item_type: item.item_type,
                token: item.token,
                identifier: item.identifier,
                amount: item.amount,
                recipient,
            },
            offerer: order.parameters.offerer,
            conduit_key: order.parameters.conduit_key,
        });
        let consideration = order.consideration.iter().map(|item| Execution {
            item: *item,
            offerer: call.caller,
            conduit_key: fulfiller_conduit_key,
        });
        let executions = offer.chain(consideration).collect::<Vec<_>>();

        let mut budget = Budget::new(call.value);
        conduit::execute(env, &self.conduits, self.address(), &executions, &mut budget)?;
        budget.refund(env, call.caller)?;

        let event = order.fulfilled(recipient);
        self.emit(event);
        tracing::debug!(order_hash = ?order.order_hash, "fulfilled order");
        Ok(())
    }

    /// Admits `orders` into a call: checks and records their status, resolves
    /// criteria, asks zones for approval and computes item amounts.
    ///
    /// Fills are recorded before any zone or transfer can observe the
    /// exchange.
    pub(crate) fn prepare(
        &mut self,
        env: &mut impl Environment,
        caller: Address,
        orders: &[AdvancedOrder],
        criteria_resolvers: &[CriteriaResolver],
        admission: Admission,
    ) -> Result<Vec<Prepared>, Error> {
        let now = env.timestamp();
        let mut prepared = Vec::with_capacity(orders.len());
        let mut admitted = 0;
        for order in orders {
            let order_hash = self.order_hash(&order.parameters);
            let fraction = if admitted < admission.maximum_fulfilled {
                self.admit(&*env, caller, order, order_hash, now, admission)?
            } else {
                None
            };
            admitted += usize::from(fraction.is_some());
            prepared.push(Prepared {
                order_hash,
                parameters: order.parameters.clone(),
                fraction,
                ..Default::default()
            });
        }

        criteria::apply(&mut prepared, criteria_resolvers)?;

        let order_hashes = prepared
            .iter()
            .map(|order| order.order_hash)
            .collect::<Vec<_>>();
        for (index, (order, submitted)) in prepared.iter().zip(orders).enumerate() {
            if order.is_available() {
                zone::check_advanced(
                    &*env,
                    caller,
                    order.order_hash,
                    submitted,
                    &order_hashes[..index],
                    criteria_resolvers,
                )?;
            }
        }

        for order in &mut prepared {
            order.resolve_amounts(now)?;
        }
        Ok(prepared)
    }

    /// Checks a single order and records its fill. Returns the fraction to
    /// fill, or `None` if the order is unavailable and may be skipped.
    fn admit(
        &mut self,
        env: &impl Environment,
        caller: Address,
        order: &AdvancedOrder,
        order_hash: B256,
        now: u64,
        admission: Admission,
    ) -> Result<Option<(u128, u128)>, Error> {
        let parameters = &order.parameters;
        let (numerator, denominator) = (order.numerator, order.denominator);
        if numerator == 0 || numerator > denominator {
            return Err(Error::BadFraction);
        }
        if numerator < denominator && !parameters.order_type.allows_partial_fills() {
            return Err(Error::PartialFillsNotEnabledForOrder);
        }
        if parameters.consideration.len() < parameters.total_original_consideration_items {
            return Err(Error::MissingOriginalConsiderationItems);
        }
        let offer_amounts = parameters
            .offer
            .iter()
            .map(|item| (item.start_amount, item.end_amount));
        let consideration_amounts = parameters
            .consideration
            .iter()
            .map(|item| (item.start_amount, item.end_amount));
        if offer_amounts
            .chain(consideration_amounts)
            .any(|(start, end)| start.is_zero() && end.is_zero())
        {
            return Err(Error::MissingItemAmount);
        }

        let unavailable = |err: Error| match admission.revert_on_unavailable {
            true => Err(err),
            false => {
                tracing::debug!(?order_hash, ?err, "skipping unavailable order");
                Ok(None)
            }
        };
        if !parameters.is_active(now) {
            return unavailable(Error::InvalidTime);
        }
        let status = self.store.status(&order_hash);
        if status.is_cancelled {
            return unavailable(Error::OrderIsCancelled(order_hash));
        }
        if status.is_fully_filled() {
            return unavailable(Error::OrderAlreadyFilled(order_hash));
        }

        if !admission.native_offer_items
            && parameters
                .offer
                .iter()
                .any(|item| item.item_type == ItemType::Native)
        {
            return Err(Error::InvalidNativeOfferItem);
        }
        self.verify_signature(env, caller, parameters, order_hash, &order.signature)?;

        let (numerator, denominator) = self.store.clamp_fill(&order_hash, numerator, denominator)?;
        self.store.record_fill(order_hash, numerator, denominator)?;
        Ok(Some((numerator, denominator)))
    }
}

pub(crate) fn recipient_or_caller(recipient: Address, caller: Address) -> Address {
    if recipient.is_zero() { caller } else { recipient }
}

/// Items of one group of fulfillment components, added up.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Aggregate {
    pub item: ReceivedItem,
    /// Offerer and conduit of the first offer component.
    pub offerer: Address,
    pub conduit_key: B256,
    /// The component whose item keeps any amount left over.
    pub first: FulfillmentComponent,
}

/// Adds up the items named by `components` and marks them as spent.
///
/// Components of unavailable orders are ignored, and `None` is returned if no
/// component belongs to an available order. Every other component must
/// refer to the same asset (and for offer items the same offerer and conduit,
/// for consideration items the same recipient).
pub(crate) fn aggregate(
    orders: &mut [Prepared],
    side: Side,
    components: &[FulfillmentComponent],
) -> Result<Option<Aggregate>, Error> {
    let mut total: Option<Aggregate> = None;
    for component in components {
        let order = orders
            .get_mut(component.order_index)
            .ok_or(Error::InvalidFulfillmentComponentData)?;
        if !order.is_available() {
            continue;
        }
        let offerer = order.parameters.offerer;
        let conduit_key = order.parameters.conduit_key;
        let item = match side {
            Side::Offer => {
                let item = order
                    .offer
                    .get_mut(component.item_index)
                    .ok_or(Error::InvalidFulfillmentComponentData)?;
                let spent = ReceivedItem {
                    item_type: item.item_type,
                    token: item.token,
                    identifier: item.identifier,
                    amount: item.amount,
                    recipient: Address::ZERO,
                };
                item.amount = U256::ZERO;
                spent
            }
            Side::Consideration => {
                let item = order
                    .consideration
                    .get_mut(component.item_index)
                    .ok_or(Error::InvalidFulfillmentComponentData)?;
                let received = *item;
                item.amount = U256::ZERO;
                received
            }
        };

        if let Some(total) = total.as_mut() {
            let same_asset = total.item.item_type == item.item_type
                && total.item.token == item.token
                && total.item.identifier == item.identifier;
            let same_route = match side {
                Side::Offer => total.offerer == offerer && total.conduit_key == conduit_key,
                Side::Consideration => total.item.recipient == item.recipient,
            };
            if !same_asset || !same_route {
                return Err(Error::InvalidFulfillmentComponentData);
            }
            total.item.amount = total
                .item
                .amount
                .checked_add(item.amount)
                .ok_or(Error::Overflow)?;
        } else {
            total = Some(Aggregate {
                item,
                offerer,
                conduit_key,
                first: *component,
            });
        }
    }
    Ok(total)
}

/// Fails if a consideration item of an available order was not paid in full.
pub(crate) fn check_consideration_met(orders: &[Prepared]) -> Result<(), Error> {
    for (order_index, order) in orders.iter().enumerate() {
        if !order.is_available() {
            continue;
        }
        if let Some((consideration_index, item)) = order
            .consideration
            .iter()
            .enumerate()
            .find(|(_, item)| !item.amount.is_zero())
        {
            return Err(Error::ConsiderationNotMet {
                order_index,
                consideration_index,
                shortfall: item.amount,
            });
        }
    }
    Ok(())
}
