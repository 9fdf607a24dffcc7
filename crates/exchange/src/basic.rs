//! Fulfillment of basic orders: a single offered token against a single
//! payment to the offerer, plus tips to additional recipients.

use {
    crate::{
        Call,
        Error,
        Exchange,
        conduit::{self, Budget},
        events::Event,
        infra::Environment,
        metrics::Metrics,
        zone,
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        basic::{BasicOrderParameters, BasicOrderRoute, BasicOrderType},
        fulfillment::Execution,
        item::{ItemType, ReceivedItem, SpentItem},
        order::OrderParameters,
    },
};

impl Exchange {
    /// Fills a basic order completely.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn fulfill_basic_order(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        order: &BasicOrderParameters,
    ) -> Result<bool, Error> {
        self.atomically(env, "basic_order", |exchange, env| {
            let kind = BasicOrderType::try_from(order.basic_order_type)
                .map_err(|err| Error::InvalidBasicOrderType(err.0))?;
            check_parameters(order, kind.route)?;
            let parameters = order.order_parameters(kind);
            let order_hash = exchange.order_hash(&parameters);

            if !parameters.is_active(env.timestamp()) {
                return Err(Error::InvalidTime);
            }
            let status = exchange.store.status(&order_hash);
            if status.is_cancelled {
                return Err(Error::OrderIsCancelled(order_hash));
            }
            if status.is_fully_filled() {
                return Err(Error::OrderAlreadyFilled(order_hash));
            }
            if !status.is_unused() {
                return Err(Error::OrderPartiallyFilled(order_hash));
            }
            exchange.verify_signature(
                &*env,
                call.caller,
                &parameters,
                order_hash,
                &order.signature,
            )?;
            exchange.store.record_fill(order_hash, 1, 1)?;
            zone::check(&*env, call.caller, order_hash, &parameters)?;

            let native = kind.route.consideration_item_type() == ItemType::Native;
            if !native && !call.value.is_zero() {
                return Err(Error::UnexpectedNativeValue);
            }
            let executions = executions(order, kind.route, call.caller)?;
            if native {
                let owed = executions
                    .iter()
                    .filter(|execution| execution.item.item_type == ItemType::Native)
                    .try_fold(U256::ZERO, |total, execution| {
                        total.checked_add(execution.item.amount)
                    })
                    .ok_or(Error::Overflow)?;
                if owed > call.value {
                    return Err(Error::InsufficientNativeSupplied);
                }
            }

            let mut budget = Budget::new(call.value);
            conduit::execute(
                env,
                &exchange.conduits,
                exchange.address(),
                &executions,
                &mut budget,
            )?;
            budget.refund(env, call.caller)?;

            exchange.emit(fulfilled(order_hash, &parameters, call));
            Metrics::fulfilled("basic_order", 1);
            tracing::debug!(?order_hash, route = ?kind.route, "fulfilled basic order");
            Ok(true)
        })
    }
}

/// Checks the parameters that must be zero for the route and the number of
/// additional recipients.
fn check_parameters(order: &BasicOrderParameters, route: BasicOrderRoute) -> Result<(), Error> {
    if order.additional_recipients.len() < order.total_original_additional_recipients {
        return Err(Error::MissingOriginalConsiderationItems);
    }
    let unused = match route {
        BasicOrderRoute::EthToErc721 | BasicOrderRoute::EthToErc1155 => {
            !order.consideration_token.is_zero() || !order.consideration_identifier.is_zero()
        }
        BasicOrderRoute::Erc20ToErc721 | BasicOrderRoute::Erc20ToErc1155 => {
            !order.consideration_identifier.is_zero()
        }
        BasicOrderRoute::Erc721ToErc20 | BasicOrderRoute::Erc1155ToErc20 => {
            !order.offer_identifier.is_zero()
        }
    };
    match unused {
        true => Err(Error::UnusedItemParameters),
        false => Ok(()),
    }
}

/// The transfers of a basic order, in the order they are made.
///
/// On the regular routes the fulfiller pays the offerer and every tip. On the
/// inverse routes the offerer pays the tips out of the offered amount and the
/// fulfiller gets the rest.
fn executions(
    order: &BasicOrderParameters,
    route: BasicOrderRoute,
    caller: Address,
) -> Result<Vec<Execution>, Error> {
    let offer = |amount: U256| Execution {
        item: ReceivedItem {
            item_type: route.offer_item_type(),
            token: order.offer_token,
            identifier: order.offer_identifier,
            amount,
            recipient: caller,
        },
        offerer: order.offerer,
        conduit_key: order.offerer_conduit_key,
    };
    let primary = Execution {
        item: ReceivedItem {
            item_type: route.consideration_item_type(),
            token: order.consideration_token,
            identifier: order.consideration_identifier,
            amount: order.consideration_amount,
            recipient: order.offerer,
        },
        offerer: caller,
        conduit_key: order.fulfiller_conduit_key,
    };

    if !route.is_inverse() {
        let tips = order.additional_recipients.iter().map(|tip| Execution {
            item: ReceivedItem {
                item_type: route.tip_item_type(),
                token: order.consideration_token,
                identifier: U256::ZERO,
                amount: tip.amount,
                recipient: tip.recipient,
            },
            offerer: caller,
            conduit_key: order.fulfiller_conduit_key,
        });
        return Ok(std::iter::once(offer(order.offer_amount))
            .chain(std::iter::once(primary))
            .chain(tips)
            .collect());
    }

    let tipped = order
        .additional_recipients
        .iter()
        .try_fold(U256::ZERO, |total, tip| total.checked_add(tip.amount))
        .ok_or(Error::Overflow)?;
    let remainder = order
        .offer_amount
        .checked_sub(tipped)
        .ok_or(Error::Overflow)?;
    let tips = order.additional_recipients.iter().map(|tip| Execution {
        item: ReceivedItem {
            item_type: ItemType::Erc20,
            token: order.offer_token,
            identifier: U256::ZERO,
            amount: tip.amount,
            recipient: tip.recipient,
        },
        offerer: order.offerer,
        conduit_key: order.offerer_conduit_key,
    });
    Ok(std::iter::once(primary)
        .chain(std::iter::once(offer(remainder)))
        .chain(tips)
        .collect())
}

fn fulfilled(order_hash: B256, parameters: &OrderParameters, call: Call) -> Event {
    Event::OrderFulfilled {
        order_hash,
        offerer: parameters.offerer,
        zone: parameters.zone,
        recipient: call.caller,
        offer: parameters
            .offer
            .iter()
            .map(|item| SpentItem {
                item_type: item.item_type,
                token: item.token,
                identifier: item.identifier_or_criteria,
                amount: item.start_amount,
            })
            .collect(),
        consideration: parameters
            .consideration
            .iter()
            .map(|item| ReceivedItem {
                item_type: item.item_type,
                token: item.token,
                identifier: item.identifier_or_criteria,
                amount: item.start_amount,
                recipient: item.recipient,
            })
            .collect(),
    }
}
