//! Entry point for ABI encoded calls.

use {
    crate::{Call, Error, Exchange, infra::Environment},
    alloy::{
        primitives::{Bytes, U256},
        sol_types::{SolCall, SolInterface},
    },
    model::{
        abi::{self, ConversionError, Exchange::ExchangeCalls},
        basic::BasicOrderParameters,
        fulfillment::{Fulfillment, FulfillmentComponent},
    },
};

impl Exchange {
    /// Decodes `calldata` by its selector, runs the entry point it names and
    /// encodes the return value.
    pub fn execute_calldata(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        calldata: &[u8],
    ) -> Result<Bytes, Error> {
        let selector: [u8; 4] = calldata
            .get(..4)
            .and_then(|selector| selector.try_into().ok())
            .ok_or_else(|| Error::Decode("calldata shorter than a selector".to_string()))?;
        if !ExchangeCalls::valid_selector(selector) {
            return Err(Error::UnknownSelector(selector.into()));
        }
        let decoded =
            ExchangeCalls::abi_decode(calldata).map_err(|err| Error::Decode(err.to_string()))?;

        let encoded = match decoded {
            ExchangeCalls::fulfillBasicOrder(decoded) => {
                let order = BasicOrderParameters::from(decoded.parameters);
                let fulfilled = self.fulfill_basic_order(env, call, &order)?;
                abi::Exchange::fulfillBasicOrderCall::abi_encode_returns(&fulfilled)
            }
            ExchangeCalls::fulfillOrder(decoded) => {
                let order = convert(decoded.order)?;
                let fulfilled =
                    self.fulfill_order(env, call, order, decoded.fulfillerConduitKey)?;
                abi::Exchange::fulfillOrderCall::abi_encode_returns(&fulfilled)
            }
            ExchangeCalls::fulfillAdvancedOrder(decoded) => {
                let fulfilled = self.fulfill_advanced_order(
                    env,
                    call,
                    &convert(decoded.advancedOrder)?,
                    &convert_all(decoded.criteriaResolvers)?,
                    decoded.fulfillerConduitKey,
                    decoded.recipient,
                )?;
                abi::Exchange::fulfillAdvancedOrderCall::abi_encode_returns(&fulfilled)
            }
            ExchangeCalls::fulfillAvailableOrders(decoded) => {
                let (available, executions) = self.fulfill_available_orders(
                    env,
                    call,
                    convert_all(decoded.orders)?,
                    &components(decoded.offerFulfillments),
                    &components(decoded.considerationFulfillments),
                    decoded.fulfillerConduitKey,
                    decoded.maximumFulfilled.saturating_to(),
                )?;
                abi::Exchange::fulfillAvailableOrdersCall::abi_encode_returns(
                    &abi::Exchange::fulfillAvailableOrdersReturn {
                        availableOrders: available,
                        executions: executions.iter().map(Into::into).collect(),
                    },
                )
            }
            ExchangeCalls::fulfillAvailableAdvancedOrders(decoded) => {
                let (available, executions) = self.fulfill_available_advanced_orders(
                    env,
                    call,
                    &convert_all(decoded.advancedOrders)?,
                    &convert_all(decoded.criteriaResolvers)?,
                    &components(decoded.offerFulfillments),
                    &components(decoded.considerationFulfillments),
                    decoded.fulfillerConduitKey,
                    decoded.recipient,
                    decoded.maximumFulfilled.saturating_to(),
                )?;
                abi::Exchange::fulfillAvailableAdvancedOrdersCall::abi_encode_returns(
                    &abi::Exchange::fulfillAvailableAdvancedOrdersReturn {
                        availableOrders: available,
                        executions: executions.iter().map(Into::into).collect(),
                    },
                )
            }
            ExchangeCalls::matchOrders(decoded) => {
                let executions = self.match_orders(
                    env,
                    call,
                    convert_all(decoded.orders)?,
                    &fulfillments(decoded.fulfillments),
                )?;
                abi::Exchange::matchOrdersCall::abi_encode_returns(
                    &executions.iter().map(Into::into).collect(),
                )
            }
            ExchangeCalls::matchAdvancedOrders(decoded) => {
                let executions = self.match_advanced_orders(
                    env,
                    call,
                    &convert_all(decoded.advancedOrders)?,
                    &convert_all(decoded.criteriaResolvers)?,
                    &fulfillments(decoded.fulfillments),
                )?;
                abi::Exchange::matchAdvancedOrdersCall::abi_encode_returns(
                    &executions.iter().map(Into::into).collect(),
                )
            }
            ExchangeCalls::cancel(decoded) => {
                let cancelled = self.cancel(env, call, &convert_all(decoded.orders)?)?;
                abi::Exchange::cancelCall::abi_encode_returns(&cancelled)
            }
            ExchangeCalls::validate(decoded) => {
                let validated = self.validate(env, call, &convert_all(decoded.orders)?)?;
                abi::Exchange::validateCall::abi_encode_returns(&validated)
            }
            ExchangeCalls::incrementCounter(_) => {
                let new_counter = self.increment_counter(env, call)?;
                abi::Exchange::incrementCounterCall::abi_encode_returns(&new_counter)
            }
            ExchangeCalls::getOrderHash(decoded) => {
                call.non_payable()?;
                let components = convert(decoded.order)?;
                abi::Exchange::getOrderHashCall::abi_encode_returns(
                    &self.get_order_hash(&components),
                )
            }
            ExchangeCalls::getOrderStatus(decoded) => {
                call.non_payable()?;
                let status = self.get_order_status(&decoded.orderHash);
                abi::Exchange::getOrderStatusCall::abi_encode_returns(
                    &abi::Exchange::getOrderStatusReturn {
                        isValidated: status.is_validated,
                        isCancelled: status.is_cancelled,
                        totalFilled: U256::from(status.numerator),
                        totalSize: U256::from(status.denominator),
                    },
                )
            }
            ExchangeCalls::getCounter(decoded) => {
                call.non_payable()?;
                abi::Exchange::getCounterCall::abi_encode_returns(
                    &self.get_counter(&decoded.offerer),
                )
            }
            ExchangeCalls::information(_) => {
                call.non_payable()?;
                let information = self.information();
                abi::Exchange::informationCall::abi_encode_returns(
                    &abi::Exchange::informationReturn {
                        version: information.version,
                        domainSeparator: information.domain_separator,
                        conduitController: information.conduit_controller,
                    },
                )
            }
            ExchangeCalls::name(_) => {
                call.non_payable()?;
                abi::Exchange::nameCall::abi_encode_returns(&self.name().to_string())
            }
        };
        Ok(encoded.into())
    }
}

fn convert<T, U>(value: T) -> Result<U, Error>
where
    U: TryFrom<T, Error = ConversionError>,
{
    U::try_from(value).map_err(|err| Error::Decode(err.to_string()))
}

fn convert_all<T, U>(values: Vec<T>) -> Result<Vec<U>, Error>
where
    U: TryFrom<T, Error = ConversionError>,
{
    values.into_iter().map(convert).collect()
}

fn components(groups: Vec<Vec<abi::FulfillmentComponent>>) -> Vec<Vec<FulfillmentComponent>> {
    groups
        .into_iter()
        .map(|group| group.into_iter().map(Into::into).collect())
        .collect()
}

fn fulfillments(fulfillments: Vec<abi::Fulfillment>) -> Vec<Fulfillment> {
    fulfillments.into_iter().map(Into::into).collect()
}
