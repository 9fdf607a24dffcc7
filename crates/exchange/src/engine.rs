//! The exchange: state owned across calls, the atomic call wrapper and the
//! entry points that manage orders without fulfilling them.

use {
    crate::{
        Error,
        conduit,
        events::Event,
        infra::{self, ContractSigners, Environment},
        metrics::Metrics,
        signature,
        status::{self, OrderStatus},
    },
    alloy::primitives::{Address, B256, Bytes, U256},
    model::{
        DomainSeparator,
        order::{Order, OrderComponents, OrderParameters},
    },
    serde::Serialize,
};

/// Context of a call into the exchange.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Call {
    pub caller: Address,
    /// Native value sent along. The environment has already credited it to
    /// the exchange; whatever is not used gets refunded to the caller.
    pub value: U256,
}

impl Call {
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::ZERO,
        }
    }

    pub fn with_value(self, value: U256) -> Self {
        Self { value, ..self }
    }

    pub(crate) fn non_payable(&self) -> Result<(), Error> {
        match self.value.is_zero() {
            true => Ok(()),
            false => Err(Error::UnexpectedNativeValue),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Information {
    pub version: String,
    pub domain_separator: B256,
    pub conduit_controller: Address,
    pub conduits: Vec<(B256, Address)>,
}

#[derive(Debug)]
pub struct Exchange {
    name: String,
    version: String,
    address: Address,
    domain: DomainSeparator,
    conduit_controller: Address,
    pub(crate) conduits: conduit::Registry,
    pub(crate) store: status::Store,
    events: Vec<Event>,
}

impl Exchange {
    pub fn new(config: &infra::Config) -> Self {
        let domain = DomainSeparator::new(
            &config.name,
            &config.version,
            config.chain_id,
            config.address,
        );
        tracing::debug!(?domain, address = ?config.address, "created exchange");
        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            address: config.address,
            domain,
            conduit_controller: config.conduit_controller,
            conduits: config.conduits.iter().copied().collect(),
            store: Default::default(),
            events: Default::default(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn domain_separator(&self) -> &DomainSeparator {
        &self.domain
    }

    pub fn conduits(&self) -> &conduit::Registry {
        &self.conduits
    }

    /// Conduit channels are managed by the conduit controller, outside of
    /// calls into the exchange.
    pub fn conduits_mut(&mut self) -> &mut conduit::Registry {
        &mut self.conduits
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn information(&self) -> Information {
        Information {
            version: self.version.clone(),
            domain_separator: self.domain.0,
            conduit_controller: self.conduit_controller,
            conduits: self.conduits.channels().collect(),
        }
    }

    pub fn get_order_hash(&self, components: &OrderComponents) -> B256 {
        components.hash_struct()
    }

    pub fn get_order_status(&self, order_hash: &B256) -> OrderStatus {
        self.store.status(order_hash)
    }

    pub fn get_counter(&self, offerer: &Address) -> U256 {
        self.store.counter(offerer)
    }

    /// Marks orders as validated so that they can be fulfilled without
    /// checking their signature again.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn validate(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: &[Order],
    ) -> Result<bool, Error> {
        self.atomically(env, "validate", |exchange, env| {
            call.non_payable()?;
            for order in orders {
                let parameters = &order.parameters;
                if parameters.consideration.len() < parameters.total_original_consideration_items
                {
                    return Err(Error::MissingOriginalConsiderationItems);
                }
                let order_hash = exchange.order_hash(parameters);
                let status = exchange.store.status(&order_hash);
                if status.is_cancelled {
                    return Err(Error::OrderIsCancelled(order_hash));
                }
                if status.is_fully_filled() {
                    return Err(Error::OrderAlreadyFilled(order_hash));
                }
                if status.is_validated {
                    continue;
                }
                exchange.verify_signature(
                    &*env,
                    call.caller,
                    parameters,
                    order_hash,
                    &order.signature,
                )?;
                if exchange.store.validate(order_hash)? {
                    exchange.emit(Event::OrderValidated {
                        order_hash,
                        offerer: parameters.offerer,
                        zone: parameters.zone,
                    });
                }
            }
            Ok(true)
        })
    }

    /// Cancels orders of the caller for good.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn cancel(
        &mut self,
        env: &mut impl Environment,
        call: Call,
        orders: &[OrderComponents],
    ) -> Result<bool, Error> {
        self.atomically(env, "cancel", |exchange, _| {
            call.non_payable()?;
            for order in orders {
                if order.offerer != call.caller {
                    return Err(Error::InvalidCanceller);
                }
                let order_hash = OrderComponents {
                    counter: exchange.store.counter(&order.offerer),
                    ..order.clone()
                }
                .hash_struct();
                exchange.store.cancel(order_hash);
                exchange.emit(Event::OrderCancelled {
                    order_hash,
                    offerer: order.offerer,
                    zone: order.zone,
                });
            }
            Ok(true)
        })
    }

    /// Invalidates every order the caller signed so far.
    #[tracing::instrument(level = "debug", skip_all, fields(caller = ?call.caller))]
    pub fn increment_counter(
        &mut self,
        env: &mut impl Environment,
        call: Call,
    ) -> Result<U256, Error> {
        self.atomically(env, "increment_counter", |exchange, _| {
            call.non_payable()?;
            let new_counter = exchange.store.increment_counter(call.caller)?;
            exchange.emit(Event::CounterIncremented {
                new_counter,
                offerer: call.caller,
            });
            Ok(new_counter)
        })
    }

    /// Runs `f` so that either all of its effects happen or none do.
    pub(crate) fn atomically<E, T>(
        &mut self,
        env: &mut E,
        path: &'static str,
        f: impl FnOnce(&mut Self, &mut E) -> Result<T, Error>,
    ) -> Result<T, Error>
    where
        E: Environment,
    {
        let store = self.store.checkpoint();
        let events = self.events.len();
        let ledger = env.checkpoint();
        match f(self, env) {
            Ok(result) => {
                self.store.commit();
                env.commit(ledger);
                Ok(result)
            }
            Err(err) => {
                tracing::debug!(?err, path, "call rejected");
                Metrics::get()
                    .rejected_calls
                    .with_label_values(&[err.kind()])
                    .inc();
                self.store.rollback(store);
                self.events.truncate(events);
                env.rollback(ledger);
                Err(err)
            }
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        tracing::trace!(?event, "emitted event");
        self.events.push(event);
    }

    /// Hash of the order for the current counter of its offerer.
    pub(crate) fn order_hash(&self, parameters: &OrderParameters) -> B256 {
        parameters.order_hash(self.store.counter(&parameters.offerer))
    }

    /// Checks the offerer's signature unless the order was validated before
    /// or the offerer is making the call.
    pub(crate) fn verify_signature(
        &self,
        signers: &impl ContractSigners,
        caller: Address,
        parameters: &OrderParameters,
        order_hash: B256,
        signature: &Bytes,
    ) -> Result<(), Error> {
        if caller == parameters.offerer || self.store.status(&order_hash).is_validated {
            return Ok(());
        }
        let digest = model::signature::signing_digest(&self.domain, &order_hash);
        signature::verify(signers, parameters.offerer, digest, signature)
    }
}
