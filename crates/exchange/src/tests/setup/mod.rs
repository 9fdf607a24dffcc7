//! Framework for setting up tests.

pub use self::chain::{Asset, TestChain, ZoneBehaviour, ZoneCall};
use {
    crate::{
        Call,
        Error,
        Exchange,
        infra::{self, Ledger},
    },
    alloy::{
        primitives::{Address, B256, Bytes, U256},
        signers::local::PrivateKeySigner,
    },
    model::{
        item::{ConsiderationItem, ItemType, OfferItem},
        order::{AdvancedOrder, Order, OrderParameters},
        signature::EcdsaSignature,
    },
};


/// Time every test runs at.
pub const NOW: u64 = 1_700_000_000;

pub fn exchange_address() -> Address {
    Address::repeat_byte(0xee)
}

pub fn conduit_key() -> B256 {
    B256::repeat_byte(0xc0)
}

pub fn conduit() -> Address {
    Address::repeat_byte(0xc1)
}

pub fn erc20() -> Address {
    Address::repeat_byte(0x20)
}

pub fn nft() -> Address {
    Address::repeat_byte(0x72)
}

pub fn erc1155() -> Address {
    Address::repeat_byte(0x11)
}

/// An account with a key to sign orders with.
#[derive(Clone, Debug)]
pub struct Party {
    signer: PrivateKeySigner,
}

impl Party {
    fn new(key: u8) -> Self {
        Self {
            signer: PrivateKeySigner::from_slice(&[key; 32]).unwrap(),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

pub fn alice() -> Party {
    Party::new(0xa1)
}

pub fn bob() -> Party {
    Party::new(0xb0)
}

pub fn carol() -> Party {
    Party::new(0xca)
}

pub fn offer_nft(identifier: u64) -> OfferItem {
    OfferItem {
        item_type: ItemType::Erc721,
        token: nft(),
        identifier_or_criteria: U256::from(identifier),
        start_amount: U256::from(1),
        end_amount: U256::from(1),
    }
}

pub fn offer_erc20(amount: u64) -> OfferItem {
    OfferItem {
        item_type: ItemType::Erc20,
        token: erc20(),
        identifier_or_criteria: U256::ZERO,
        start_amount: U256::from(amount),
        end_amount: U256::from(amount),
    }
}

pub fn offer_native(amount: u64) -> OfferItem {
    OfferItem {
        item_type: ItemType::Native,
        token: Address::ZERO,
        identifier_or_criteria: U256::ZERO,
        start_amount: U256::from(amount),
        end_amount: U256::from(amount),
    }
}

pub fn native_to(amount: u64, recipient: Address) -> ConsiderationItem {
    ConsiderationItem {
        item_type: ItemType::Native,
        token: Address::ZERO,
        identifier_or_criteria: U256::ZERO,
        start_amount: U256::from(amount),
        end_amount: U256::from(amount),
        recipient,
    }
}

pub fn erc20_to(amount: u64, recipient: Address) -> ConsiderationItem {
    ConsiderationItem {
        item_type: ItemType::Erc20,
        token: erc20(),
        ..native_to(amount, recipient)
    }
}

pub fn nft_to(identifier: u64, recipient: Address) -> ConsiderationItem {
    ConsiderationItem {
        item_type: ItemType::Erc721,
        token: nft(),
        identifier_or_criteria: U256::from(identifier),
        ..native_to(1, recipient)
    }
}

/// An open order of `offerer`, active for an hour around [`NOW`].
pub fn order(
    offerer: &Party,
    offer: Vec<OfferItem>,
    consideration: Vec<ConsiderationItem>,
) -> OrderParameters {
    OrderParameters {
        offerer: offerer.address(),
        total_original_consideration_items: consideration.len(),
        offer,
        consideration,
        start_time: U256::from(NOW - 3_600),
        end_time: U256::from(NOW + 3_600),
        salt: U256::from(NOW),
        ..Default::default()
    }
}

pub fn advanced(order: Order, numerator: u128, denominator: u128) -> AdvancedOrder {
    AdvancedOrder {
        numerator,
        denominator,
        ..order.into()
    }
}

/// Creates a new test.
pub fn setup() -> Setup {
    Setup {
        balances: Vec::new(),
        approvals: Vec::new(),
    }
}

/// Accounts and their balances before the test starts.
#[derive(Debug)]
pub struct Setup {
    balances: Vec<(Address, Asset, U256)>,
    approvals: Vec<(Address, Address)>,
}

impl Setup {
    pub fn balance(mut self, account: Address, asset: Asset, amount: u64) -> Self {
        self.balances.push((account, asset, U256::from(amount)));
        self
    }

    /// Lets the exchange and the test conduit move every token of `owner`.
    pub fn approve(mut self, owner: Address) -> Self {
        self.approvals.push((owner, exchange_address()));
        self.approvals.push((owner, conduit()));
        self
    }

    pub fn done(self) -> Test {
        crate::metrics::init();
        observe::tracing::initialize_reentrant("exchange=debug");
        let exchange = Exchange::new(&infra::Config {
            name: "Seaport".to_owned(),
            version: "1.1".to_owned(),
            chain_id: 1,
            address: exchange_address(),
            conduit_controller: Address::repeat_byte(0xcc),
            conduits: vec![(conduit_key(), conduit())],
        });
        let mut chain = TestChain::new(exchange_address(), NOW);
        for (account, asset, amount) in self.balances {
            chain.mint(account, asset, amount);
        }
        for (owner, operator) in self.approvals {
            chain.approve(owner, operator);
        }
        Test { exchange, chain }
    }
}

#[derive(Debug)]
pub struct Test {
    pub exchange: Exchange,
    pub chain: TestChain,
}

impl Test {
    /// Calls into the exchange from `caller`, sending `value` along. Like a
    /// reverted transaction, a failed call keeps the value with the caller.
    pub fn call<T>(
        &mut self,
        caller: Address,
        value: u64,
        f: impl FnOnce(&mut Exchange, &mut TestChain, Call) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let value = U256::from(value);
        let checkpoint = self.chain.checkpoint();
        self.chain.send_native(caller, exchange_address(), value);
        let result = f(
            &mut self.exchange,
            &mut self.chain,
            Call::new(caller).with_value(value),
        );
        match result.is_ok() {
            true => self.chain.commit(checkpoint),
            false => self.chain.rollback(checkpoint),
        }
        result
    }

    /// Signs the order for the current counter of its offerer.
    pub fn sign(&self, party: &Party, parameters: OrderParameters) -> Order {
        let counter = self.exchange.get_counter(&parameters.offerer);
        let digest = model::signature::signing_digest(
            self.exchange.domain_separator(),
            &parameters.order_hash(counter),
        );
        let signature = EcdsaSignature::sign(&party.signer, &digest).unwrap();
        Order {
            parameters,
            signature: Bytes::from(signature.to_bytes().to_vec()),
        }
    }

    pub fn balance(&self, account: Address, asset: Asset) -> u64 {
        self.chain.balance(account, asset).to::<u64>()
    }

    pub fn order_hash(&self, parameters: &OrderParameters) -> B256 {
        parameters.order_hash(self.exchange.get_counter(&parameters.offerer))
    }
}
