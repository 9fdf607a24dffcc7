use {
    crate::{
        Error,
        Event,
        tests::setup::{
            self,
            Asset,
            NOW,
            alice,
            bob,
            carol,
            conduit_key,
            erc20,
            erc20_to,
            exchange_address,
            native_to,
            nft,
            offer_erc20,
            offer_nft,
            setup,
        },
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        basic::{AdditionalRecipient, BasicOrderParameters},
        order::{Order, OrderParameters},
    },
};

fn tipper() -> Address {
    Address::repeat_byte(0x71)
}

/// NFT 7 of alice for 10 native to alice plus a tip of 1 to carol and one to
/// another account.
fn nft_for_native() -> OrderParameters {
    setup::order(
        &alice(),
        vec![offer_nft(7)],
        vec![
            native_to(10, alice().address()),
            native_to(1, carol().address()),
            native_to(1, tipper()),
        ],
    )
}

/// The basic order equivalent to a signed general order with a single offer
/// item and a payment to the offerer followed by tips.
pub(super) fn basic(
    order: &Order,
    basic_order_type: u8,
    fulfiller_conduit_key: B256,
) -> BasicOrderParameters {
    let parameters = &order.parameters;
    let offer = &parameters.offer[0];
    let primary = &parameters.consideration[0];
    BasicOrderParameters {
        consideration_token: primary.token,
        consideration_identifier: primary.identifier_or_criteria,
        consideration_amount: primary.start_amount,
        offerer: parameters.offerer,
        zone: parameters.zone,
        offer_token: offer.token,
        offer_identifier: offer.identifier_or_criteria,
        offer_amount: offer.start_amount,
        basic_order_type,
        start_time: parameters.start_time,
        end_time: parameters.end_time,
        zone_hash: parameters.zone_hash,
        salt: parameters.salt,
        offerer_conduit_key: parameters.conduit_key,
        fulfiller_conduit_key,
        total_original_additional_recipients: parameters.total_original_consideration_items - 1,
        additional_recipients: parameters.consideration[1..]
            .iter()
            .map(|item| AdditionalRecipient {
                amount: item.start_amount,
                recipient: item.recipient,
            })
            .collect(),
        signature: order.signature.clone(),
    }
}

fn accounts() -> [Address; 5] {
    [
        alice().address(),
        bob().address(),
        carol().address(),
        tipper(),
        exchange_address(),
    ]
}

/// Filling the same order on the basic and on the general path moves exactly
/// the same assets and emits the same event.
#[test]
fn basic_and_general_paths_agree() {
    let fresh = || {
        setup()
            .balance(alice().address(), Asset::nft(nft(), 7), 1)
            .balance(bob().address(), Asset::Native, 20)
            .approve(alice().address())
            .done()
    };

    let mut general = fresh();
    let order = general.sign(&alice(), nft_for_native());
    general
        .call(bob().address(), 13, |exchange, chain, call| {
            exchange.fulfill_order(chain, call, order.clone(), B256::ZERO)
        })
        .unwrap();

    let mut basic_path = fresh();
    let parameters = basic(&order, 0, B256::ZERO);
    basic_path
        .call(bob().address(), 13, |exchange, chain, call| {
            exchange.fulfill_basic_order(chain, call, &parameters)
        })
        .unwrap();

    for test in [&general, &basic_path] {
        assert_eq!(test.balance(alice().address(), Asset::Native), 10);
        assert_eq!(test.balance(carol().address(), Asset::Native), 1);
        assert_eq!(test.balance(tipper(), Asset::Native), 1);
        assert_eq!(test.balance(bob().address(), Asset::Native), 8);
        assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 7)), 1);
        assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 7)), 0);
    }
    for account in accounts() {
        for asset in [Asset::Native, Asset::nft(nft(), 7)] {
            assert_eq!(
                general.balance(account, asset),
                basic_path.balance(account, asset)
            );
        }
    }
    assert_eq!(general.exchange.events(), basic_path.exchange.events());
    assert!(matches!(
        &basic_path.exchange.events()[0],
        Event::OrderFulfilled { order_hash, recipient, .. }
            if *order_hash == general.order_hash(&order.parameters)
                && *recipient == bob().address()
    ));

    let status = basic_path
        .exchange
        .get_order_status(&basic_path.order_hash(&order.parameters));
    assert!(status.is_fully_filled());
}

#[test]
fn erc20_payment_through_the_fulfillers_conduit() {
    let mut test = setup()
        .balance(alice().address(), Asset::nft(nft(), 7), 1)
        .balance(bob().address(), Asset::erc20(erc20()), 200)
        .approve(alice().address())
        .approve(bob().address())
        .done();
    let order = test.sign(
        &alice(),
        setup::order(
            &alice(),
            vec![offer_nft(7)],
            vec![
                erc20_to(100, alice().address()),
                erc20_to(5, carol().address()),
            ],
        ),
    );

    test.call(bob().address(), 0, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 8, conduit_key()))
    })
    .unwrap();

    assert_eq!(test.balance(alice().address(), Asset::erc20(erc20())), 100);
    assert_eq!(test.balance(carol().address(), Asset::erc20(erc20())), 5);
    assert_eq!(test.balance(bob().address(), Asset::erc20(erc20())), 95);
    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 7)), 1);
}

#[test]
fn inverse_route_pays_tips_out_of_the_offer() {
    let mut test = setup()
        .balance(alice().address(), Asset::erc20(erc20()), 100)
        .balance(bob().address(), Asset::nft(nft(), 3), 1)
        .approve(alice().address())
        .approve(bob().address())
        .done();
    let order = test.sign(
        &alice(),
        setup::order(
            &alice(),
            vec![offer_erc20(100)],
            vec![setup::nft_to(3, alice().address()), erc20_to(10, carol().address())],
        ),
    );

    test.call(bob().address(), 0, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 16, B256::ZERO))
    })
    .unwrap();

    assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 3)), 1);
    assert_eq!(test.balance(bob().address(), Asset::erc20(erc20())), 90);
    assert_eq!(test.balance(carol().address(), Asset::erc20(erc20())), 10);
    assert_eq!(test.balance(alice().address(), Asset::erc20(erc20())), 0);
}

#[test]
fn rejects_native_value_on_erc20_routes() {
    let mut test = setup()
        .balance(alice().address(), Asset::nft(nft(), 7), 1)
        .balance(bob().address(), Asset::erc20(erc20()), 200)
        .balance(bob().address(), Asset::Native, 5)
        .approve(alice().address())
        .approve(bob().address())
        .done();
    let order = test.sign(
        &alice(),
        setup::order(
            &alice(),
            vec![offer_nft(7)],
            vec![erc20_to(100, alice().address())],
        ),
    );

    let result = test.call(bob().address(), 1, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 8, B256::ZERO))
    });
    assert!(matches!(result, Err(Error::UnexpectedNativeValue)));
    assert_eq!(test.balance(bob().address(), Asset::Native), 5);
}

#[test]
fn underpayment_is_rejected_and_second_fill_fails() {
    let mut test = setup()
        .balance(alice().address(), Asset::nft(nft(), 7), 1)
        .balance(bob().address(), Asset::Native, 20)
        .approve(alice().address())
        .done();
    let order = test.sign(&alice(), nft_for_native());
    let parameters = basic(&order, 0, B256::ZERO);

    let result = test.call(bob().address(), 11, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &parameters)
    });
    assert!(matches!(result, Err(Error::InsufficientNativeSupplied)));
    assert_eq!(test.balance(bob().address(), Asset::Native), 20);
    assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 7)), 1);
    assert!(test.exchange.events().is_empty());

    test.call(bob().address(), 12, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &parameters)
    })
    .unwrap();
    assert_eq!(test.balance(bob().address(), Asset::Native), 8);
    let result = test.call(bob().address(), 8, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &parameters)
    });
    assert!(matches!(result, Err(Error::OrderAlreadyFilled(_))));
    assert_eq!(test.balance(bob().address(), Asset::Native), 8);
}

#[test]
fn rejects_expired_orders_and_foreign_signatures() {
    let mut test = setup()
        .balance(alice().address(), Asset::nft(nft(), 7), 1)
        .balance(bob().address(), Asset::Native, 20)
        .approve(alice().address())
        .done();

    let mut expired = nft_for_native();
    expired.end_time = U256::from(NOW);
    let order = test.sign(&alice(), expired);
    let result = test.call(bob().address(), 12, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 0, B256::ZERO))
    });
    assert!(matches!(result, Err(Error::InvalidTime)));

    let order = test.sign(&carol(), nft_for_native());
    let result = test.call(bob().address(), 12, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 0, B256::ZERO))
    });
    assert!(matches!(result, Err(Error::InvalidSigner(signer)) if signer == carol().address()));
}

#[test]
fn rejects_unknown_basic_order_types() {
    let mut test = setup().done();
    let order = test.sign(&alice(), nft_for_native());
    let result = test.call(bob().address(), 0, |exchange, chain, call| {
        exchange.fulfill_basic_order(chain, call, &basic(&order, 24, B256::ZERO))
    });
    assert!(matches!(result, Err(Error::InvalidBasicOrderType(24))));
}

/// Native payments are made by the exchange itself, so the fulfiller's
/// conduit key does not need an open channel.
#[test]
fn native_payments_ignore_the_fulfillers_conduit() {
    let unopened = B256::repeat_byte(0x99);
    let fresh = || {
        setup()
            .balance(alice().address(), Asset::nft(nft(), 7), 1)
            .balance(bob().address(), Asset::Native, 12)
            .approve(alice().address())
            .done()
    };

    let mut basic_path = fresh();
    let order = basic_path.sign(&alice(), nft_for_native());
    let parameters = basic(&order, 0, unopened);
    basic_path
        .call(bob().address(), 12, |exchange, chain, call| {
            exchange.fulfill_basic_order(chain, call, &parameters)
        })
        .unwrap();
    assert_eq!(basic_path.balance(bob().address(), Asset::nft(nft(), 7)), 1);
    assert_eq!(basic_path.balance(alice().address(), Asset::Native), 10);

    let mut general = fresh();
    general
        .call(bob().address(), 12, |exchange, chain, call| {
            exchange.fulfill_order(chain, call, order.clone(), unopened)
        })
        .unwrap();
    assert_eq!(general.balance(bob().address(), Asset::nft(nft(), 7)), 1);
    assert_eq!(general.balance(carol().address(), Asset::Native), 1);
}
