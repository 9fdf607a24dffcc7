use {
    crate::{
        Error,
        Event,
        tests::setup::{
            self,
            Asset,
            NOW,
            Test,
            advanced,
            alice,
            bob,
            erc20,
            native_to,
            offer_erc20,
            setup,
        },
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        item::ItemType,
        order::{AdvancedOrder, OrderType},
    },
};

fn erc1155() -> Asset {
    Asset::nft(setup::erc1155(), 1)
}

/// Alice sells 10 units of an ERC-1155 token for 10 native in any fraction.
fn partial_setup() -> (Test, model::order::Order) {
    let test = setup()
        .balance(alice().address(), erc1155(), 10)
        .balance(bob().address(), Asset::Native, 100)
        .approve(alice().address())
        .done();
    let mut parameters = setup::order(&alice(), vec![], vec![native_to(10, alice().address())]);
    parameters.offer.push(model::item::OfferItem {
        item_type: ItemType::Erc1155,
        token: setup::erc1155(),
        identifier_or_criteria: U256::from(1),
        start_amount: U256::from(10),
        end_amount: U256::from(10),
    });
    parameters.order_type = OrderType::PartialOpen;
    let order = test.sign(&alice(), parameters);
    (test, order)
}

fn fill(test: &mut Test, order: &AdvancedOrder, value: u64) -> Result<bool, Error> {
    test.call(bob().address(), value, |exchange, chain, call| {
        exchange.fulfill_advanced_order(chain, call, order, &[], B256::ZERO, Address::ZERO)
    })
}

#[test]
fn two_halves_fill_the_order() {
    let (mut test, order) = partial_setup();
    let order_hash = test.order_hash(&order.parameters);
    let half = advanced(order, 1, 2);

    fill(&mut test, &half, 5).unwrap();
    let status = test.exchange.get_order_status(&order_hash);
    assert_eq!((status.numerator, status.denominator), (1, 2));
    assert!(status.is_validated);
    assert_eq!(test.balance(bob().address(), erc1155()), 5);

    fill(&mut test, &half, 5).unwrap();
    assert!(test.exchange.get_order_status(&order_hash).is_fully_filled());
    assert_eq!(test.balance(bob().address(), erc1155()), 10);
    assert_eq!(test.balance(alice().address(), Asset::Native), 10);

    let result = fill(&mut test, &half, 5);
    assert!(matches!(result, Err(Error::OrderAlreadyFilled(hash)) if hash == order_hash));
    assert_eq!(test.balance(bob().address(), Asset::Native), 90);
}

#[test]
fn fills_are_clamped_to_the_remainder() {
    let (mut test, order) = partial_setup();
    let order_hash = test.order_hash(&order.parameters);

    fill(&mut test, &advanced(order.clone(), 1, 2), 5).unwrap();
    // Asking for three quarters only gets the remaining half and the unused
    // value is refunded.
    fill(&mut test, &advanced(order, 3, 4), 10).unwrap();
    assert!(test.exchange.get_order_status(&order_hash).is_fully_filled());
    assert_eq!(test.balance(bob().address(), erc1155()), 10);
    assert_eq!(test.balance(bob().address(), Asset::Native), 90);

    let events = test.exchange.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[1],
        Event::OrderFulfilled { offer, consideration, .. }
            if offer[0].amount == U256::from(5) && consideration[0].amount == U256::from(5)
    ));
}

#[test]
fn full_orders_reject_fractions() {
    let (mut test, mut order) = partial_setup();
    order.parameters.order_type = OrderType::FullOpen;
    let order = test.sign(&alice(), order.parameters);

    let result = fill(&mut test, &advanced(order.clone(), 1, 2), 5);
    assert!(matches!(result, Err(Error::PartialFillsNotEnabledForOrder)));
    let result = fill(&mut test, &advanced(order.clone(), 0, 2), 5);
    assert!(matches!(result, Err(Error::BadFraction)));
    let result = fill(&mut test, &advanced(order, 3, 2), 5);
    assert!(matches!(result, Err(Error::BadFraction)));
}

#[test]
fn fractions_must_divide_amounts_exactly() {
    let (mut test, order) = partial_setup();
    let result = fill(&mut test, &advanced(order, 1, 3), 10);
    assert!(matches!(result, Err(Error::InexactFraction)));
    assert!(test.exchange.events().is_empty());
}

/// Amounts moving over time round in favour of the offerer: the offer down
/// and the consideration up.
#[test]
fn interpolation_rounds_against_the_fulfiller() {
    let mut test = setup()
        .balance(alice().address(), Asset::erc20(erc20()), 200)
        .balance(bob().address(), Asset::Native, 100)
        .approve(alice().address())
        .done();
    let mut parameters = setup::order(
        &alice(),
        vec![offer_erc20(100)],
        vec![native_to(10, alice().address())],
    );
    parameters.offer[0].end_amount = U256::from(200);
    parameters.consideration[0].end_amount = U256::from(20);
    // A third of the way through the order's lifetime.
    parameters.start_time = U256::from(NOW - 1);
    parameters.end_time = U256::from(NOW + 2);
    let order = test.sign(&alice(), parameters);

    test.call(bob().address(), 20, |exchange, chain, call| {
        exchange.fulfill_order(chain, call, order, B256::ZERO)
    })
    .unwrap();

    // offer: (100 * 2 + 200) / 3 = 133.3, consideration: (10 * 2 + 20) / 3 = 13.3
    assert_eq!(test.balance(bob().address(), Asset::erc20(erc20())), 133);
    assert_eq!(test.balance(alice().address(), Asset::Native), 14);
    assert_eq!(test.balance(bob().address(), Asset::Native), 86);
}
