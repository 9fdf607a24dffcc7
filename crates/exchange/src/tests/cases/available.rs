use {
    crate::{
        Error,
        tests::setup::{
            self,
            Asset,
            Test,
            advanced,
            alice,
            bob,
            carol,
            native_to,
            nft,
            offer_nft,
            setup,
        },
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        fulfillment::{Execution, FulfillmentComponent},
        item::ItemType,
        order::Order,
    },
};

fn component(order_index: usize, item_index: usize) -> FulfillmentComponent {
    FulfillmentComponent {
        order_index,
        item_index,
    }
}

/// Alice sells NFTs 1, 2 and 3 for 10 native each.
fn three_listings() -> (Test, Vec<Order>) {
    let mut builder = setup()
        .balance(bob().address(), Asset::Native, 100)
        .approve(alice().address());
    for identifier in 1..=3 {
        builder = builder.balance(alice().address(), Asset::nft(nft(), identifier), 1);
    }
    let test = builder.done();
    let orders = (1..=3)
        .map(|identifier| {
            let mut parameters = setup::order(
                &alice(),
                vec![offer_nft(identifier)],
                vec![native_to(10, alice().address())],
            );
            parameters.salt = U256::from(identifier);
            test.sign(&alice(), parameters)
        })
        .collect::<Vec<_>>();
    (test, orders)
}

fn offer_groups() -> Vec<Vec<FulfillmentComponent>> {
    (0..3).map(|index| vec![component(index, 0)]).collect()
}

fn consideration_groups() -> Vec<Vec<FulfillmentComponent>> {
    vec![(0..3).map(|index| component(index, 0)).collect()]
}

fn fulfill(
    test: &mut Test,
    orders: &[Order],
    value: u64,
    maximum_fulfilled: usize,
) -> Result<(Vec<bool>, Vec<Execution>), Error> {
    test.call(bob().address(), value, |exchange, chain, call| {
        exchange.fulfill_available_orders(
            chain,
            call,
            orders.to_vec(),
            &offer_groups(),
            &consideration_groups(),
            B256::ZERO,
            maximum_fulfilled,
        )
    })
}

#[test]
fn skips_unavailable_orders_and_aggregates_payments() {
    let (mut test, orders) = three_listings();
    let cancelled = orders[1].parameters.components(U256::ZERO);
    test.call(alice().address(), 0, |exchange, chain, call| {
        exchange.cancel(chain, call, &[cancelled])
    })
    .unwrap();

    let (available, executions) = fulfill(&mut test, &orders, 30, 3).unwrap();
    assert_eq!(available, [true, false, true]);
    assert_eq!(executions.len(), 3);
    let payment = executions
        .iter()
        .find(|execution| execution.item.item_type == ItemType::Native)
        .unwrap();
    assert_eq!(payment.item.amount, U256::from(20));
    assert_eq!(payment.item.recipient, alice().address());
    assert_eq!(payment.offerer, bob().address());

    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 1)), 1);
    assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 2)), 1);
    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 3)), 1);
    assert_eq!(test.balance(alice().address(), Asset::Native), 20);
    assert_eq!(test.balance(bob().address(), Asset::Native), 80);
}

#[test]
fn stops_at_the_maximum() {
    let (mut test, orders) = three_listings();
    let (available, executions) = fulfill(&mut test, &orders, 30, 2).unwrap();
    assert_eq!(available, [true, true, false]);
    assert_eq!(executions.len(), 3);
    assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 3)), 1);
    assert_eq!(test.balance(bob().address(), Asset::Native), 80);
    assert!(
        test.exchange
            .get_order_status(&test.order_hash(&orders[2].parameters))
            .is_unused()
    );
}

#[test]
fn filled_and_expired_orders_are_skipped() {
    let (mut test, mut orders) = three_listings();
    test.call(bob().address(), 10, |exchange, chain, call| {
        exchange.fulfill_order(chain, call, orders[0].clone(), B256::ZERO)
    })
    .unwrap();
    orders[2].parameters.end_time = U256::from(setup::NOW);
    orders[2] = test.sign(&alice(), orders[2].parameters.clone());

    let (available, _) = fulfill(&mut test, &orders, 30, 3).unwrap();
    assert_eq!(available, [false, true, false]);
    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 2)), 1);
    assert_eq!(test.balance(bob().address(), Asset::Native), 80);
}

#[test]
fn fails_when_nothing_is_available() {
    let (mut test, orders) = three_listings();
    let result = fulfill(&mut test, &orders, 30, 0);
    assert!(matches!(result, Err(Error::NoSpecifiedOrdersAvailable)));
    assert_eq!(test.balance(bob().address(), Asset::Native), 100);
}

#[test]
fn sends_offered_items_to_the_recipient() {
    let (mut test, orders) = three_listings();
    let orders = orders
        .into_iter()
        .map(|order| advanced(order, 1, 1))
        .collect::<Vec<_>>();
    test.call(bob().address(), 30, |exchange, chain, call| {
        exchange.fulfill_available_advanced_orders(
            chain,
            call,
            &orders,
            &[],
            &offer_groups(),
            &consideration_groups(),
            B256::ZERO,
            carol().address(),
            3,
        )
    })
    .unwrap();
    for identifier in 1..=3 {
        assert_eq!(test.balance(carol().address(), Asset::nft(nft(), identifier)), 1);
    }
    assert_eq!(test.balance(bob().address(), Asset::Native), 70);
}

#[test]
fn rejects_groups_mixing_recipients() {
    let (mut test, mut orders) = three_listings();
    orders[2].parameters.consideration[0].recipient = Address::repeat_byte(0x99);
    orders[2] = test.sign(&alice(), orders[2].parameters.clone());
    let result = fulfill(&mut test, &orders, 30, 3);
    assert!(matches!(result, Err(Error::InvalidFulfillmentComponentData)));
}
