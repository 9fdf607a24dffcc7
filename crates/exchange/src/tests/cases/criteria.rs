use {
    crate::{
        Error,
        criteria::merkle,
        tests::setup::{
            self,
            Asset,
            Test,
            advanced,
            alice,
            bob,
            erc20,
            nft,
            nft_to,
            offer_erc20,
            setup,
        },
    },
    alloy::primitives::{Address, B256, U256},
    model::{
        fulfillment::{CriteriaResolver, Side},
        item::ItemType,
        order::AdvancedOrder,
    },
};

fn collection() -> Vec<U256> {
    [1u64, 5, 9, 12, 40].map(U256::from).to_vec()
}

/// Bob offers 10 ERC-20 for any NFT of a collection committed to by `root`.
fn collection_offer(root: U256) -> (Test, AdvancedOrder) {
    let test = setup()
        .balance(bob().address(), Asset::erc20(erc20()), 10)
        .balance(alice().address(), Asset::nft(nft(), 9), 1)
        .balance(alice().address(), Asset::nft(nft(), 2), 1)
        .approve(alice().address())
        .approve(bob().address())
        .done();
    let mut wanted = nft_to(0, bob().address());
    wanted.item_type = ItemType::Erc721WithCriteria;
    wanted.identifier_or_criteria = root;
    let order = test.sign(
        &bob(),
        setup::order(&bob(), vec![offer_erc20(10)], vec![wanted]),
    );
    (test, advanced(order, 1, 1))
}

fn resolver(identifier: u64, criteria_proof: Vec<B256>) -> CriteriaResolver {
    CriteriaResolver {
        order_index: 0,
        side: Side::Consideration,
        index: 0,
        identifier: U256::from(identifier),
        criteria_proof,
    }
}

fn sell(test: &mut Test, order: &AdvancedOrder, resolvers: &[CriteriaResolver]) -> Result<bool, Error> {
    test.call(alice().address(), 0, |exchange, chain, call| {
        exchange.fulfill_advanced_order(chain, call, order, resolvers, B256::ZERO, Address::ZERO)
    })
}

#[test]
fn any_identifier_of_the_collection_fills_the_order() {
    let identifiers = collection();
    let (mut test, order) = collection_offer(merkle::root(&identifiers));

    sell(&mut test, &order, &[resolver(9, merkle::proof(&identifiers, 2))]).unwrap();
    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 9)), 1);
    assert_eq!(test.balance(alice().address(), Asset::erc20(erc20())), 10);
}

#[test]
fn identifiers_outside_the_collection_are_rejected() {
    let identifiers = collection();
    let (mut test, order) = collection_offer(merkle::root(&identifiers));

    // A proof for another identifier does not prove 2.
    let result = sell(&mut test, &order, &[resolver(2, merkle::proof(&identifiers, 2))]);
    assert!(matches!(result, Err(Error::InvalidProof)));
    assert_eq!(test.balance(alice().address(), Asset::nft(nft(), 2)), 1);
}

#[test]
fn criteria_items_must_be_resolved() {
    let (mut test, order) = collection_offer(merkle::root(&collection()));
    let result = sell(&mut test, &order, &[]);
    assert!(matches!(result, Err(Error::UnresolvedConsiderationCriteria)));

    let mut out_of_range = resolver(9, vec![]);
    out_of_range.index = 1;
    let result = sell(&mut test, &order, &[out_of_range]);
    assert!(matches!(
        result,
        Err(Error::ConsiderationCriteriaResolverOutOfRange)
    ));

    let mut offer_side = resolver(9, vec![]);
    offer_side.side = Side::Offer;
    let result = sell(&mut test, &order, &[offer_side]);
    assert!(matches!(result, Err(Error::CriteriaNotEnabledForItem)));
}

#[test]
fn zero_root_accepts_any_identifier_without_proof() {
    let (mut test, order) = collection_offer(U256::ZERO);

    let result = sell(&mut test, &order, &[resolver(2, vec![B256::repeat_byte(1)])]);
    assert!(matches!(result, Err(Error::InvalidProof)));

    sell(&mut test, &order, &[resolver(2, vec![])]).unwrap();
    assert_eq!(test.balance(bob().address(), Asset::nft(nft(), 2)), 1);
}
