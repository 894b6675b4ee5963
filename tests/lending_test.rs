//! End-to-end tests for the lending engine: staking custody, borrowing
//! against the floor price, repayment, liquidation and the sync sweep.

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, NoArgs};
use odra::prelude::*;

use nft_lending::engine::{LendingEngine, LendingEngineHostRef, LendingEngineInitArgs};
use nft_lending::error::Error;
use nft_lending::events::{LoanDrawn, LoanRepaid, NftStaked, PositionLiquidated};
use nft_lending::math::WAD;
use nft_lending::mocks::{
    MockCreditToken, MockCreditTokenHostRef, MockCreditTokenInitArgs, MockNft, MockNftHostRef,
    MockNftInitArgs,
};
use nft_lending::registry::{RiskRegistry, RiskRegistryHostRef};

fn wad(val: u64) -> U256 {
    U256::from(val) * U256::from(WAD)
}

struct Setup {
    env: HostEnv,
    registry: RiskRegistryHostRef,
    engine: LendingEngineHostRef,
    nft: MockNftHostRef,
    credit: MockCreditTokenHostRef,
    admin: Address,
    borrower: Address,
    other: Address,
}

/// Deploys the full stack with one whitelisted collection at 80/90 LTV
/// bounds and a floor price of 1000, funds the engine with credit and
/// mints tokens 0 and 1 to `borrower` and token 2 to `other`. Only
/// `borrower` pre-approves the engine as NFT operator.
fn setup() -> Setup {
    let env = odra_test::env();
    let admin = env.get_account(0);
    let borrower = env.get_account(1);
    let other = env.get_account(2);

    let mut registry = RiskRegistry::deploy(&env, NoArgs);
    let mut nft = MockNft::deploy(
        &env,
        MockNftInitArgs {
            name: String::from("Doodled Apes"),
            symbol: String::from("DAPE"),
        },
    );
    let mut credit = MockCreditToken::deploy(
        &env,
        MockCreditTokenInitArgs {
            name: String::from("Credit Note"),
            symbol: String::from("CRDT"),
        },
    );
    let engine = LendingEngine::deploy(
        &env,
        LendingEngineInitArgs {
            risk_registry: registry.address(),
            credit_token: credit.address(),
        },
    );

    registry.add_white_list(nft.address(), wad(80), wad(90));
    registry.set_floor_price(nft.address(), wad(1000), wad(1));
    credit.mint(engine.address(), wad(100_000));

    nft.mint(borrower, 0);
    nft.mint(borrower, 1);
    nft.mint(other, 2);

    env.set_caller(borrower);
    nft.set_approval_for_all(engine.address(), true);
    env.set_caller(admin);

    Setup {
        env,
        registry,
        engine,
        nft,
        credit,
        admin,
        borrower,
        other,
    }
}

fn collection(setup: &Setup) -> Address {
    setup.nft.address()
}

// ====== STAKING ======

#[test]
fn stake_takes_custody_and_opens_position() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);

    assert_eq!(setup.nft.owner_of(0), setup.engine.address());
    let position = setup.engine.get_position(collection, 0).unwrap();
    assert_eq!(position.owner, setup.borrower);
    assert_eq!(position.principal, U256::zero());
    assert!(!position.is_liquidated);
    assert_eq!(setup.engine.get_user_list(), vec![setup.borrower]);
    assert_eq!(
        setup.engine.get_staked_nft_list(setup.borrower, collection),
        vec![0]
    );
}

#[test]
fn stake_rejects_unlisted_collection() {
    let mut setup = setup();
    let rogue = MockNft::deploy(
        &setup.env,
        MockNftInitArgs {
            name: String::from("Rogue"),
            symbol: String::from("RGE"),
        },
    );

    setup.env.set_caller(setup.borrower);
    assert_eq!(
        setup.engine.try_stake(rogue.address(), 0),
        Err(Error::NotWhitelisted.into())
    );
}

#[test]
fn stake_rejects_non_nft_collateral() {
    let mut setup = setup();
    // The credit token passes whitelisting but fails the NFT capability
    // probe.
    setup
        .registry
        .add_white_list(setup.credit.address(), wad(80), wad(90));

    setup.env.set_caller(setup.borrower);
    assert_eq!(
        setup.engine.try_stake(setup.credit.address(), 0),
        Err(Error::UnsupportedToken.into())
    );
}

#[test]
fn stake_rejects_foreign_token() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.other);
    assert_eq!(
        setup.engine.try_stake(collection, 0),
        Err(Error::NotOwner.into())
    );
}

#[test]
fn stake_rejects_already_staked_token() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    // The engine now holds the NFT, so the original holder no longer
    // passes the ownership check.
    assert_eq!(
        setup.engine.try_stake(collection, 0),
        Err(Error::NotOwner.into())
    );
}

#[test]
fn failed_custody_transfer_leaves_no_position() {
    let mut setup = setup();
    let collection = collection(&setup);

    // `other` never approved the engine, so the pull reverts and the
    // whole call rolls back.
    setup.env.set_caller(setup.other);
    assert!(setup.engine.try_stake(collection, 2).is_err());

    assert_eq!(setup.nft.owner_of(2), setup.other);
    assert!(setup.engine.get_position(collection, 2).is_none());
    assert!(setup.engine.get_user_list().is_empty());
}

// ====== BORROWING ======

#[test]
fn borrow_draws_credit_up_to_capacity() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(500), collection, 0);
    setup.engine.borrow(wad(300), collection, 0);

    assert_eq!(setup.credit.balance_of(setup.borrower), wad(800));
    let position = setup.engine.get_position(collection, 0).unwrap();
    assert_eq!(position.principal, wad(800));

    // 800 is exactly floor * max_ltv / 100; one more unit breaches it.
    assert_eq!(
        setup.engine.try_borrow(U256::one(), collection, 0),
        Err(Error::ExceedsLoanCapacity.into())
    );
}

#[test]
fn borrow_over_capacity_is_rejected() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    assert_eq!(
        setup.engine.try_borrow(wad(801), collection, 0),
        Err(Error::ExceedsLoanCapacity.into())
    );
    assert_eq!(setup.credit.balance_of(setup.borrower), U256::zero());
}

#[test]
fn borrow_requires_open_position_and_ownership() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    assert_eq!(
        setup.engine.try_borrow(wad(10), collection, 0),
        Err(Error::PositionNotFound.into())
    );

    setup.engine.stake(collection, 0);
    assert_eq!(
        setup.engine.try_borrow(U256::zero(), collection, 0),
        Err(Error::InvalidAmount.into())
    );

    setup.env.set_caller(setup.other);
    assert_eq!(
        setup.engine.try_borrow(wad(10), collection, 0),
        Err(Error::NotOwner.into())
    );
}

#[test]
fn borrow_fails_when_engine_has_no_liquidity() {
    let mut setup = setup();
    let collection = collection(&setup);

    // A second engine wired to the same registry and token but never
    // funded with credit.
    let mut dry_engine = LendingEngine::deploy(
        &setup.env,
        LendingEngineInitArgs {
            risk_registry: setup.registry.address(),
            credit_token: setup.credit.address(),
        },
    );

    setup.env.set_caller(setup.borrower);
    setup
        .nft
        .set_approval_for_all(dry_engine.address(), true);
    dry_engine.stake(collection, 1);
    assert_eq!(
        dry_engine.try_borrow(wad(10), collection, 1),
        Err(Error::InsufficientLiquidity.into())
    );
}

#[test]
fn stake_and_borrow_is_one_call() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake_and_borrow(collection, 0, wad(600));

    assert_eq!(setup.nft.owner_of(0), setup.engine.address());
    assert_eq!(setup.credit.balance_of(setup.borrower), wad(600));
    let position = setup.engine.get_position(collection, 0).unwrap();
    assert_eq!(position.principal, wad(600));
}

// ====== REPAYMENT ======

#[test]
fn partial_repay_keeps_custody() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(500), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(500));
    setup.engine.repay(wad(200), collection, 0);

    assert_eq!(setup.nft.owner_of(0), setup.engine.address());
    let position = setup.engine.get_position(collection, 0).unwrap();
    assert_eq!(position.principal, wad(300));
    assert_eq!(setup.credit.balance_of(setup.borrower), wad(300));
}

#[test]
fn full_repay_returns_nft_and_closes_position() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.stake(collection, 1);
    setup.engine.borrow(wad(500), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(500));
    setup.engine.repay(wad(500), collection, 0);

    assert_eq!(setup.nft.owner_of(0), setup.borrower);
    let closed = setup.engine.get_position(collection, 0).unwrap();
    assert!(!closed.has_ownership);
    assert_eq!(closed.principal, U256::zero());
    // The sibling position is untouched.
    assert_eq!(
        setup.engine.get_staked_nft_list(setup.borrower, collection),
        vec![1]
    );

    // Closed positions no longer back debt operations.
    assert_eq!(
        setup.engine.try_borrow(wad(10), collection, 0),
        Err(Error::PositionNotFound.into())
    );
}

#[test]
fn token_can_be_staked_again_after_close() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(100), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(100));
    setup.engine.repay(wad(100), collection, 0);

    setup.engine.stake(collection, 0);
    let reopened = setup.engine.get_position(collection, 0).unwrap();
    assert!(reopened.has_ownership);
    assert_eq!(reopened.principal, U256::zero());
    assert_eq!(setup.nft.owner_of(0), setup.engine.address());
}

#[test]
fn repay_rejects_zero_and_overpayment() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(100), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(200));

    assert_eq!(
        setup.engine.try_repay(U256::zero(), collection, 0),
        Err(Error::InvalidAmount.into())
    );
    // The borrower's balance (100) is below the overpay amount, so this
    // also pins the overpay check firing before the token pull.
    assert_eq!(
        setup.engine.try_repay(wad(101), collection, 0),
        Err(Error::InvalidAmount.into())
    );
    let position = setup.engine.get_position(collection, 0).unwrap();
    assert_eq!(position.principal, wad(100));
}

#[test]
fn repay_is_owner_only() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(100), collection, 0);

    setup.env.set_caller(setup.other);
    assert_eq!(
        setup.engine.try_repay(wad(100), collection, 0),
        Err(Error::NotOwner.into())
    );
}

// ====== LIQUIDATION ======

#[test]
fn liquidate_is_admin_only() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(100), collection, 0);

    assert_eq!(
        setup.engine.try_liquidate(setup.borrower, collection, 0),
        Err(Error::NotAuthorized.into())
    );

    setup.env.set_caller(setup.admin);
    setup.engine.liquidate(setup.borrower, collection, 0);
    assert!(setup.engine.is_liquidated(collection, 0));
}

#[test]
fn liquidation_is_terminal() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(100), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(100));

    setup.env.set_caller(setup.admin);
    setup.engine.liquidate(setup.borrower, collection, 0);
    assert_eq!(
        setup.engine.try_liquidate(setup.borrower, collection, 0),
        Err(Error::AlreadyLiquidated.into())
    );

    // The staker can no longer draw, repay or reclaim.
    setup.env.set_caller(setup.borrower);
    assert_eq!(
        setup.engine.try_borrow(wad(10), collection, 0),
        Err(Error::AlreadyLiquidated.into())
    );
    assert_eq!(
        setup.engine.try_repay(wad(100), collection, 0),
        Err(Error::AlreadyLiquidated.into())
    );
    assert_eq!(setup.nft.owner_of(0), setup.engine.address());
}

#[test]
fn liquidate_validates_the_target() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);

    setup.env.set_caller(setup.admin);
    // Unknown token id.
    assert_eq!(
        setup.engine.try_liquidate(setup.borrower, collection, 9),
        Err(Error::PositionNotFound.into())
    );
    // Wrong owner for a real position.
    assert_eq!(
        setup.engine.try_liquidate(setup.other, collection, 0),
        Err(Error::PositionNotFound.into())
    );
}

// ====== SYNC ======

#[test]
fn sync_liquidates_breaching_positions_only() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(800), collection, 0);
    setup.engine.stake(collection, 1);
    setup.engine.borrow(wad(100), collection, 1);

    // Floor drops to 880: token 0 sits at ~90.9% LTV, token 1 at ~11.4%.
    setup.env.set_caller(setup.admin);
    setup
        .registry
        .set_floor_price(collection, wad(880), wad(1));
    setup.engine.sync();

    assert!(setup.engine.is_liquidated(collection, 0));
    assert!(!setup.engine.is_liquidated(collection, 1));
    let survivor = setup.engine.get_position(collection, 1).unwrap();
    assert_eq!(survivor.principal, wad(100));
}

#[test]
fn sync_triggers_at_the_exact_threshold() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(90), collection, 0);

    // 90 principal against a floor of 100 is exactly the 90% trigger.
    setup.env.set_caller(setup.admin);
    setup
        .registry
        .set_floor_price(collection, wad(100), wad(1));
    setup.engine.sync();

    assert!(setup.engine.is_liquidated(collection, 0));
}

#[test]
fn sync_skips_undrawn_and_unpriced_positions() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.stake(collection, 1);
    setup.engine.borrow(wad(500), collection, 1);

    // Delisting zeroes the oracle data; neither the undrawn position nor
    // the unpriced one may be touched.
    setup.env.set_caller(setup.admin);
    setup.registry.remove_white_list(collection);
    setup.engine.sync();

    assert!(!setup.engine.is_liquidated(collection, 0));
    assert!(!setup.engine.is_liquidated(collection, 1));
    let position = setup.engine.get_position(collection, 1).unwrap();
    assert_eq!(position.principal, wad(500));
}

#[test]
fn sync_liquidates_every_breaching_position_in_one_sweep() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(800), collection, 0);
    setup.engine.stake(collection, 1);
    setup.engine.borrow(wad(750), collection, 1);

    // Floor drops to 800: token 0 sits at 100% LTV, token 1 at 93.75%.
    // Liquidating the first must not stop the sweep from reaching the
    // second.
    setup.env.set_caller(setup.admin);
    setup
        .registry
        .set_floor_price(collection, wad(800), wad(1));
    setup.engine.sync();

    assert!(setup.engine.is_liquidated(collection, 0));
    assert!(setup.engine.is_liquidated(collection, 1));
    assert!(setup
        .engine
        .get_staked_nft_list(setup.borrower, collection)
        .is_empty());
}

#[test]
fn sync_is_permissionless() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(800), collection, 0);

    setup.env.set_caller(setup.admin);
    setup
        .registry
        .set_floor_price(collection, wad(800), wad(1));

    setup.env.set_caller(setup.other);
    setup.engine.sync();
    assert!(setup.engine.is_liquidated(collection, 0));
}

// ====== VIEWS ======

#[test]
fn staker_list_deduplicates() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.stake(collection, 1);

    assert_eq!(setup.engine.get_user_list(), vec![setup.borrower]);
    assert_eq!(
        setup.engine.get_staked_nft_list(setup.borrower, collection),
        vec![0, 1]
    );
}

#[test]
fn engine_instances_are_independent() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);

    let second = LendingEngine::deploy(
        &setup.env,
        LendingEngineInitArgs {
            risk_registry: setup.registry.address(),
            credit_token: setup.credit.address(),
        },
    );
    assert!(second.get_position(collection, 0).is_none());
    assert!(second.get_user_list().is_empty());
}

#[test]
fn lifecycle_emits_one_event_per_transition() {
    let mut setup = setup();
    let collection = collection(&setup);

    setup.env.set_caller(setup.borrower);
    setup.engine.stake(collection, 0);
    setup.engine.borrow(wad(500), collection, 0);
    setup.credit.approve(setup.engine.address(), wad(200));
    setup.engine.repay(wad(200), collection, 0);

    assert!(setup.env.emitted_event(
        &setup.engine,
        NftStaked {
            staker: setup.borrower,
            collection,
            token_id: 0,
        }
    ));
    assert!(setup.env.emitted_event(
        &setup.engine,
        LoanDrawn {
            staker: setup.borrower,
            collection,
            token_id: 0,
            amount: wad(500),
            principal: wad(500),
        }
    ));
    assert!(setup.env.emitted_event(
        &setup.engine,
        LoanRepaid {
            staker: setup.borrower,
            collection,
            token_id: 0,
            amount: wad(200),
            closed: false,
        }
    ));

    setup.env.set_caller(setup.admin);
    setup.engine.liquidate(setup.borrower, collection, 0);
    assert!(setup.env.emitted_event(
        &setup.engine,
        PositionLiquidated {
            staker: setup.borrower,
            collection,
            token_id: 0,
            principal: wad(300),
        }
    ));
}

#[test]
fn engine_records_its_wiring() {
    let setup = setup();
    assert_eq!(setup.engine.admin(), setup.admin);
    assert_eq!(setup.engine.risk_registry(), setup.registry.address());
    assert_eq!(setup.engine.credit_token(), setup.credit.address());
}
