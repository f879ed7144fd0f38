//! End-to-end ledger transaction tests over the in-memory store.

use microbet::domain::{MarketStatus, Outcome, Username};
use microbet::error::LedgerError;
use microbet::ledger::LedgerEngine;
use microbet::store::MemoryStore;
use microbet::testkit::{seeded_ledger, user};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn balance(ledger: &LedgerEngine<MemoryStore>, name: &str) -> Decimal {
    ledger
        .account(&Username::new(name))
        .await
        .unwrap()
        .unwrap()
        .balance()
}

/// Total currency visible to the system: balances plus stakes committed
/// to open (unsettled) pools.
async fn total_money(ledger: &LedgerEngine<MemoryStore>, names: &[&str]) -> Decimal {
    let mut total = Decimal::ZERO;
    for name in names {
        total += balance(ledger, name).await;
    }
    for market in ledger.markets().await.unwrap() {
        if market.status() == MarketStatus::Open {
            total += market.pool_sum(Outcome::Yes) + market.pool_sum(Outcome::No);
        }
    }
    total
}

#[tokio::test]
async fn placing_bets_conserves_total_money() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(80)), ("carol", dec!(50))])
        .await;
    let names = ["alice", "bob", "carol"];
    let before = total_money(&ledger, &names).await;
    assert_eq!(before, dec!(230));

    let m1 = ledger
        .create_market("First?", "", None, user("bob"))
        .await
        .unwrap();
    let m2 = ledger
        .create_market("Second?", "", None, user("carol"))
        .await
        .unwrap();

    ledger
        .place_bet(m1.id(), user("alice"), Outcome::Yes, dec!(40), None)
        .await
        .unwrap();
    ledger
        .place_bet(m1.id(), user("carol"), Outcome::No, dec!(25), None)
        .await
        .unwrap();
    ledger
        .place_bet(m2.id(), user("bob"), Outcome::Yes, dec!(15.50), None)
        .await
        .unwrap();
    ledger
        .place_bet(m2.id(), user("alice"), Outcome::Yes, dec!(0.01), None)
        .await
        .unwrap();

    assert_eq!(total_money(&ledger, &names).await, before);
}

#[tokio::test]
async fn second_resolution_is_rejected_and_changes_nothing() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100)), ("carol", dec!(100))])
        .await;
    let market = ledger
        .create_market("Once?", "", None, user("bob"))
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(30), None)
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("carol"), Outcome::No, dec!(20), None)
        .await
        .unwrap();

    ledger
        .resolve_market(market.id(), user("bob"), Outcome::Yes, None)
        .await
        .unwrap();
    let alice_after_first = balance(&ledger, "alice").await;
    let carol_after_first = balance(&ledger, "carol").await;

    // Re-running settlement with any arguments must be rejected; a
    // double-pay here would mint money for every winner.
    let err = ledger
        .resolve_market(market.id(), user("bob"), Outcome::No, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::MarketAlreadyResolved { .. }));

    assert_eq!(balance(&ledger, "alice").await, alice_after_first);
    assert_eq!(balance(&ledger, "carol").await, carol_after_first);
}

#[tokio::test]
async fn repeat_bets_on_the_same_side_merge_into_one_stake() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100))]).await;
    let market = ledger
        .create_market("Merge?", "", None, user("bob"))
        .await
        .unwrap();

    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(40), None)
        .await
        .unwrap();
    let (market_snapshot, account) = ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(10), None)
        .await
        .unwrap();

    // One record on each side of the ledger, with the summed amount.
    assert_eq!(market_snapshot.pool(Outcome::Yes).stakes().len(), 1);
    assert_eq!(market_snapshot.pool(Outcome::Yes).stakes()[0].amount, dec!(50));
    assert_eq!(account.stakes().len(), 1);
    assert_eq!(account.stakes()[0].amount, dec!(50));
    assert_eq!(account.balance(), dec!(50));
}

#[tokio::test]
async fn opposite_sides_are_separate_stakes() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100))]).await;
    let market = ledger
        .create_market("Hedge?", "", None, user("bob"))
        .await
        .unwrap();

    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(40), None)
        .await
        .unwrap();
    let (_, account) = ledger
        .place_bet(market.id(), user("alice"), Outcome::No, dec!(10), None)
        .await
        .unwrap();

    assert_eq!(account.stakes().len(), 2);
}

#[tokio::test]
async fn insufficient_balance_leaves_everything_unchanged() {
    let ledger = seeded_ledger(&[("alice", dec!(30)), ("bob", dec!(100))]).await;
    let market = ledger
        .create_market("Broke?", "", None, user("bob"))
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(10), None)
        .await
        .unwrap();

    let account_before = ledger.account(&user("alice")).await.unwrap().unwrap();
    let market_before = ledger.market(market.id()).await.unwrap().unwrap();

    let err = ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(50), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientBalance {
            balance,
            requested,
            ..
        } if balance == dec!(20) && requested == dec!(50)
    ));

    let account_after = ledger.account(&user("alice")).await.unwrap().unwrap();
    let market_after = ledger.market(market.id()).await.unwrap().unwrap();
    assert_eq!(account_before, account_after);
    assert_eq!(market_before, market_after);
}

#[tokio::test]
async fn settlement_redistributes_the_combined_pool_exactly() {
    let ledger = seeded_ledger(&[
        ("ann", dec!(100)),
        ("ben", dec!(100)),
        ("cho", dec!(100)),
        ("dee", dec!(100)),
    ])
    .await;
    let market = ledger
        .create_market("Split?", "", None, user("dee"))
        .await
        .unwrap();

    // Three equal winners against a pool of 100: the exact pro-rata
    // share does not terminate in decimal, so this exercises remainder
    // handling.
    for name in ["ann", "ben", "cho"] {
        ledger
            .place_bet(market.id(), user(name), Outcome::Yes, dec!(10), None)
            .await
            .unwrap();
    }
    ledger
        .place_bet(market.id(), user("dee"), Outcome::No, dec!(100), None)
        .await
        .unwrap();

    let (resolved, winners) = ledger
        .resolve_market(market.id(), user("dee"), Outcome::Yes, None)
        .await
        .unwrap();

    let distributed: Decimal = winners
        .iter()
        .flat_map(|a| a.stakes())
        .filter_map(|s| s.payout)
        .sum();
    let yes_sum = resolved.pool_sum(Outcome::Yes);
    let no_sum = resolved.pool_sum(Outcome::No);
    assert_eq!(distributed, yes_sum + no_sum);

    // The ledger as a whole holds exactly what it started with.
    let mut balances = Decimal::ZERO;
    for name in ["ann", "ben", "cho", "dee"] {
        balances += balance(&ledger, name).await;
    }
    assert_eq!(balances, dec!(400));
}

#[tokio::test]
async fn empty_losing_pool_refunds_every_winner_exactly() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100))]).await;
    let market = ledger
        .create_market("One-sided?", "", None, user("bob"))
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(60), None)
        .await
        .unwrap();

    let (_, winners) = ledger
        .resolve_market(market.id(), user("bob"), Outcome::Yes, None)
        .await
        .unwrap();

    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].balance(), dec!(100));
    assert_eq!(winners[0].stakes()[0].payout, Some(dec!(60)));
}

#[tokio::test]
async fn empty_winning_pool_pays_nobody() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100))]).await;
    let market = ledger
        .create_market("Nobody?", "", None, user("bob"))
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("alice"), Outcome::No, dec!(60), None)
        .await
        .unwrap();

    let (resolved, winners) = ledger
        .resolve_market(market.id(), user("bob"), Outcome::Yes, None)
        .await
        .unwrap();

    assert!(winners.is_empty());
    assert_eq!(resolved.status(), MarketStatus::Resolved);
    // Alice's losing stake stays in the frozen pool, unpaid.
    assert_eq!(balance(&ledger, "alice").await, dec!(40));
    assert_eq!(resolved.pool(Outcome::No).stakes()[0].payout, None);
}

#[tokio::test]
async fn worked_scenario_alice_carol() {
    let ledger = seeded_ledger(&[("alice", dec!(100)), ("bob", dec!(100)), ("carol", dec!(50))])
        .await;
    let market = ledger
        .create_market("M1?", "", None, user("bob"))
        .await
        .unwrap();

    ledger
        .place_bet(market.id(), user("alice"), Outcome::Yes, dec!(40), None)
        .await
        .unwrap();
    ledger
        .place_bet(market.id(), user("carol"), Outcome::No, dec!(50), None)
        .await
        .unwrap();

    let pools_before = (
        ledger.market(market.id()).await.unwrap().unwrap().pool_sum(Outcome::Yes),
        ledger.market(market.id()).await.unwrap().unwrap().pool_sum(Outcome::No),
    );

    let (resolved, _) = ledger
        .resolve_market(market.id(), user("bob"), Outcome::Yes, None)
        .await
        .unwrap();

    // alice: 100 - 40 + (40 + (40/40) * 50) = 150
    assert_eq!(balance(&ledger, "alice").await, dec!(150));
    // carol: 50 - 50 + 0 = 0
    assert_eq!(balance(&ledger, "carol").await, dec!(0));

    // Pools are frozen, not drained, by resolution.
    assert_eq!(resolved.pool_sum(Outcome::Yes), pools_before.0);
    assert_eq!(resolved.pool_sum(Outcome::No), pools_before.1);
    assert_eq!(resolved.status(), MarketStatus::Resolved);
    assert_eq!(resolved.resolution().unwrap().outcome, Outcome::Yes);
    assert_eq!(resolved.resolution().unwrap().resolver, user("bob"));

    // Resolver bookkeeping.
    let bob = ledger.account(&user("bob")).await.unwrap().unwrap();
    assert_eq!(bob.resolved_markets, vec![market.id()]);
}

#[tokio::test]
async fn resolving_a_missing_market_is_market_not_found() {
    let ledger = seeded_ledger(&[("bob", dec!(100))]).await;
    let err = ledger
        .resolve_market(microbet::domain::MarketId::new(404), user("bob"), Outcome::Yes, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::MarketNotFound { .. }));
}
