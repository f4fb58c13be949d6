//! Concurrency properties of the funds core on the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use wallet_ledger::config::FundsConfig;
use wallet_ledger::{
    Amount, Funds, FundsError, FundsService, MemoryStore, OwnerId, TransactionStatus,
    UnitOfWorkSource, WalletStore,
};

fn setup() -> (Arc<MemoryStore>, Arc<Funds<MemoryStore>>) {
    let config = FundsConfig::default();
    let store = Arc::new(MemoryStore::new(config.lock_timeout()));
    let funds = Arc::new(Funds::new(store.clone(), &config));
    (store, funds)
}

async fn balance(funds: &Funds<MemoryStore>, owner: OwnerId) -> Amount {
    funds.balance(owner).await.unwrap().balance
}

/// Small deterministic generator so runs are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_transfers_do_not_deadlock() {
    let (store, funds) = setup();
    let a = OwnerId::new();
    let b = OwnerId::new();
    store.seed_wallet(a, Amount::from_cents(10_000));
    store.seed_wallet(b, Amount::from_cents(5_000));

    const ROUNDS: i64 = 50;
    let mut handles = Vec::new();
    for _ in 0..ROUNDS {
        let f1 = funds.clone();
        let f2 = funds.clone();
        handles.push(tokio::spawn(async move {
            f1.transfer(a, b, Amount::from_cents(1_000)).await
        }));
        handles.push(tokio::spawn(async move {
            f2.transfer(b, a, Amount::from_cents(500)).await
        }));
    }

    let all = tokio::time::timeout(Duration::from_secs(30), futures::future::join_all(handles))
        .await
        .expect("transfers must terminate");

    let mut ok_ab = 0;
    let mut ok_ba = 0;
    for result in all {
        match result.unwrap() {
            Ok(entry) if entry.sender_id == Some(a) => ok_ab += 1,
            Ok(_) => ok_ba += 1,
            Err(e) => assert_eq!(e, FundsError::InsufficientBalance),
        }
    }

    let expected_a = 10_000 - 1_000 * ok_ab + 500 * ok_ba;
    let expected_b = 5_000 + 1_000 * ok_ab - 500 * ok_ba;
    assert_eq!(balance(&funds, a).await, Amount::from_cents(expected_a));
    assert_eq!(balance(&funds, b).await, Amount::from_cents(expected_b));
    assert_eq!(store.total_balance().await, Some(Amount::from_cents(15_000)));
    assert!(ok_ab + ok_ba > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_opposite_pair_matches_serial_order() {
    let (store, funds) = setup();
    let a = OwnerId::new();
    let b = OwnerId::new();
    store.seed_wallet(a, Amount::from_cents(10_000));
    store.seed_wallet(b, Amount::from_cents(5_000));

    let (r1, r2) = tokio::join!(
        funds.transfer(a, b, Amount::from_cents(1_000)),
        funds.transfer(b, a, Amount::from_cents(500)),
    );
    r1.unwrap();
    r2.unwrap();

    assert_eq!(balance(&funds, a).await, Amount::from_cents(9_500));
    assert_eq!(balance(&funds, b).await, Amount::from_cents(5_500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_random_transfers_conserve_total() {
    let (store, funds) = setup();
    let owners: Vec<OwnerId> = (0..8).map(|_| OwnerId::new()).collect();
    for owner in &owners {
        store.seed_wallet(*owner, Amount::from_cents(100_000));
    }
    let initial_total = store.total_balance().await.unwrap();

    let mut rng = Lcg(42);
    let mut handles = Vec::new();
    for _ in 0..400 {
        let from = owners[(rng.next() % 8) as usize];
        let mut to = owners[(rng.next() % 8) as usize];
        if to == from {
            to = owners[(owners.iter().position(|o| *o == from).unwrap() + 1) % 8];
        }
        let amount = Amount::from_cents((rng.next() % 50_000) as i64 + 1);
        let funds = funds.clone();
        handles.push(tokio::spawn(async move { funds.transfer(from, to, amount).await }));
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(FundsError::InsufficientBalance) => failed += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(store.total_balance().await, Some(initial_total));
    for owner in &owners {
        assert!(!balance(&funds, *owner).await.is_negative());
    }

    // Exactly one ledger entry per attempt, with matching outcome
    let ledger = store.ledger_snapshot().await;
    assert_eq!(ledger.len(), succeeded + failed);
    let failed_entries = ledger
        .iter()
        .filter(|e| e.status == TransactionStatus::Failed)
        .count();
    assert_eq!(failed_entries, failed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraw_never_goes_negative() {
    let (store, funds) = setup();
    let sender = OwnerId::new();
    store.seed_wallet(sender, Amount::from_cents(10_000));
    let receivers: Vec<OwnerId> = (0..20).map(|_| OwnerId::new()).collect();
    for r in &receivers {
        store.seed_wallet(*r, Amount::ZERO);
    }

    let handles: Vec<_> = receivers
        .iter()
        .map(|r| {
            let funds = funds.clone();
            let r = *r;
            tokio::spawn(async move { funds.transfer(sender, r, Amount::from_cents(1_000)).await })
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    let successes = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    assert_eq!(successes, 10);
    assert_eq!(balance(&funds, sender).await, Amount::ZERO);
    assert_eq!(store.total_balance().await, Some(Amount::from_cents(10_000)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_half_a_transfer() {
    let (store, funds) = setup();
    let a = OwnerId::new();
    let b = OwnerId::new();
    store.seed_wallet(a, Amount::from_cents(50_000));
    store.seed_wallet(b, Amount::from_cents(50_000));
    let expected = Some(Amount::from_cents(100_000));

    let writer = {
        let funds = funds.clone();
        tokio::spawn(async move {
            for i in 0..500 {
                let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
                funds.transfer(from, to, Amount::from_cents(1_000)).await.unwrap();
            }
        })
    };

    let mut reads = 0u32;
    while !writer.is_finished() {
        assert_eq!(store.total_balance().await, expected, "after {reads} reads");
        reads += 1;
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(store.total_balance().await, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_pairs_do_not_wait() {
    let config = FundsConfig {
        lock_timeout_ms: 200,
        ..FundsConfig::default()
    };
    let store = Arc::new(MemoryStore::new(config.lock_timeout()));
    let funds = Funds::new(store.clone(), &config);
    let (a, b, c) = (OwnerId::new(), OwnerId::new(), OwnerId::new());
    for owner in [a, b, c] {
        store.seed_wallet(owner, Amount::from_cents(1_000));
    }

    // An unrelated unit of work holds C for the whole test
    let mut holder = store.begin().await.unwrap();
    store.lock_for_update(c, &mut holder).await.unwrap();

    funds.transfer(a, b, Amount::from_cents(100)).await.unwrap();

    let err = funds.transfer(a, c, Amount::from_cents(100)).await.unwrap_err();
    assert_eq!(err, FundsError::LockTimeout);
    // The timed-out transfer released A
    funds.transfer(a, b, Amount::from_cents(100)).await.unwrap();
    drop(holder);
}

#[tokio::test]
async fn test_concrete_scenario() {
    let (store, funds) = setup();
    let a = OwnerId::new();
    let b = OwnerId::new();
    store.seed_wallet(a, Amount::from_cents(10_000));
    store.seed_wallet(b, Amount::from_cents(5_000));

    let entry = funds.transfer(a, b, Amount::from_cents(3_000)).await.unwrap();
    assert_eq!(entry.status, TransactionStatus::Success);
    assert_eq!(balance(&funds, a).await, Amount::from_cents(7_000));
    assert_eq!(balance(&funds, b).await, Amount::from_cents(8_000));

    let wallet = funds.top_up(a, Amount::from_cents(2_000)).await.unwrap();
    assert_eq!(wallet.balance, Amount::from_cents(9_000));

    let history = funds.history(a, Some(2)).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].sender_id, None);
    assert_eq!(history[0].amount, Amount::from_cents(2_000));
    assert_eq!(history[1].id, entry.id);
}
