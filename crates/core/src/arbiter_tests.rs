use super::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const SETTLE: Duration = Duration::from_millis(50);
const DEADLINE: Duration = Duration::from_secs(5);

/// Two consumers that may each hold both units of a single resource
fn contended_pair() -> Arc<Arbiter> {
    Arc::new(Arbiter::new(vec![2], vec![vec![2], vec![2]]).unwrap())
}

#[test]
fn new_arbiter_allocates_nothing() {
    let arbiter = Arbiter::new(vec![3, 3, 2], vec![vec![1, 2, 0], vec![3, 0, 2]]).unwrap();
    let snapshot = arbiter.snapshot();

    assert_eq!(snapshot.ledger.available(), &[3, 3, 2]);
    assert_eq!(arbiter.current_allocation_row(1).unwrap(), vec![0, 0, 0]);
    assert_eq!(arbiter.current_need(1, 2).unwrap(), 2);
    assert_eq!(snapshot.stats, ArbiterStats::default());
}

#[test]
fn construction_rejects_mismatched_rows() {
    let err = Arbiter::new(vec![1, 1], vec![vec![1, 1], vec![1]]).err();
    assert_eq!(
        err,
        Some(ConfigError::RowLength {
            consumer: 1,
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn construction_rejects_maximum_above_supply() {
    let err = Arbiter::new(vec![2, 0, 0], vec![vec![1, 0, 0], vec![3, 0, 0]]).err();
    assert_eq!(
        err,
        Some(ConfigError::MaximumExceedsSupply {
            consumer: 1,
            resource: 0,
            maximum: 3,
            supply: 2
        })
    );
}

#[test]
fn request_beyond_need_is_rejected_without_mutation() {
    let arbiter = Arbiter::new(vec![2, 0, 0], vec![vec![1, 0, 0]]).unwrap();

    for _ in 0..3 {
        let err = arbiter.try_request(0, &[1, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            ArbiterError::ExceedsDeclaredMaximum {
                consumer: 0,
                resource: 2,
                requested: 1,
                need: 0
            }
        );
    }

    let snapshot = arbiter.snapshot();
    assert_eq!(snapshot.ledger.available(), &[2, 0, 0]);
    assert_eq!(snapshot.ledger.allocation(), &[vec![0, 0, 0]]);
    assert_eq!(snapshot.stats.rejections, 3);
}

#[tokio::test]
async fn blocking_request_beyond_need_returns_immediately() {
    let arbiter = Arbiter::new(vec![2, 0, 0], vec![vec![1, 0, 0]]).unwrap();

    let result = timeout(DEADLINE, arbiter.request(0, &[1, 0, 1])).await.unwrap();

    assert!(matches!(
        result,
        Err(ArbiterError::ExceedsDeclaredMaximum { .. })
    ));
    assert_eq!(arbiter.snapshot().ledger.available(), &[2, 0, 0]);
}

#[tokio::test]
async fn granted_request_updates_ledger() {
    let arbiter = Arbiter::new(vec![3, 3, 2], vec![vec![1, 2, 0], vec![3, 0, 2]]).unwrap();

    arbiter.request(1, &[2, 0, 1]).await.unwrap();

    let snapshot = arbiter.snapshot();
    assert_eq!(snapshot.ledger.available(), &[1, 3, 1]);
    assert_eq!(arbiter.current_allocation_row(1).unwrap(), vec![2, 0, 1]);
    assert_eq!(arbiter.current_need_row(1).unwrap(), vec![1, 0, 1]);
    assert_eq!(snapshot.stats.grants, 1);
    assert!(snapshot.ledger.is_safe());
    snapshot.ledger.check_invariants().unwrap();
}

#[test]
fn release_returns_units_and_restores_need() {
    let arbiter = Arbiter::new(vec![4], vec![vec![3]]).unwrap();
    assert_eq!(arbiter.try_request(0, &[3]).unwrap(), Attempt::Granted);

    arbiter.release(0, &[2]).unwrap();

    assert_eq!(arbiter.current_allocation_row(0).unwrap(), vec![1]);
    assert_eq!(arbiter.current_need(0, 0).unwrap(), 2);
    assert_eq!(arbiter.snapshot().ledger.available(), &[3]);
}

#[test]
fn release_beyond_allocation_is_rejected() {
    let arbiter = Arbiter::new(vec![4], vec![vec![3]]).unwrap();
    arbiter.try_request(0, &[1]).unwrap();

    let err = arbiter.release(0, &[2]).unwrap_err();

    assert_eq!(
        err,
        ArbiterError::ExceedsCurrentAllocation {
            consumer: 0,
            resource: 0,
            released: 2,
            held: 1
        }
    );
    assert_eq!(arbiter.current_allocation_row(0).unwrap(), vec![1]);
    assert_eq!(arbiter.snapshot().ledger.available(), &[3]);
}

#[test]
fn usage_errors_name_the_bad_index() {
    let arbiter = Arbiter::new(vec![1, 1], vec![vec![1, 1]]).unwrap();

    assert_eq!(
        arbiter.try_request(4, &[0, 0]).unwrap_err(),
        ArbiterError::UnknownConsumer {
            consumer: 4,
            consumers: 1
        }
    );
    assert_eq!(
        arbiter.release(0, &[0]).unwrap_err(),
        ArbiterError::DimensionMismatch {
            expected: 2,
            found: 1
        }
    );
    assert_eq!(
        arbiter.current_need(0, 2).unwrap_err(),
        ArbiterError::UnknownResource {
            resource: 2,
            resources: 2
        }
    );
}

#[test]
fn covered_but_unsafe_request_is_deferred() {
    let arbiter = contended_pair();
    assert_eq!(arbiter.try_request(0, &[1]).unwrap(), Attempt::Granted);

    // one unit each and one more needed each: nobody could finish
    assert_eq!(arbiter.try_request(1, &[1]).unwrap(), Attempt::Unsafe);

    let snapshot = arbiter.snapshot();
    assert_eq!(snapshot.ledger.available(), &[1]);
    assert_eq!(snapshot.stats.deferrals, 1);
}

#[test]
fn uncovered_request_is_insufficient() {
    let arbiter = contended_pair();
    arbiter.try_request(0, &[2]).unwrap();

    assert_eq!(arbiter.try_request(1, &[1]).unwrap(), Attempt::Insufficient);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn release_wakes_request_waiting_for_resources() {
    let arbiter = contended_pair();
    arbiter.request(0, &[2]).await.unwrap();

    let waiter = {
        let arbiter = Arc::clone(&arbiter);
        tokio::spawn(async move { arbiter.request(1, &[2]).await })
    };
    tokio::time::sleep(SETTLE).await;
    assert!(!waiter.is_finished());

    arbiter.release(0, &[2]).unwrap();

    timeout(DEADLINE, waiter).await.unwrap().unwrap().unwrap();
    assert_eq!(arbiter.current_allocation_row(1).unwrap(), vec![2]);
    assert_eq!(arbiter.snapshot().ledger.available(), &[0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unsafe_request_completes_once_the_other_consumer_finishes() {
    let arbiter = contended_pair();
    arbiter.request(0, &[1]).await.unwrap();

    let waiter = {
        let arbiter = Arc::clone(&arbiter);
        tokio::spawn(async move { arbiter.request(1, &[1]).await })
    };
    tokio::time::sleep(SETTLE).await;
    assert!(!waiter.is_finished());

    // consumer 0 can still be granted its remainder, then gives everything back
    timeout(DEADLINE, arbiter.request(0, &[1]))
        .await
        .unwrap()
        .unwrap();
    arbiter.release(0, &[2]).unwrap();

    timeout(DEADLINE, waiter).await.unwrap().unwrap().unwrap();
    let snapshot = arbiter.snapshot();
    assert_eq!(snapshot.ledger.allocation(), &[vec![0], vec![1]]);
    assert!(snapshot.ledger.is_safe());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_waiter_takes_nothing() {
    let arbiter = contended_pair();
    arbiter.request(0, &[2]).await.unwrap();

    let cancel = CancellationToken::new();
    let waiter = {
        let arbiter = Arc::clone(&arbiter);
        let cancel = cancel.clone();
        tokio::spawn(async move { arbiter.request_with_cancel(1, &[1], &cancel).await })
    };
    tokio::time::sleep(SETTLE).await;

    cancel.cancel();

    let result = timeout(DEADLINE, waiter).await.unwrap().unwrap();
    assert_eq!(result, Err(ArbiterError::Cancelled { consumer: 1 }));
    let snapshot = arbiter.snapshot();
    assert_eq!(snapshot.ledger.allocation(), &[vec![2], vec![0]]);
    assert_eq!(snapshot.stats.cancellations, 1);

    // the arbiter keeps working for everyone else
    arbiter.release(0, &[2]).unwrap();
    assert_eq!(arbiter.try_request(1, &[2]).unwrap(), Attempt::Granted);
}

#[tokio::test]
async fn dropped_request_future_takes_nothing() {
    let arbiter = contended_pair();
    arbiter.request(0, &[2]).await.unwrap();

    let outcome = timeout(SETTLE, arbiter.request(1, &[1])).await;

    assert!(outcome.is_err());
    assert_eq!(arbiter.current_allocation_row(1).unwrap(), vec![0]);
    arbiter.snapshot().ledger.check_invariants().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_release_wakes_every_waiter() {
    let arbiter = Arc::new(Arbiter::new(vec![3], vec![vec![3], vec![1], vec![1], vec![1]]).unwrap());
    arbiter.request(0, &[3]).await.unwrap();

    let waiters: Vec<_> = (1..4)
        .map(|consumer| {
            let arbiter = Arc::clone(&arbiter);
            tokio::spawn(async move { arbiter.request(consumer, &[1]).await })
        })
        .collect();
    tokio::time::sleep(SETTLE).await;

    arbiter.release(0, &[3]).unwrap();

    for waiter in waiters {
        timeout(DEADLINE, waiter).await.unwrap().unwrap().unwrap();
    }
    assert_eq!(arbiter.snapshot().ledger.available(), &[0]);
}

#[test]
fn snapshot_serializes_ledger_and_stats() {
    let arbiter = Arbiter::new(vec![1], vec![vec![1]]).unwrap();
    arbiter.try_request(0, &[1]).unwrap();

    let json = serde_json::to_value(arbiter.snapshot()).unwrap();

    assert_eq!(json["ledger"]["allocation"], serde_json::json!([[1]]));
    assert_eq!(json["stats"]["grants"], 1);
}
