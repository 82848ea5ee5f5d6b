//! Concurrent access tests
//!
//! The ledger engine is pure and may be called from many threads at once;
//! the DuckDB repository serializes access through its connection mutex.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;

use evensplit_core::adapters::duckdb::DuckDbRepository;
use evensplit_core::services::GroupService;
use evensplit_core::{compute_net_balances, simplify_debts, Expense, NetBalances, Settlement};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 5;

/// Every thread computes the same group and must get the same answer
#[test]
fn test_engine_is_deterministic_across_threads() {
    let members: Arc<BTreeSet<i64>> = Arc::new((1..=9).collect());
    let expenses: Arc<Vec<Expense<i64>>> = Arc::new(
        (0..60)
            .map(|i| Expense::new(1 + (i * 5) % 9, Decimal::new(1000 + i * 77, 2)))
            .collect(),
    );
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let members = Arc::clone(&members);
            let expenses = Arc::clone(&expenses);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut results: Vec<(NetBalances<i64>, Vec<Settlement<i64>>)> = Vec::new();
                for _ in 0..ITERATIONS_PER_THREAD {
                    let net = compute_net_balances(&members, &expenses).unwrap();
                    let plan = simplify_debts(&net);
                    results.push((net, plan));
                }
                results
            })
        })
        .collect();

    let all: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("thread panicked"))
        .collect();

    assert_eq!(all.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert!(all.iter().all(|r| *r == all[0]));
}

/// Threads sharing one repository record expenses into the same group
#[test]
fn test_shared_repository_concurrent_expenses() {
    let repo = DuckDbRepository::in_memory().unwrap();
    repo.ensure_schema().unwrap();
    let service = Arc::new(GroupService::new(Arc::new(repo)));

    let ids: Vec<i64> = (0..THREAD_COUNT)
        .map(|i| service.create_user(&format!("User {}", i)).unwrap().id)
        .collect();
    let group_id = service.create_group("Shared", &ids).unwrap().id;
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|payer| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ITERATIONS_PER_THREAD {
                    service
                        .add_expense(group_id, payer, Decimal::from(12), "round")
                        .expect("expense insert failed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let detail = service.group_detail(group_id).unwrap();
    assert_eq!(detail.expenses.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);

    // everyone paid the same total, so nobody owes anything
    let net = service.balances(group_id).unwrap();
    assert!(net.values().all(|b| b.is_zero()));
    assert!(service.settle(group_id).unwrap().is_empty());
}
