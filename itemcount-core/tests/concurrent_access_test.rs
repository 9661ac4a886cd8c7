//! Concurrent access tests
//!
//! A single store is shared across threads through `Arc`. Evaluations run
//! alongside authoring writes, and writes for different requirements must
//! never interfere with each other.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

use itemcount_core::adapters::duckdb::DuckDbStore;
use itemcount_core::domain::{CartLine, EvaluationContext, RawSettings, RuleConfiguration};
use itemcount_core::ports::SettingStore;
use itemcount_core::services::{EvaluationRequest, EvaluationService};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 20;

fn create_shared_store(temp_dir: &TempDir) -> Arc<DuckDbStore> {
    let store = DuckDbStore::new(&temp_dir.path().join("test_concurrent.duckdb")).unwrap();
    store.ensure_schema().unwrap();
    Arc::new(store)
}

fn exactly(requirement_id: i64, quantity: i32) -> RawSettings {
    RuleConfiguration::unconstrained(requirement_id)
        .with_quantity_range(quantity, quantity)
        .encode()
}

fn request(requirement_id: i64, quantity: i32) -> EvaluationRequest {
    EvaluationRequest::new(
        requirement_id,
        EvaluationContext::new(1, 1, vec![CartLine::new(1, quantity)]),
    )
}

/// Test: every thread writes its own requirement while others evaluate theirs
#[test]
fn test_disjoint_requirements_written_concurrently() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_shared_store(&temp_dir);

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let mismatch_count = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let barrier = Arc::clone(&barrier);
        let store = Arc::clone(&store);
        let mismatch_count = Arc::clone(&mismatch_count);

        let handle = thread::spawn(move || {
            let requirement_id = thread_id as i64 + 1;
            let service = EvaluationService::new(store.clone());

            // Wait for all threads to be ready
            barrier.wait();

            for i in 0..ITERATIONS_PER_THREAD {
                let quantity = i as i32 + 1;
                store
                    .store_requirement_settings(requirement_id, &exactly(requirement_id, quantity))
                    .unwrap();

                // Our own last write must be what we read back
                if !service.is_satisfied(&request(requirement_id, quantity)) {
                    mismatch_count.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(mismatch_count.load(Ordering::SeqCst), 0);

    // Final state holds the last value written by each thread
    let last = ITERATIONS_PER_THREAD as i32;
    for thread_id in 0..THREAD_COUNT {
        let requirement_id = thread_id as i64 + 1;
        let raw = store.load_requirement_settings(requirement_id).unwrap();
        assert_eq!(raw, exactly(requirement_id, last));
    }
    assert_eq!(store.list_requirement_settings().unwrap().len(), THREAD_COUNT * 4);
}

/// Test: many readers evaluate one requirement at the same time
#[test]
fn test_concurrent_evaluations_agree() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_shared_store(&temp_dir);
    store.store_requirement_settings(1, &exactly(1, 2)).unwrap();

    let service = Arc::new(EvaluationService::new(store.clone()));
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..ITERATIONS_PER_THREAD)
                    .map(|i| {
                        let quantity = (i % 4) as i32;
                        service.is_satisfied(&request(1, quantity)) == (quantity == 2)
                    })
                    .all(|ok| ok)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("Thread panicked"));
    }
}

/// Test: requirement ids handed out concurrently are unique
#[test]
fn test_concurrent_requirement_inserts_get_unique_ids() {
    use itemcount_core::ports::RequirementRegistry;

    let temp_dir = TempDir::new().unwrap();
    let store = create_shared_store(&temp_dir);
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..ITERATIONS_PER_THREAD)
                    .map(|_| store.insert_requirement(7, "DiscountRequirement.ItemCount").unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("Thread panicked"))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), THREAD_COUNT * ITERATIONS_PER_THREAD);
    assert!(ids.iter().all(|&id| id > 0));
}
