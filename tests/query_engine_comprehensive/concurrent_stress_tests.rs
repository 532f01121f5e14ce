//! Concurrent Stress Tests
//!
//! High-volume and high-concurrency tests for a database shared across
//! threads: registration races, disjoint and contended writes, and
//! integrity of store contents under load.

use crate::test_utils::book_db;
use reposit::{Database, EntityType, Error, RecordId, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;

// ============================================================================
// Configuration
// ============================================================================

const LIGHT_THREADS: usize = 4;
const MEDIUM_THREADS: usize = 8;
const HEAVY_THREADS: usize = 16;
const RECORDS_PER_THREAD_LIGHT: usize = 50;
const RECORDS_PER_THREAD_MEDIUM: usize = 100;

// ============================================================================
// High Concurrency Tests
// ============================================================================

mod high_concurrency {
    use super::*;

    #[test]
    fn test_many_threads_disjoint_creates() {
        let (_db, books) = book_db();

        let handles: Vec<_> = (0..MEDIUM_THREADS)
            .map(|thread_id| {
                let books = books.clone();
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    for i in 0..RECORDS_PER_THREAD_MEDIUM {
                        let record = books
                            .create([
                                ("title", Value::from(format!("t{}_b{}", thread_id, i))),
                                ("pages", Value::from((thread_id * 1000 + i) as i64)),
                            ])
                            .unwrap();
                        ids.push(record.id());
                    }
                    ids
                })
            })
            .collect();

        let mut all_ids: HashSet<RecordId> = HashSet::new();
        for h in handles {
            all_ids.extend(h.join().unwrap());
        }

        let expected = MEDIUM_THREADS * RECORDS_PER_THREAD_MEDIUM;
        assert_eq!(all_ids.len(), expected, "Duplicate identities handed out!");
        assert_eq!(books.count(), expected);
    }

    #[test]
    fn test_registration_race_has_a_single_winner() {
        let db = Database::new();
        let barrier = Arc::new(Barrier::new(HEAVY_THREADS));
        let wins = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..HEAVY_THREADS)
            .map(|_| {
                let db = db.clone();
                let barrier = Arc::clone(&barrier);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    barrier.wait();
                    match db.register(EntityType::new("Contested").attribute("n")) {
                        Ok(_) => {
                            wins.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            assert!(matches!(e, Error::DuplicateEntity { .. }));
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::Relaxed), 1);
        assert!(db.is_registered("Contested"));
        assert_eq!(db.manager("Contested").unwrap().count(), 0);
    }

    #[test]
    fn test_readers_observe_monotone_growth() {
        let (_db, books) = book_db();
        let barrier = Arc::new(Barrier::new(MEDIUM_THREADS));

        let handles: Vec<_> = (0..MEDIUM_THREADS)
            .map(|thread_id| {
                let books = books.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if thread_id % 2 == 0 {
                        // Writer: append full records
                        for i in 0..RECORDS_PER_THREAD_LIGHT {
                            books
                                .create([
                                    ("title", Value::from(format!("w{}_{}", thread_id, i))),
                                    ("lang", Value::from("en")),
                                ])
                                .unwrap();
                        }
                    } else {
                        // Reader: the store only grows, so observed counts
                        // must never go backwards
                        let mut last = 0;
                        for _ in 0..RECORDS_PER_THREAD_LIGHT {
                            let n = books.filter(("lang", "en")).unwrap().count();
                            assert!(n >= last, "count went backwards: {} < {}", n, last);
                            last = n;
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let expected = (MEDIUM_THREADS / 2) * RECORDS_PER_THREAD_LIGHT;
        assert_eq!(books.count(), expected);
    }
}

// ============================================================================
// Contended Mutation Tests
// ============================================================================

mod contention {
    use super::*;

    #[test]
    fn test_disjoint_attribute_writers_on_one_record() {
        let (_db, books) = book_db();
        let record = books.create([("title", "shared")]).unwrap();
        let barrier = Arc::new(Barrier::new(MEDIUM_THREADS));

        let handles: Vec<_> = (0..MEDIUM_THREADS)
            .map(|thread_id| {
                let record = record.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let attr = format!("slot_{}", thread_id);
                    for i in 0..RECORDS_PER_THREAD_LIGHT {
                        record.set(&attr, i as i64).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        // Every thread's final write survives on its own attribute
        for thread_id in 0..MEDIUM_THREADS {
            assert_eq!(
                record.get(&format!("slot_{}", thread_id)),
                Some(Value::Int(RECORDS_PER_THREAD_LIGHT as i64 - 1))
            );
        }
        assert_eq!(record.get("title"), Some(Value::from("shared")));
    }

    #[test]
    fn test_hot_attribute_last_write_wins() {
        let (_db, books) = book_db();
        let record = books.create([("pages", Value::from(0))]).unwrap();
        let barrier = Arc::new(Barrier::new(HEAVY_THREADS));

        let handles: Vec<_> = (0..HEAVY_THREADS)
            .map(|thread_id| {
                let record = record.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    record.set("pages", thread_id as i64 + 1).unwrap();
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        // No torn or lost write: the surviving value is one that was written
        let final_pages = record.get("pages").and_then(|v| v.as_int()).unwrap();
        assert!((1..=HEAVY_THREADS as i64).contains(&final_pages));
    }
}

// ============================================================================
// Data Integrity Under Load Tests
// ============================================================================

mod data_integrity {
    use super::*;

    #[test]
    fn test_no_lost_records_under_create_delete_mix() {
        let (_db, books) = book_db();
        let removed = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..LIGHT_THREADS)
            .map(|thread_id| {
                let books = books.clone();
                let removed = Arc::clone(&removed);
                thread::spawn(move || {
                    let mut mine = Vec::new();
                    for i in 0..RECORDS_PER_THREAD_MEDIUM {
                        let record = books
                            .create([("title", Value::from(format!("t{}_{}", thread_id, i)))])
                            .unwrap();
                        mine.push(record);
                    }
                    // Delete every other record this thread created
                    for record in mine.iter().step_by(2) {
                        books.remove(record).unwrap();
                        removed.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let created = (LIGHT_THREADS * RECORDS_PER_THREAD_MEDIUM) as u64;
        let removed = removed.load(Ordering::Relaxed);
        assert_eq!(
            books.count() as u64,
            created - removed,
            "Lost records! {} created, {} removed, {} remain",
            created,
            removed,
            books.count()
        );
    }

    #[test]
    fn test_double_remove_has_a_single_winner() {
        let (_db, books) = book_db();
        let record = books.create([("title", "contested")]).unwrap();
        let barrier = Arc::new(Barrier::new(HEAVY_THREADS));
        let wins = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..HEAVY_THREADS)
            .map(|_| {
                let books = books.clone();
                let record = record.clone();
                let barrier = Arc::clone(&barrier);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    barrier.wait();
                    match books.remove(&record) {
                        Ok(()) => {
                            wins.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            assert!(matches!(e, Error::Corruption(_)));
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::Relaxed), 1);
        assert_eq!(books.count(), 0);
    }

    #[test]
    fn test_results_stay_frozen_while_writers_run() {
        let (_db, books) = book_db();
        for i in 0..10 {
            books.create([("pages", Value::from(i))]).unwrap();
        }

        let frozen = books.all();
        assert_eq!(frozen.count(), 10);

        let handles: Vec<_> = (0..LIGHT_THREADS)
            .map(|_| {
                let books = books.clone();
                thread::spawn(move || {
                    for i in 0..RECORDS_PER_THREAD_LIGHT {
                        books.create([("pages", Value::from(100 + i as i64))]).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        // The result taken before the writers started never moves
        assert_eq!(frozen.count(), 10);
        assert_eq!(
            books.count(),
            10 + LIGHT_THREADS * RECORDS_PER_THREAD_LIGHT
        );
    }
}

// ============================================================================
// Throughput Tests
// ============================================================================

mod throughput {
    use super::*;

    #[test]
    fn test_single_thread_create_throughput() {
        let (_db, books) = book_db();

        let num_records = 1000;
        let start = Instant::now();
        for i in 0..num_records {
            books
                .create([
                    ("title", Value::from(format!("b{}", i))),
                    ("pages", Value::from(i as i64)),
                ])
                .unwrap();
        }
        let elapsed = start.elapsed();
        let rps = num_records as f64 / elapsed.as_secs_f64();

        println!(
            "Single-thread create throughput: {} records in {:?} ({:.0} RPS)",
            num_records, elapsed, rps
        );

        assert_eq!(books.count(), num_records);
        // Should be reasonably fast (at least 1000 creates/sec in memory)
        assert!(rps > 1000.0);
    }

    #[test]
    fn test_concurrent_scan_throughput() {
        let (_db, books) = book_db();
        for i in 0..1000 {
            books
                .create([
                    ("pages", Value::from(i as i64)),
                    ("lang", Value::from(if i % 3 == 0 { "fr" } else { "en" })),
                ])
                .unwrap();
        }

        let scans = Arc::new(AtomicU64::new(0));
        let start = Instant::now();

        let handles: Vec<_> = (0..LIGHT_THREADS)
            .map(|_| {
                let books = books.clone();
                let scans = Arc::clone(&scans);
                thread::spawn(move || {
                    for threshold in 0..RECORDS_PER_THREAD_LIGHT {
                        let n = books
                            .filter(("pages__gte", threshold as i64 * 10))
                            .unwrap()
                            .count();
                        assert_eq!(n, 1000 - threshold * 10);
                        scans.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let elapsed = start.elapsed();
        let total = scans.load(Ordering::Relaxed);
        println!(
            "Concurrent scan throughput: {} filtered scans in {:?} ({:.0} scans/sec)",
            total,
            elapsed,
            total as f64 / elapsed.as_secs_f64()
        );
    }
}
