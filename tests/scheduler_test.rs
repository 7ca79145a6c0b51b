//! End-to-end behaviour of the scheduler

use parking_lot::Mutex;
use priority_scheduler::prelude::*;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scheduler(num_workers: usize) -> Scheduler {
    init_logging();
    let config = SchedulerConfig::new(num_workers).with_poll_interval(Duration::from_millis(10));
    Scheduler::with_config(config).expect("Failed to create scheduler")
}

/// Occupies the scheduler's only worker until the returned sender is dropped
fn block_worker(scheduler: &Scheduler) -> mpsc::Sender<()> {
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, started_rx) = mpsc::channel();
    scheduler
        .execute_with_priority(
            move || {
                started_tx.send(()).ok();
                let _ = release_rx.recv();
                Ok(())
            },
            i64::MAX,
        )
        .expect("Failed to submit blocking job");
    started_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("Blocking job never started");
    release_tx
}

fn wait_for(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_every_job_runs_exactly_once() {
    let scheduler = scheduler(4);
    scheduler.start().unwrap();

    let executed = Arc::new(Mutex::new(Vec::new()));
    for id in 0..200 {
        let executed = Arc::clone(&executed);
        scheduler
            .execute(move || {
                executed.lock().push(id);
                Ok(())
            })
            .unwrap();
    }

    assert!(wait_for(|| executed.lock().len() >= 200, Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(50));

    let executed = executed.lock();
    assert_eq!(executed.len(), 200);
    let unique: HashSet<_> = executed.iter().copied().collect();
    assert_eq!(unique, (0..200).collect::<HashSet<_>>());

    scheduler.shutdown();
}

#[test]
fn test_priority_order_with_one_worker() {
    let scheduler = scheduler(1);
    scheduler.start().unwrap();

    let release = block_worker(&scheduler);
    let results = Arc::new(Mutex::new(Vec::new()));
    for (value, priority) in [(1, Priority::Low), (2, Priority::High), (3, Priority::Medium)] {
        let results = Arc::clone(&results);
        scheduler
            .execute_with_priority(
                move || {
                    results.lock().push(value);
                    Ok(())
                },
                priority,
            )
            .unwrap();
    }
    drop(release);

    assert!(wait_for(|| results.lock().len() == 3, Duration::from_secs(2)));
    assert_eq!(*results.lock(), vec![2, 3, 1]);

    scheduler.shutdown();
}

#[test]
fn test_fifo_among_equal_priorities() {
    let scheduler = scheduler(1);
    scheduler.start().unwrap();

    let release = block_worker(&scheduler);
    let results = Arc::new(Mutex::new(Vec::new()));
    for value in 0..5 {
        let results = Arc::clone(&results);
        scheduler
            .execute(move || {
                results.lock().push(value);
                Ok(())
            })
            .unwrap();
    }
    drop(release);

    assert!(wait_for(|| results.lock().len() == 5, Duration::from_secs(2)));
    assert_eq!(*results.lock(), vec![0, 1, 2, 3, 4]);

    scheduler.shutdown();
}

#[test]
fn test_raw_integer_priorities_order_against_named_levels() {
    let scheduler = scheduler(1);
    scheduler.start().unwrap();

    let release = block_worker(&scheduler);
    let results = Arc::new(Mutex::new(Vec::new()));
    let mut submissions: Vec<i64> = vec![
        Priority::Low.into(),
        Priority::Medium.into(),
        Priority::High.into(),
        0,
        5,
        -3,
        42,
    ];
    submissions.shuffle(&mut rand::thread_rng());

    for priority in submissions.iter().copied() {
        let results = Arc::clone(&results);
        scheduler
            .execute_with_priority(
                move || {
                    results.lock().push(priority);
                    Ok(())
                },
                priority,
            )
            .unwrap();
    }
    drop(release);

    assert!(wait_for(
        || results.lock().len() == submissions.len(),
        Duration::from_secs(2)
    ));
    assert_eq!(*results.lock(), vec![42, 5, 3, 2, 1, 0, -3]);

    scheduler.shutdown();
}

#[test]
fn test_concurrent_submission_assigns_unique_sequences() {
    let scheduler = Arc::new(scheduler(4));
    scheduler.start().unwrap();

    let mut handles = vec![];
    for _ in 0..10 {
        let scheduler = Arc::clone(&scheduler);
        handles.push(thread::spawn(move || {
            (0..100)
                .map(|_| scheduler.execute(|| Ok(())).expect("submit failed"))
                .collect::<Vec<u64>>()
        }));
    }

    let mut sequences = HashSet::new();
    for handle in handles {
        let mine = handle.join().expect("Submitter panicked");
        assert!(mine.windows(2).all(|w| w[0] < w[1]));
        for sequence in mine {
            assert!(sequences.insert(sequence), "duplicate sequence {}", sequence);
        }
    }

    assert_eq!(sequences.len(), 1000);
    assert_eq!(scheduler.submitted_count(), 1000);

    scheduler.shutdown();
}

#[test]
fn test_submit_before_start_fails_without_enqueueing() {
    init_logging();
    let scheduler = Scheduler::new().unwrap();

    let err = scheduler.execute(|| Ok(())).unwrap_err();
    assert!(matches!(err, SchedulerError::NotStarted { .. }));
    assert_eq!(scheduler.queue_size(), 0);
    assert_eq!(scheduler.submitted_count(), 0);
}

#[test]
fn test_shutdown_abandons_backlog() {
    let scheduler = scheduler(1);
    scheduler.start().unwrap();

    let executed = Arc::new(AtomicUsize::new(0));

    let executed_clone = Arc::clone(&executed);
    scheduler
        .execute(move || {
            thread::sleep(Duration::from_millis(300));
            executed_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    for _ in 0..10 {
        let executed = Arc::clone(&executed);
        scheduler
            .execute(move || {
                executed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
    }

    thread::sleep(Duration::from_millis(50));
    scheduler.shutdown();

    assert!(executed.load(Ordering::SeqCst) < 11);
    assert_eq!(scheduler.queue_size(), 0);
}

#[test]
fn test_drain_mode_runs_backlog() {
    init_logging();
    let config = SchedulerConfig::new(1)
        .with_poll_interval(Duration::from_millis(10))
        .with_shutdown_mode(ShutdownMode::Drain);
    let scheduler = Scheduler::with_config(config).unwrap();
    scheduler.start().unwrap();

    let executed = Arc::new(AtomicUsize::new(0));
    for _ in 0..11 {
        let executed = Arc::clone(&executed);
        scheduler
            .execute(move || {
                thread::sleep(Duration::from_millis(5));
                executed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
    }

    scheduler.shutdown();
    assert_eq!(executed.load(Ordering::SeqCst), 11);
}

#[test]
fn test_concurrent_increment_has_no_lost_updates() {
    let scheduler = scheduler(4);
    scheduler.start().unwrap();

    let counter = Arc::new(Mutex::new(0u32));
    let finished = Arc::new(AtomicUsize::new(0));
    for _ in 0..10 {
        let counter = Arc::clone(&counter);
        let finished = Arc::clone(&finished);
        scheduler
            .execute(move || {
                for _ in 0..100 {
                    *counter.lock() += 1;
                }
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
    }

    assert!(wait_for(
        || finished.load(Ordering::SeqCst) == 10,
        Duration::from_secs(5)
    ));
    assert_eq!(*counter.lock(), 1000);

    scheduler.shutdown();
}

#[test]
fn test_failing_jobs_do_not_stop_isolating_workers() {
    let scheduler = scheduler(2);
    scheduler.start().unwrap();

    for i in 0..6 {
        scheduler
            .execute(move || {
                if i % 2 == 0 {
                    panic!("Intentional panic for testing");
                }
                Err(SchedulerError::execution(i, "Intentional failure"))
            })
            .unwrap();
    }

    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);
    scheduler
        .execute_with_priority(
            move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            Priority::Low,
        )
        .unwrap();

    assert!(wait_for(
        || {
            let stats = scheduler.stats();
            stats.jobs_panicked + stats.jobs_failed + stats.jobs_processed == 7
        },
        Duration::from_secs(2)
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let stats = scheduler.stats();
    assert_eq!(stats.jobs_panicked, 3);
    assert_eq!(stats.jobs_failed, 3);
    assert_eq!(stats.jobs_processed, 1);
    assert_eq!(stats.live_workers, 2);

    scheduler.shutdown();
}

#[test]
fn test_terminate_policy_shrinks_pool() {
    init_logging();
    let config = SchedulerConfig::new(2)
        .with_poll_interval(Duration::from_millis(10))
        .with_failure_policy(FailurePolicy::TerminateWorker);
    let scheduler = Scheduler::with_config(config).unwrap();
    scheduler.start().unwrap();

    scheduler
        .execute(|| panic!("Intentional panic for testing"))
        .unwrap();

    assert!(wait_for(
        || scheduler.pool().live_workers() == 1,
        Duration::from_secs(2)
    ));

    // The surviving worker still serves jobs
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = Arc::clone(&counter);
    scheduler
        .execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
    assert!(wait_for(
        || counter.load(Ordering::SeqCst) == 1,
        Duration::from_secs(2)
    ));

    // A stop/start cycle restores full capacity
    scheduler.shutdown();
    scheduler.start().unwrap();
    assert_eq!(scheduler.pool().live_workers(), 2);
    scheduler.shutdown();
}

#[test]
fn test_shutdown_is_bounded_by_join_timeout() {
    init_logging();
    let config = SchedulerConfig::new(1)
        .with_poll_interval(Duration::from_millis(10))
        .with_join_timeout(Duration::from_millis(100));
    let scheduler = Scheduler::with_config(config).unwrap();
    scheduler.start().unwrap();

    let (started_tx, started_rx) = mpsc::channel();
    scheduler
        .execute(move || {
            started_tx.send(()).ok();
            thread::sleep(Duration::from_secs(2));
            Ok(())
        })
        .unwrap();
    started_rx.recv_timeout(Duration::from_secs(2)).unwrap();

    let start = Instant::now();
    scheduler.shutdown();
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!scheduler.pool().is_running());
}

#[test]
fn test_double_start_and_shutdown_are_safe() {
    let scheduler = scheduler(2);
    scheduler.start().unwrap();
    scheduler.start().unwrap();
    assert_eq!(scheduler.pool().live_workers(), 2);

    scheduler.shutdown();
    scheduler.shutdown();
    assert!(!scheduler.is_started());
}

#[test]
fn test_stats_survive_shutdown_and_sequences_continue_after_restart() {
    let scheduler = scheduler(1);
    scheduler.start().unwrap();

    scheduler.execute(|| Ok(())).unwrap();
    scheduler
        .execute(|| Err(SchedulerError::other("Intentional failure")))
        .unwrap();
    assert!(wait_for(
        || {
            let stats = scheduler.stats();
            stats.jobs_processed + stats.jobs_failed == 2
        },
        Duration::from_secs(2)
    ));

    scheduler.shutdown();

    let stats = scheduler.stats();
    assert_eq!(stats.jobs_submitted, 2);
    assert_eq!(stats.jobs_processed, 1);
    assert_eq!(stats.jobs_failed, 1);
    assert_eq!(stats.live_workers, 0);

    scheduler.start().unwrap();
    let submitted_before = scheduler.submitted_count();
    let sequence = scheduler.execute(|| Ok(())).unwrap();
    assert_eq!(sequence, submitted_before);
    assert_eq!(sequence, 2);

    // A new run starts with fresh execution counters
    assert!(wait_for(
        || scheduler.stats().jobs_processed == 1,
        Duration::from_secs(2)
    ));
    assert_eq!(scheduler.stats().jobs_failed, 0);

    scheduler.shutdown();
}

#[test]
fn test_submissions_racing_shutdown_leave_no_backlog() {
    let scheduler = Arc::new(scheduler(1));
    scheduler.start().unwrap();

    let release = block_worker(&scheduler);

    let mut submitters = vec![];
    for _ in 0..4 {
        let scheduler = Arc::clone(&scheduler);
        submitters.push(thread::spawn(move || {
            let mut accepted = 0u64;
            while scheduler.execute(|| Ok(())).is_ok() {
                accepted += 1;
            }
            accepted
        }));
    }
    thread::sleep(Duration::from_millis(10));

    let shutdown = {
        let scheduler = Arc::clone(&scheduler);
        thread::spawn(move || scheduler.shutdown())
    };
    thread::sleep(Duration::from_millis(10));
    drop(release);
    shutdown.join().expect("Shutdown panicked");

    let accepted: u64 = submitters
        .into_iter()
        .map(|h| h.join().expect("Submitter panicked"))
        .sum();
    assert!(accepted > 0);
    assert_eq!(scheduler.queue_size(), 0);

    // Nothing left over from the previous run executes after a restart
    scheduler.start().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(scheduler.stats().jobs_processed, 0);

    scheduler.shutdown();
}
