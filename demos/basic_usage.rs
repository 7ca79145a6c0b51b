//! Basic scheduler usage example
//!
//! Demonstrates priority ordering, statistics and shutdown behaviour.
//!
//! Run with: cargo run --example basic_usage

use priority_scheduler::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Priority Scheduler - Basic Usage Example ===\n");

    // One worker makes the priority order visible
    let config = SchedulerConfig::new(1).with_poll_interval(Duration::from_millis(20));
    let scheduler = Scheduler::with_config(config)?;

    println!("1. Starting scheduler with {} worker", scheduler.num_workers());
    scheduler.start()?;

    println!("\n2. Occupying the worker, then queueing mixed priorities:");
    scheduler.execute(|| {
        thread::sleep(Duration::from_millis(100));
        Ok(())
    })?;

    for (label, priority) in [
        ("low", i64::from(Priority::Low)),
        ("high", Priority::High.value()),
        ("medium", Priority::Medium.value()),
        ("custom-10", 10),
    ] {
        let sequence = scheduler.execute_with_priority(
            move || {
                println!("   running {} (priority {})", label, priority);
                Ok(())
            },
            priority,
        )?;
        println!("   queued {} as sequence {}", label, sequence);
    }

    thread::sleep(Duration::from_millis(300));

    println!("\n3. Failures are logged and counted, not returned:");
    scheduler.execute(|| Err(SchedulerError::other("simulated failure")))?;
    thread::sleep(Duration::from_millis(100));

    let stats = scheduler.stats();
    println!("   submitted: {}", stats.jobs_submitted);
    println!("   processed: {}", stats.jobs_processed);
    println!("   failed:    {}", stats.jobs_failed);

    println!("\n4. Shutdown abandons whatever is still queued:");
    scheduler.execute(|| {
        thread::sleep(Duration::from_millis(100));
        Ok(())
    })?;
    for _ in 0..5 {
        scheduler.execute(|| {
            println!("   backlog job ran");
            Ok(())
        })?;
    }
    thread::sleep(Duration::from_millis(20));
    scheduler.shutdown();
    println!("   queue after shutdown: {}", scheduler.queue_size());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
