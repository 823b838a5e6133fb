//! Parallel Toggle Machines
//!
//! Three power toggles run side by side, each guarded by its own
//! sequential action queue. The example demonstrates:
//! - Enqueueing machine mutations from many concurrent producers
//! - Per-queue ordering while separate queues drain in parallel
//! - Watching the activity flag flip as workers claim and retire
//! - Waiting for a queue to go idle before reading results
//!
//! Run with: cargo run --example parallel_toggles

use parking_lot::Mutex;
use statecraft::{SequentialActionQueue, StateMachine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Power {
    Off,
    On,
}

fn build_toggle(
    index: usize,
    log: Arc<Mutex<Vec<String>>>,
) -> Result<StateMachine<Power, char>, Box<dyn std::error::Error>> {
    let mut machine = StateMachine::new(Power::Off);

    let entry_log = Arc::clone(&log);
    machine
        .configure(Power::On)
        .permit(' ', Power::Off)?
        .on_entry(move |_| {
            let mut entries = entry_log.lock();
            entries.push(format!("machine {index} switching on"));
            entries.push(format!("machine {index} now on"));
            Ok(())
        });

    let entry_log = Arc::clone(&log);
    machine
        .configure(Power::Off)
        .permit(' ', Power::On)?
        .on_entry(move |_| {
            let mut entries = entry_log.lock();
            entries.push(format!("machine {index} switching off"));
            entries.push(format!("machine {index} now off"));
            Ok(())
        });

    Ok(machine)
}

const MACHINES: usize = 3;
const FIRES_PER_MACHINE: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Parallel Toggle Machines ===\n");

    let mut stations = Vec::new();
    let mut producers = Vec::new();
    let mut watchers = Vec::new();

    for index in 0..MACHINES {
        let log = Arc::new(Mutex::new(Vec::new()));
        let machine = Arc::new(Mutex::new(build_toggle(index, Arc::clone(&log))?));
        let queue = Arc::new(SequentialActionQueue::new());
        let fired = Arc::new(AtomicUsize::new(0));

        // Report the activity flag until the queue settles back to idle.
        let mut activity = queue.subscribe_active();
        watchers.push(tokio::spawn(async move {
            while activity.changed().await.is_ok() {
                let active = *activity.borrow();
                println!("queue {index}: active = {active}");
                if !active {
                    break;
                }
            }
        }));

        for _ in 0..FIRES_PER_MACHINE {
            let machine = Arc::clone(&machine);
            let queue = Arc::clone(&queue);
            let fired = Arc::clone(&fired);
            producers.push(tokio::spawn(async move {
                queue.enqueue(move || {
                    if machine.lock().fire(' ').is_ok() {
                        fired.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }));
        }

        stations.push((index, machine, queue, fired, log));
    }

    for producer in producers {
        producer.await?;
    }

    for (index, machine, queue, fired, log) in &stations {
        queue.wait_until_idle().await;
        let machine = machine.lock();
        println!(
            "\nmachine {index}: state = {:?}, fires = {}, log entries = {}",
            machine.state(),
            fired.load(Ordering::SeqCst),
            log.lock().len()
        );
        println!("  {}", *machine);
    }

    for watcher in watchers {
        watcher.await?;
    }

    println!("\nEvery machine toggled {FIRES_PER_MACHINE} times; an even count lands back on Off.");
    println!("\n=== Example Complete ===");
    Ok(())
}
