//! Bug Tracker Workflow
//!
//! A bug moves between Open, Assigned, Deferred, and Closed. The example
//! wraps the machine in a domain type and demonstrates:
//! - A parameterized trigger carrying the assignee's name
//! - Trigger-filtered entry actions that receive the fired arguments
//! - A substate (Assigned inside Open) and reentrant reassignment
//! - Exit actions that notify the previous assignee
//!
//! Run with: cargo run --example bug_tracker

use parking_lot::Mutex;
use statecraft::{FireError, StateMachine, TriggerWithArgs};
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum BugState {
    Open,
    Assigned,
    Deferred,
    Closed,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum BugTrigger {
    Assign,
    Defer,
    Close,
}

struct Bug {
    title: String,
    machine: StateMachine<BugState, BugTrigger>,
    assign: TriggerWithArgs<BugTrigger, (String,)>,
    assignee: Arc<Mutex<Option<String>>>,
}

impl Bug {
    fn new(title: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut machine = StateMachine::new(BugState::Open);
        let assign = machine.set_trigger_parameters::<(String,)>(BugTrigger::Assign)?;
        let assignee = Arc::new(Mutex::new(None));

        machine
            .configure(BugState::Open)
            .permit(BugTrigger::Assign, BugState::Assigned)?;

        let on_assigned = Arc::clone(&assignee);
        let on_deassigned = Arc::clone(&assignee);
        machine
            .configure(BugState::Assigned)
            .substate_of(BugState::Open)?
            .permit_reentry(BugTrigger::Assign)?
            .permit(BugTrigger::Defer, BugState::Deferred)?
            .permit(BugTrigger::Close, BugState::Closed)?
            .on_entry_from(&assign, move |_, args| {
                if let Some(name) = args.get::<String>(0) {
                    println!("  -> assigned to {name}");
                    *on_assigned.lock() = Some(name.clone());
                }
                Ok(())
            })
            .on_exit(move |_| {
                if let Some(previous) = on_deassigned.lock().take() {
                    println!("  -> {previous} notified that the bug was taken off their plate");
                }
                Ok(())
            });

        machine
            .configure(BugState::Deferred)
            .permit(BugTrigger::Assign, BugState::Assigned)?
            .on_entry(|_| {
                println!("  -> deferred, waiting for a volunteer");
                Ok(())
            });

        Ok(Self {
            title: title.to_string(),
            machine,
            assign,
            assignee,
        })
    }

    fn assign(&mut self, assignee: &str) -> Result<(), FireError> {
        self.machine
            .fire_with(&self.assign, (assignee.to_string(),))
    }

    fn defer(&mut self) -> Result<(), FireError> {
        self.machine.fire(BugTrigger::Defer)
    }

    fn close(&mut self) -> Result<(), FireError> {
        self.machine.fire(BugTrigger::Close)
    }

    fn state(&self) -> BugState {
        self.machine.state()
    }

    fn assignee(&self) -> Option<String> {
        self.assignee.lock().clone()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bug Tracker Workflow ===\n");

    let mut bug = Bug::new("Incorrect stock count")?;
    println!("New bug: \"{}\"", bug.title);
    println!("State: {:?}\n", bug.state());

    println!("Assign to Joe:");
    bug.assign("Joe")?;
    println!(
        "State: {:?}, assignee: {:?}, still counts as Open: {}\n",
        bug.state(),
        bug.assignee(),
        bug.machine.is_in_state(&BugState::Open)
    );

    println!("Defer:");
    bug.defer()?;
    println!("State: {:?}, assignee: {:?}\n", bug.state(), bug.assignee());

    println!("Assign to Harry:");
    bug.assign("Harry")?;

    println!("Reassign to Fred:");
    bug.assign("Fred")?;
    println!("State: {:?}, assignee: {:?}\n", bug.state(), bug.assignee());

    println!("Close:");
    bug.close()?;
    println!("State: {:?}", bug.state());
    println!("{}\n", bug.machine);

    match bug.close() {
        Err(error) => println!("Closing again is rejected: {error}"),
        Ok(()) => println!("Unexpectedly closed twice"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
