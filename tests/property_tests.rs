//! Property-based tests for the state machine core.
//!
//! These tests use proptest to verify behavioural properties hold
//! across many randomly generated configurations and firing sequences.

use proptest::prelude::*;
use statecraft::{MachineSnapshot, StateMachine, Transition, TriggerArgs};
use std::collections::HashSet;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Power {
    Off,
    On,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Flip {
    Tap,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Gate {
    Idle,
    High,
    Low,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Score {
    Review,
}

fn toggle() -> StateMachine<Power, Flip> {
    let mut machine = StateMachine::new(Power::Off);
    machine
        .configure(Power::Off)
        .permit(Flip::Tap, Power::On)
        .unwrap();
    machine
        .configure(Power::On)
        .permit(Flip::Tap, Power::Off)
        .unwrap();
    machine
}

fn parity_state(fires: usize) -> Power {
    if fires % 2 == 0 {
        Power::Off
    } else {
        Power::On
    }
}

fn permitting(permits: &HashSet<char>) -> StateMachine<&'static str, char> {
    let mut machine = StateMachine::new("idle");
    for trigger in permits {
        machine
            .configure("idle")
            .permit(*trigger, "done")
            .unwrap();
    }
    machine
}

prop_compose! {
    fn permitted_set()(triggers in prop::collection::hash_set(
        prop::sample::select(vec!['a', 'b', 'c', 'd', 'e']),
        0..5,
    )) -> HashSet<char> {
        triggers
    }
}

proptest! {
    #[test]
    fn toggle_tracks_fire_parity(fires in 0..40usize) {
        let mut machine = toggle();
        for _ in 0..fires {
            machine.fire(Flip::Tap).unwrap();
        }
        prop_assert_eq!(machine.state(), parity_state(fires));
    }

    #[test]
    fn guards_route_on_threshold(cutoff in -50..50i32, value in -100..100i32) {
        let mut machine = StateMachine::new(Gate::Idle);
        let review = machine
            .set_trigger_parameters::<(i32,)>(Score::Review)
            .unwrap();
        machine
            .configure(Gate::Idle)
            .permit_if(Score::Review, Gate::High, move |args: &TriggerArgs| {
                args.get::<i32>(0).is_some_and(|v| *v >= cutoff)
            })
            .permit_if(Score::Review, Gate::Low, move |args: &TriggerArgs| {
                args.get::<i32>(0).is_some_and(|v| *v < cutoff)
            });

        machine.fire_with(&review, (value,)).unwrap();

        let expected = if value >= cutoff { Gate::High } else { Gate::Low };
        prop_assert_eq!(machine.state(), expected);
    }

    #[test]
    fn nested_membership_follows_superstate_links(depth in 1..8usize) {
        let mut machine: StateMachine<usize, char> = StateMachine::new(depth - 1);
        for child in 1..depth {
            machine.configure(child).substate_of(child - 1).unwrap();
        }

        for ancestor in 0..depth {
            prop_assert!(machine.is_in_state(&ancestor));
        }
        for stranger in depth..depth + 3 {
            prop_assert!(!machine.is_in_state(&stranger));
        }
    }

    #[test]
    fn permitted_triggers_agree_with_can_fire(permits in permitted_set()) {
        let machine = permitting(&permits);

        let listed: HashSet<char> = machine.permitted_triggers().into_iter().collect();
        prop_assert_eq!(&listed, &permits);

        for candidate in ['a', 'b', 'c', 'd', 'e'] {
            prop_assert_eq!(machine.can_fire(&candidate), permits.contains(&candidate));
        }
    }

    #[test]
    fn clones_diverge_independently(
        shared in 0..12usize,
        original_extra in 0..12usize,
        copy_extra in 0..12usize,
    ) {
        let mut machine = toggle();
        for _ in 0..shared {
            machine.fire(Flip::Tap).unwrap();
        }

        let mut copy = machine.clone();
        for _ in 0..original_extra {
            machine.fire(Flip::Tap).unwrap();
        }
        for _ in 0..copy_extra {
            copy.fire(Flip::Tap).unwrap();
        }

        prop_assert_eq!(machine.state(), parity_state(shared + original_extra));
        prop_assert_eq!(copy.state(), parity_state(shared + copy_extra));
        prop_assert_ne!(machine.id(), copy.id());
    }

    #[test]
    fn snapshot_roundtrip_serialization(permits in permitted_set()) {
        let machine = permitting(&permits);

        let snapshot = machine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: MachineSnapshot = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(snapshot, restored);
    }

    #[test]
    fn reentry_matches_endpoint_equality(source in 0..5usize, destination in 0..5usize) {
        let transition = Transition::new(source, destination, 't');
        prop_assert_eq!(transition.is_reentry(), source == destination);
    }
}
