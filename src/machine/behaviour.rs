//! The closed set of behaviours a trigger can have in a state.

use crate::core::{Guard, StateKey, Transition, TriggerArgs, TriggerKey};
use crate::machine::error::ActionError;
use std::sync::Arc;

/// Selects a destination state from the fired arguments.
pub(crate) type DynamicSelector<S> = Arc<dyn Fn(&TriggerArgs) -> S + Send + Sync>;

/// Action executed by an internal transition, without any state change.
pub(crate) type InternalAction<S, T> =
    Arc<dyn Fn(&Transition<S, T>, &TriggerArgs) -> Result<(), ActionError> + Send + Sync>;

/// Everything a trigger can mean inside one state.
///
/// Each state keeps, per trigger, an ordered list of behaviours declared
/// through the configuration surface. When the trigger fires, the list is
/// scanned in declaration order and the first matching behaviour wins. At
/// most one behaviour in a list may match unconditionally; the configuration
/// layer rejects a second one at declaration time, so ambiguity cannot
/// surface at fire time.
pub(crate) enum TriggerBehaviour<S: StateKey, T: TriggerKey> {
    /// Move to `destination` whenever the trigger fires.
    Transition { destination: S },

    /// Move to `destination` when the guard accepts the fired arguments.
    GuardedTransition { guard: Guard, destination: S },

    /// Compute the destination from the fired arguments.
    DynamicTransition { selector: DynamicSelector<S> },

    /// Run `action` without leaving the state; no exit or entry actions run.
    Internal { action: InternalAction<S, T> },

    /// Accept the trigger silently without any effect.
    Ignored,
}

impl<S: StateKey, T: TriggerKey> TriggerBehaviour<S, T> {
    /// True for behaviours that no guard can reject.
    ///
    /// At most one of these may exist per (state, trigger) pair.
    pub(crate) fn always_matches(&self) -> bool {
        !matches!(self, TriggerBehaviour::GuardedTransition { .. })
    }

    /// Whether this behaviour applies to the fired arguments.
    pub(crate) fn matches(&self, args: &TriggerArgs) -> bool {
        match self {
            TriggerBehaviour::GuardedTransition { guard, .. } => guard.check(args),
            _ => true,
        }
    }
}

impl<S: StateKey, T: TriggerKey> Clone for TriggerBehaviour<S, T> {
    fn clone(&self) -> Self {
        match self {
            TriggerBehaviour::Transition { destination } => TriggerBehaviour::Transition {
                destination: destination.clone(),
            },
            TriggerBehaviour::GuardedTransition { guard, destination } => {
                TriggerBehaviour::GuardedTransition {
                    guard: guard.clone(),
                    destination: destination.clone(),
                }
            }
            TriggerBehaviour::DynamicTransition { selector } => {
                TriggerBehaviour::DynamicTransition {
                    selector: Arc::clone(selector),
                }
            }
            TriggerBehaviour::Internal { action } => TriggerBehaviour::Internal {
                action: Arc::clone(action),
            },
            TriggerBehaviour::Ignored => TriggerBehaviour::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArgSet;

    fn unconditional() -> TriggerBehaviour<&'static str, &'static str> {
        TriggerBehaviour::Transition {
            destination: "next",
        }
    }

    #[test]
    fn only_guarded_behaviours_can_reject() {
        let behaviours: Vec<TriggerBehaviour<&str, &str>> = vec![
            unconditional(),
            TriggerBehaviour::DynamicTransition {
                selector: Arc::new(|_| "anywhere"),
            },
            TriggerBehaviour::Internal {
                action: Arc::new(|_, _| Ok(())),
            },
            TriggerBehaviour::Ignored,
        ];

        for behaviour in &behaviours {
            assert!(behaviour.always_matches());
            assert!(behaviour.matches(&TriggerArgs::empty()));
        }

        let guarded: TriggerBehaviour<&str, &str> = TriggerBehaviour::GuardedTransition {
            guard: Guard::new(|args| !args.is_empty()),
            destination: "next",
        };
        assert!(!guarded.always_matches());
        assert!(!guarded.matches(&TriggerArgs::empty()));
        assert!(guarded.matches(&(1u32,).into_args()));
    }

    #[test]
    fn clone_shares_callback_handles() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let behaviour: TriggerBehaviour<&str, &str> = TriggerBehaviour::Internal {
            action: Arc::new(move |_, _| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }),
        };

        let cloned = behaviour.clone();
        let transition = Transition::new("a", "a", "t");
        let args = TriggerArgs::empty();

        if let TriggerBehaviour::Internal { action } = &behaviour {
            action(&transition, &args).unwrap();
        }
        if let TriggerBehaviour::Internal { action } = &cloned {
            action(&transition, &args).unwrap();
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
