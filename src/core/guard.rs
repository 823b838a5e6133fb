//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the fired arguments that determine
//! whether a guarded transition applies. They enable declarative transition
//! rules without side effects.

use super::args::TriggerArgs;
use std::sync::Arc;

/// Pure predicate that determines whether a guarded transition applies.
///
/// Guards are evaluated in declaration order when a trigger fires; the first
/// behaviour whose guard passes wins. A guard receives the fired arguments,
/// so a single trigger can route to different destinations depending on the
/// values supplied. Guards share their predicate through an `Arc`, which
/// keeps them cheap to clone when a machine is cloned.
///
/// # Example
///
/// ```rust
/// use statecraft::{ArgSet, Guard};
///
/// // Allow the transition only for priorities above a threshold.
/// let urgent = Guard::new(|args| args.get::<u32>(0).is_some_and(|p| *p >= 8));
///
/// assert!(urgent.check(&(9u32,).into_args()));
/// assert!(!urgent.check(&(3u32,).into_args()));
/// assert!(!urgent.check(&().into_args()));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<dyn Fn(&TriggerArgs) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects; the
    /// machine may evaluate it speculatively when answering permission
    /// queries such as `permitted_triggers`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&TriggerArgs) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the fired arguments.
    ///
    /// Permission queries evaluate guards with an empty argument bag, so
    /// predicates that inspect arguments should treat missing values as a
    /// rejection rather than panicking.
    pub fn check(&self, args: &TriggerArgs) -> bool {
        (self.predicate)(args)
    }
}

/// Conversion into a [`Guard`], accepted wherever a guard is configured.
///
/// Implemented for closures and for `Guard` itself, so a reusable predicate
/// can be built once and attached to several transitions:
///
/// ```rust
/// use statecraft::{Guard, StateMachine};
///
/// let has_capacity = Guard::new(|args| args.get::<u32>(0).is_some_and(|n| *n < 10));
///
/// let mut machine = StateMachine::new("idle");
/// machine
///     .configure("idle")
///     .permit_if("enqueue", "busy", has_capacity.clone());
/// machine
///     .configure("busy")
///     .permit_if("enqueue", "busy", has_capacity);
/// ```
pub trait IntoGuard {
    /// Perform the conversion.
    fn into_guard(self) -> Guard;
}

impl IntoGuard for Guard {
    fn into_guard(self) -> Guard {
        self
    }
}

impl<F> IntoGuard for F
where
    F: Fn(&TriggerArgs) -> bool + Send + Sync + 'static,
{
    fn into_guard(self) -> Guard {
        Guard::new(self)
    }
}
