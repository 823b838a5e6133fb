//! Transition records passed to entry, exit, and internal actions.

use chrono::{DateTime, Utc};

/// Record of a single move between states.
///
/// A transition is an immutable value describing the source state, the
/// destination state, and the trigger that caused the move. Every entry,
/// exit, and internal action receives a reference to the transition being
/// executed, so an action can react to where the machine came from or which
/// trigger brought it here.
///
/// # Example
///
/// ```rust
/// use statecraft::Transition;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Draft,
///     Review,
/// }
///
/// let transition = Transition::new(Phase::Draft, Phase::Review, "submit");
/// assert!(!transition.is_reentry());
/// assert_eq!(transition.source, Phase::Draft);
/// assert_eq!(transition.destination, Phase::Review);
/// ```
#[derive(Clone, Debug)]
pub struct Transition<S, T> {
    /// The state being exited
    pub source: S,
    /// The state being entered
    pub destination: S,
    /// The trigger that caused the transition
    pub trigger: T,
    /// When the transition began executing
    pub fired_at: DateTime<Utc>,
}

impl<S, T> Transition<S, T> {
    /// Create a transition record stamped with the current time.
    pub fn new(source: S, destination: S, trigger: T) -> Self {
        Self {
            source,
            destination,
            trigger,
            fired_at: Utc::now(),
        }
    }
}

impl<S: PartialEq, T> Transition<S, T> {
    /// True when the transition re-enters its own source state.
    ///
    /// Reentrant transitions run the exit and entry actions of the single
    /// state involved rather than walking the superstate chain.
    pub fn is_reentry(&self) -> bool {
        self.source == self.destination
    }
}
