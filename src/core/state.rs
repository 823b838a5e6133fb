//! Marker traits for state and trigger keys.
//!
//! A machine is generic over the type used to identify its states and the
//! type used to identify its triggers. Any type that can serve as a hash map
//! key, be cloned into transition records, and move across threads qualifies
//! automatically through blanket implementations.

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for types that identify states.
///
/// Implemented automatically for every eligible type; there is never a need
/// to implement it by hand. Plain enums derive everything required:
///
/// # Required Traits
///
/// - `Clone`: state values are copied into transition records and snapshots
/// - `Eq` + `Hash`: states key the machine's configuration map
/// - `Debug`: states are rendered into error messages and log events
/// - `Send` + `Sync`: machines are expected to cross thread boundaries
///
/// # Example
///
/// ```rust
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Draft,
///     Review,
///     Published,
/// }
///
/// fn assert_state_key<S: statecraft::StateKey>() {}
/// assert_state_key::<Phase>();
/// assert_state_key::<&'static str>();
/// assert_state_key::<u32>();
/// ```
pub trait StateKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<S> StateKey for S where S: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Marker trait for types that identify triggers.
///
/// The requirements mirror [`StateKey`]: triggers key the behaviour tables
/// inside each state's configuration and are cloned into transition records.
/// Implemented automatically for every eligible type.
pub trait TriggerKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> TriggerKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        Busy,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    struct Wrapped(String);

    fn requires_state_key<S: StateKey>(value: S) -> S {
        value
    }

    fn requires_trigger_key<T: TriggerKey>(value: T) -> T {
        value
    }

    #[test]
    fn enums_satisfy_state_key() {
        let state = requires_state_key(TestState::Idle);
        assert_eq!(state, TestState::Idle);
        assert_ne!(state, TestState::Busy);
    }

    #[test]
    fn primitives_satisfy_both_keys() {
        assert_eq!(requires_state_key("off"), "off");
        assert_eq!(requires_state_key(42u32), 42);
        assert_eq!(requires_trigger_key(' '), ' ');
    }

    #[test]
    fn owned_newtypes_satisfy_trigger_key() {
        let trigger = requires_trigger_key(Wrapped("assign".to_string()));
        assert_eq!(trigger, Wrapped("assign".to_string()));
    }
}
