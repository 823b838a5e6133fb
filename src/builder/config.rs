//! Fluent configuration for a single state.

use crate::core::{
    ArgSet, IntoGuard, StateKey, Transition, TriggerArgs, TriggerKey, TriggerWithArgs,
};
use crate::machine::behaviour::TriggerBehaviour;
use crate::machine::{ActionError, ConfigurationError, StateMachine};
use std::fmt;
use std::sync::Arc;

/// Fluent configuration surface for one state of a [`StateMachine`].
///
/// Obtained from [`StateMachine::configure`]; every call records
/// configuration directly on the machine, so the value can be dropped at any
/// point in the chain. Methods that can conflict with earlier declarations
/// return `Result`; purely additive methods return `Self`.
///
/// # Example
///
/// ```rust
/// use statecraft::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
///     Locked,
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Key {
///     Push,
///     Pull,
///     Lock,
///     Unlock,
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut machine = StateMachine::new(Door::Closed);
/// machine
///     .configure(Door::Closed)
///     .permit(Key::Pull, Door::Open)?
///     .permit(Key::Lock, Door::Locked)?;
/// machine.configure(Door::Open).permit(Key::Push, Door::Closed)?;
/// machine.configure(Door::Locked).permit(Key::Unlock, Door::Closed)?;
///
/// machine.fire(Key::Pull)?;
/// assert_eq!(machine.state(), Door::Open);
/// # Ok(())
/// # }
/// ```
pub struct StateConfiguration<'m, S: StateKey, T: TriggerKey> {
    machine: &'m mut StateMachine<S, T>,
    state: S,
}

impl<'m, S: StateKey, T: TriggerKey> StateConfiguration<'m, S, T> {
    pub(crate) fn new(machine: &'m mut StateMachine<S, T>, state: S) -> Self {
        // Materialize the representation as soon as the state is configured.
        machine.representation_mut(&state);
        Self { machine, state }
    }

    /// The state being configured.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Permit `trigger` to move the machine to `destination`.
    ///
    /// Fails with [`ConfigurationError::AmbiguousBehaviour`] if the trigger
    /// already has a behaviour that matches unconditionally in this state.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, ConfigurationError> {
        self.machine
            .representation_mut(&self.state)
            .add_behaviour(trigger, TriggerBehaviour::Transition { destination })?;
        Ok(self)
    }

    /// Permit `trigger` to re-enter this state, running its exit actions and
    /// then its entry actions without touching the superstate chain.
    pub fn permit_reentry(self, trigger: T) -> Result<Self, ConfigurationError> {
        let destination = self.state.clone();
        self.machine
            .representation_mut(&self.state)
            .add_behaviour(trigger, TriggerBehaviour::Transition { destination })?;
        Ok(self)
    }

    /// Permit `trigger` to move to `destination` when `guard` accepts the
    /// fired arguments.
    ///
    /// Guards stack: declaring several guarded behaviours for one trigger is
    /// allowed, and the first one satisfied in declaration order wins.
    pub fn permit_if<G>(self, trigger: T, destination: S, guard: G) -> Self
    where
        G: IntoGuard,
    {
        self.machine.representation_mut(&self.state).push_behaviour(
            trigger,
            TriggerBehaviour::GuardedTransition {
                guard: guard.into_guard(),
                destination,
            },
        );
        self
    }

    /// Permit `trigger`, computing the destination from the fired arguments
    /// at fire time.
    pub fn permit_dynamic<F>(self, trigger: T, selector: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&TriggerArgs) -> S + Send + Sync + 'static,
    {
        self.machine.representation_mut(&self.state).add_behaviour(
            trigger,
            TriggerBehaviour::DynamicTransition {
                selector: Arc::new(selector),
            },
        )?;
        Ok(self)
    }

    /// Run `action` when `trigger` fires, without leaving the state.
    ///
    /// No exit or entry actions run, and the state is unchanged even if the
    /// action fails.
    pub fn internal_transition<F>(self, trigger: T, action: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&Transition<S, T>, &TriggerArgs) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.machine.representation_mut(&self.state).add_behaviour(
            trigger,
            TriggerBehaviour::Internal {
                action: Arc::new(action),
            },
        )?;
        Ok(self)
    }

    /// Accept `trigger` in this state without any effect.
    ///
    /// An ignored trigger is considered handled: firing it succeeds and the
    /// unhandled-trigger handler does not run.
    pub fn ignore(self, trigger: T) -> Result<Self, ConfigurationError> {
        self.machine
            .representation_mut(&self.state)
            .add_behaviour(trigger, TriggerBehaviour::Ignored)?;
        Ok(self)
    }

    /// Run `action` whenever this state is entered.
    pub fn on_entry<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.machine
            .representation_mut(&self.state)
            .add_entry_hook(None, Arc::new(move |transition, _args| action(transition)));
        self
    }

    /// Run `action`, with access to the fired arguments, when this state is
    /// entered via `trigger`.
    ///
    /// The trigger handle comes from `StateMachine::set_trigger_parameters`;
    /// registering with `()` gives a handle for filtering on a parameterless
    /// trigger.
    pub fn on_entry_from<A, F>(self, trigger: &TriggerWithArgs<T, A>, action: F) -> Self
    where
        A: ArgSet,
        F: Fn(&Transition<S, T>, &TriggerArgs) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.machine
            .representation_mut(&self.state)
            .add_entry_hook(Some(trigger.trigger().clone()), Arc::new(action));
        self
    }

    /// Run `action` whenever this state is exited.
    pub fn on_exit<F>(self, action: F) -> Self
    where
        F: Fn(&Transition<S, T>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.machine
            .representation_mut(&self.state)
            .add_exit_action(Arc::new(action));
        self
    }

    /// Make this state a substate of `superstate`.
    ///
    /// While the machine is in this state it also counts as being in
    /// `superstate`; triggers this state does not handle are resolved
    /// against the superstate chain. Fails on self-containment, containment
    /// cycles, and attempts to re-parent to a different superstate. Linking
    /// the same pair again is a no-op.
    pub fn substate_of(self, superstate: S) -> Result<Self, ConfigurationError> {
        self.machine
            .link_substate(self.state.clone(), superstate)?;
        Ok(self)
    }
}

impl<S: StateKey, T: TriggerKey> fmt::Debug for StateConfiguration<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfiguration")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
