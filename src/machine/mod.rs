//! The state machine: lazily materialized configuration plus a current state.

pub(crate) mod behaviour;
mod error;
pub(crate) mod representation;
mod signature;
mod snapshot;

pub use error::{ActionError, ConfigurationError, FireError};
pub use snapshot::MachineSnapshot;

use behaviour::{InternalAction, TriggerBehaviour};
use representation::StateRepresentation;
use signature::TriggerSignature;

use crate::builder::StateConfiguration;
use crate::core::{ArgSet, StateKey, Transition, TriggerArgs, TriggerKey, TriggerWithArgs};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Handler invoked when a trigger has no matching behaviour.
pub(crate) type UnhandledTriggerHandler<S, T> =
    Arc<dyn Fn(&S, &T) -> Result<(), FireError> + Send + Sync>;

/// Where the machine keeps its current state.
///
/// The default is an internal cell. External storage delegates reads and
/// writes to caller-supplied closures, letting the machine govern a state
/// field that lives inside some other structure.
enum StateStorage<S> {
    Internal(S),
    External {
        read: Box<dyn Fn() -> S + Send + Sync>,
        write: Box<dyn Fn(S) + Send + Sync>,
    },
}

impl<S: StateKey> StateStorage<S> {
    fn get(&self) -> S {
        match self {
            StateStorage::Internal(state) => state.clone(),
            StateStorage::External { read, .. } => read(),
        }
    }

    fn set(&mut self, next: S) {
        match self {
            StateStorage::Internal(state) => *state = next,
            StateStorage::External { write, .. } => write(next),
        }
    }
}

/// What firing a trigger resolved to, detached from the configuration maps
/// so the machine can mutate itself while executing it.
enum Resolution<S: StateKey, T: TriggerKey> {
    Move { destination: S },
    Internal { action: InternalAction<S, T> },
    Ignore,
    Unhandled,
}

/// A hierarchical, trigger-driven state machine.
///
/// States and triggers are plain values of any [`StateKey`]/[`TriggerKey`]
/// type. Configuration is declared per state through [`configure`] and
/// materialized lazily; querying a state that was never configured is always
/// safe. States may be nested with `substate_of`, in which case triggers
/// unhandled by the current state are resolved against its superstate chain
/// and entry/exit actions run along the chain in hierarchical order.
///
/// A machine is single-threaded by design: firing requires `&mut self`.
/// Serializing fires from many producers is the job of
/// [`SequentialActionQueue`](crate::queue::SequentialActionQueue).
///
/// [`configure`]: StateMachine::configure
///
/// # Example
///
/// ```rust
/// use statecraft::StateMachine;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Draft,
///     Review,
///     Published,
/// }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Op {
///     Submit,
///     Approve,
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut machine = StateMachine::new(Phase::Draft);
/// machine.configure(Phase::Draft).permit(Op::Submit, Phase::Review)?;
/// machine.configure(Phase::Review).permit(Op::Approve, Phase::Published)?;
///
/// machine.fire(Op::Submit)?;
/// assert_eq!(machine.state(), Phase::Review);
/// assert!(machine.can_fire(&Op::Approve));
/// # Ok(())
/// # }
/// ```
pub struct StateMachine<S: StateKey, T: TriggerKey> {
    id: Uuid,
    storage: StateStorage<S>,
    states: HashMap<S, StateRepresentation<S, T>>,
    signatures: HashMap<T, TriggerSignature<T>>,
    unhandled: UnhandledTriggerHandler<S, T>,
}

impl<S: StateKey, T: TriggerKey> StateMachine<S, T> {
    /// Create a machine holding its state internally, starting in `initial`.
    pub fn new(initial: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage: StateStorage::Internal(initial),
            states: HashMap::new(),
            signatures: HashMap::new(),
            unhandled: Self::default_unhandled(),
        }
    }

    /// Create a machine whose state lives outside it.
    ///
    /// `read` supplies the current state; `write` commits a new one. The
    /// machine calls them on every query and transition, so the closures
    /// should be cheap.
    pub fn with_external_state<R, W>(read: R, write: W) -> Self
    where
        R: Fn() -> S + Send + Sync + 'static,
        W: Fn(S) + Send + Sync + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            storage: StateStorage::External {
                read: Box::new(read),
                write: Box::new(write),
            },
            states: HashMap::new(),
            signatures: HashMap::new(),
            unhandled: Self::default_unhandled(),
        }
    }

    fn default_unhandled() -> UnhandledTriggerHandler<S, T> {
        Arc::new(|state, trigger| Err(FireError::invalid_transition(state, trigger)))
    }

    /// Unique identity of this machine instance.
    ///
    /// Clones receive a fresh identity.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current state.
    pub fn state(&self) -> S {
        self.storage.get()
    }

    /// True when the machine is in `state` or in any of its transitive
    /// substates.
    pub fn is_in_state(&self, state: &S) -> bool {
        let current = self.storage.get();
        self.is_ancestor_or_self(state, &current)
    }

    /// Whether firing `trigger` right now would find a behaviour.
    ///
    /// Guards are evaluated against an empty argument bag, and ignored
    /// triggers count as handled. Dynamic destination selectors are not
    /// invoked. Never fails, even for triggers and states the machine has
    /// never seen.
    pub fn can_fire(&self, trigger: &T) -> bool {
        let current = self.storage.get();
        let args = TriggerArgs::empty();
        let mut cursor = self.states.get(&current);
        while let Some(rep) = cursor {
            if rep.find_local(trigger, &args).is_some() {
                return true;
            }
            cursor = rep.superstate().and_then(|parent| self.states.get(parent));
        }
        false
    }

    /// The triggers that currently have at least one matching behaviour,
    /// including behaviours inherited from superstates.
    ///
    /// Guards are evaluated against an empty argument bag; triggers whose
    /// guards all reject are omitted. Order is unspecified.
    pub fn permitted_triggers(&self) -> Vec<T> {
        let current = self.storage.get();
        let args = TriggerArgs::empty();
        let mut seen = HashSet::new();
        let mut permitted = Vec::new();

        let mut cursor = self.states.get(&current);
        while let Some(rep) = cursor {
            for (trigger, behaviours) in rep.behaviours() {
                if behaviours.iter().any(|behaviour| behaviour.matches(&args))
                    && seen.insert(trigger.clone())
                {
                    permitted.push(trigger.clone());
                }
            }
            cursor = rep.superstate().and_then(|parent| self.states.get(parent));
        }
        permitted
    }

    /// Begin (or extend) the configuration of `state`.
    ///
    /// The state's representation is created on first use; configuring the
    /// same state again keeps adding to it.
    pub fn configure(&mut self, state: S) -> StateConfiguration<'_, S, T> {
        StateConfiguration::new(self, state)
    }

    /// Register the argument signature for `trigger` and obtain the typed
    /// handle used with [`fire_with`](StateMachine::fire_with).
    ///
    /// A trigger's signature can be registered once per machine; a second
    /// registration fails with
    /// [`ConfigurationError::TriggerAlreadyParameterized`].
    pub fn set_trigger_parameters<A: ArgSet>(
        &mut self,
        trigger: T,
    ) -> Result<TriggerWithArgs<T, A>, ConfigurationError> {
        if self.signatures.contains_key(&trigger) {
            return Err(ConfigurationError::TriggerAlreadyParameterized {
                trigger: format!("{trigger:?}"),
            });
        }
        self.signatures
            .insert(trigger.clone(), TriggerSignature::of::<A>(trigger.clone()));
        Ok(TriggerWithArgs::new(trigger))
    }

    /// Replace the handler invoked when a fired trigger has no matching
    /// behaviour.
    ///
    /// The default handler fails the fire with
    /// [`FireError::InvalidTransition`]. A custom handler that returns
    /// `Ok(())` turns unhandled triggers into no-ops.
    pub fn on_unhandled_trigger<F>(&mut self, handler: F)
    where
        F: Fn(&S, &T) -> Result<(), FireError> + Send + Sync + 'static,
    {
        self.unhandled = Arc::new(handler);
    }

    /// Fire `trigger` with no arguments.
    ///
    /// Resolution walks the current state's behaviours and then its
    /// superstate chain; the first behaviour whose guard accepts wins. On a
    /// transition the source chain's exit actions run innermost first, the
    /// state is committed, and the destination chain's entry actions run
    /// outermost first.
    ///
    /// Transitions are not transactional: if an exit action fails the
    /// machine is still in the source state, while if an entry action fails
    /// the destination has already been committed. The returned
    /// [`FireError::Action`] names the failed transition in both cases.
    pub fn fire(&mut self, trigger: T) -> Result<(), FireError> {
        self.internal_fire(trigger, TriggerArgs::empty())
    }

    /// Fire a parameterized trigger with its typed arguments.
    ///
    /// The handle pins the argument tuple at compile time; at run time the
    /// arguments are additionally checked against the signature registered
    /// on *this* machine, so a handle minted by a machine with a different
    /// registration fails with [`FireError::ArgumentMismatch`] instead of
    /// smuggling mistyped values to the actions.
    pub fn fire_with<A: ArgSet>(
        &mut self,
        trigger: &TriggerWithArgs<T, A>,
        args: A,
    ) -> Result<(), FireError> {
        self.internal_fire(trigger.trigger().clone(), args.into_args())
    }

    /// Diagnostic snapshot of the machine: identity, current state, and the
    /// currently permitted triggers rendered as strings.
    pub fn snapshot(&self) -> MachineSnapshot {
        let mut permitted: Vec<String> = self
            .permitted_triggers()
            .iter()
            .map(|trigger| format!("{trigger:?}"))
            .collect();
        permitted.sort();
        MachineSnapshot {
            id: self.id,
            state: format!("{:?}", self.storage.get()),
            permitted_triggers: permitted,
            taken_at: Utc::now(),
        }
    }

    fn internal_fire(&mut self, trigger: T, args: TriggerArgs) -> Result<(), FireError> {
        if let Some(signature) = self.signatures.get(&trigger) {
            signature.validate(&args)?;
        }

        let current = self.storage.get();
        match self.resolve(&current, &trigger, &args) {
            Resolution::Unhandled => {
                tracing::warn!(
                    machine = %self.id,
                    state = ?current,
                    trigger = ?trigger,
                    "Trigger has no matching behaviour"
                );
                let handler = Arc::clone(&self.unhandled);
                handler(&current, &trigger)
            }
            Resolution::Ignore => {
                tracing::trace!(
                    machine = %self.id,
                    state = ?current,
                    trigger = ?trigger,
                    "Trigger ignored"
                );
                Ok(())
            }
            Resolution::Internal { action } => {
                let transition = Transition::new(current.clone(), current, trigger);
                tracing::debug!(
                    machine = %self.id,
                    state = ?transition.source,
                    trigger = ?transition.trigger,
                    "Executing internal transition"
                );
                action(&transition, &args).map_err(|error| FireError::action(&transition, error))
            }
            Resolution::Move { destination } => {
                let transition = Transition::new(current, destination, trigger);
                self.execute_transition(transition, &args)
            }
        }
    }

    /// Find the first applicable behaviour for `trigger`, starting at
    /// `state` and climbing the superstate chain.
    fn resolve(&self, state: &S, trigger: &T, args: &TriggerArgs) -> Resolution<S, T> {
        let mut cursor = self.states.get(state);
        while let Some(rep) = cursor {
            if let Some(behaviour) = rep.find_local(trigger, args) {
                return match behaviour {
                    TriggerBehaviour::Transition { destination } => Resolution::Move {
                        destination: destination.clone(),
                    },
                    TriggerBehaviour::GuardedTransition { destination, .. } => Resolution::Move {
                        destination: destination.clone(),
                    },
                    TriggerBehaviour::DynamicTransition { selector } => Resolution::Move {
                        destination: selector(args),
                    },
                    TriggerBehaviour::Internal { action } => Resolution::Internal {
                        action: Arc::clone(action),
                    },
                    TriggerBehaviour::Ignored => Resolution::Ignore,
                };
            }
            cursor = rep.superstate().and_then(|parent| self.states.get(parent));
        }
        Resolution::Unhandled
    }

    fn execute_transition(
        &mut self,
        transition: Transition<S, T>,
        args: &TriggerArgs,
    ) -> Result<(), FireError> {
        {
            let exits = self.collect_exit_chain(&transition);
            for rep in exits {
                rep.run_exit_actions(&transition)?;
            }
        }

        self.storage.set(transition.destination.clone());
        tracing::debug!(
            machine = %self.id,
            source = ?transition.source,
            destination = ?transition.destination,
            trigger = ?transition.trigger,
            "Transition executed"
        );

        {
            let entries = self.collect_entry_chain(&transition);
            for rep in entries {
                rep.run_entry_hooks(&transition, args)?;
            }
        }
        Ok(())
    }

    /// The representations whose exit actions run for this transition,
    /// innermost first. The walk from the source stops at the first state
    /// that still contains the destination; a reentry exits only the state
    /// itself.
    fn collect_exit_chain(&self, transition: &Transition<S, T>) -> Vec<&StateRepresentation<S, T>> {
        if transition.is_reentry() {
            return self.states.get(&transition.source).into_iter().collect();
        }

        let mut chain = Vec::new();
        let mut cursor = self.states.get(&transition.source);
        while let Some(rep) = cursor {
            if self.is_ancestor_or_self(rep.state(), &transition.destination) {
                break;
            }
            chain.push(rep);
            cursor = rep.superstate().and_then(|parent| self.states.get(parent));
        }
        chain
    }

    /// The representations whose entry actions run for this transition,
    /// outermost first. States that already contained the source are not
    /// re-entered; a reentry enters only the state itself.
    fn collect_entry_chain(
        &self,
        transition: &Transition<S, T>,
    ) -> Vec<&StateRepresentation<S, T>> {
        if transition.is_reentry() {
            return self
                .states
                .get(&transition.destination)
                .into_iter()
                .collect();
        }

        let mut chain = Vec::new();
        let mut cursor = self.states.get(&transition.destination);
        while let Some(rep) = cursor {
            if self.is_ancestor_or_self(rep.state(), &transition.source) {
                break;
            }
            chain.push(rep);
            cursor = rep.superstate().and_then(|parent| self.states.get(parent));
        }
        chain.reverse();
        chain
    }

    /// True when `ancestor` equals `descendant` or appears somewhere on its
    /// superstate chain.
    fn is_ancestor_or_self(&self, ancestor: &S, descendant: &S) -> bool {
        let mut cursor = descendant;
        loop {
            if cursor == ancestor {
                return true;
            }
            match self
                .states
                .get(cursor)
                .and_then(StateRepresentation::superstate)
            {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    pub(crate) fn representation_mut(&mut self, state: &S) -> &mut StateRepresentation<S, T> {
        self.states
            .entry(state.clone())
            .or_insert_with(|| StateRepresentation::new(state.clone()))
    }

    /// Record `child` as a substate of `parent`, rejecting self-containment,
    /// containment cycles, and re-parenting to a different superstate.
    /// Linking the same pair twice is a no-op.
    pub(crate) fn link_substate(&mut self, child: S, parent: S) -> Result<(), ConfigurationError> {
        if child == parent {
            return Err(ConfigurationError::SubstateCycle {
                state: format!("{child:?}"),
                superstate: format!("{parent:?}"),
            });
        }
        if let Some(existing) = self
            .states
            .get(&child)
            .and_then(StateRepresentation::superstate)
        {
            if *existing == parent {
                return Ok(());
            }
            return Err(ConfigurationError::SuperstateConflict {
                state: format!("{child:?}"),
                current: format!("{existing:?}"),
                requested: format!("{parent:?}"),
            });
        }
        if self.is_ancestor_or_self(&child, &parent) {
            return Err(ConfigurationError::SubstateCycle {
                state: format!("{child:?}"),
                superstate: format!("{parent:?}"),
            });
        }
        self.representation_mut(&child).set_superstate(parent.clone());
        self.representation_mut(&parent).add_substate(child);
        Ok(())
    }
}

impl<S: StateKey, T: TriggerKey> Clone for StateMachine<S, T> {
    /// Clone the machine into an independent instance.
    ///
    /// The clone snapshots the current state into internal storage, receives
    /// a fresh identity, and deep-copies the configuration tables. Action
    /// handles registered before the clone are shared; registrations made
    /// on either machine afterwards are invisible to the other. The caller
    /// must ensure no other thread mutates the source machine during the
    /// clone.
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage: StateStorage::Internal(self.storage.get()),
            states: self.states.clone(),
            signatures: self.signatures.clone(),
            unhandled: Arc::clone(&self.unhandled),
        }
    }
}

impl<S: StateKey, T: TriggerKey> fmt::Display for StateMachine<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        write!(
            f,
            "StateMachine {{ state: {}, permitted triggers: [{}] }}",
            snapshot.state,
            snapshot.permitted_triggers.join(", ")
        )
    }
}
