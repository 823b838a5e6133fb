//! Per-state configuration: behaviours, actions, and hierarchy links.

use crate::core::{StateKey, Transition, TriggerArgs, TriggerKey};
use crate::machine::behaviour::TriggerBehaviour;
use crate::machine::error::{ActionError, ConfigurationError, FireError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Action executed when a state is entered.
pub(crate) type EntryAction<S, T> =
    Arc<dyn Fn(&Transition<S, T>, &TriggerArgs) -> Result<(), ActionError> + Send + Sync>;

/// Action executed when a state is exited.
pub(crate) type ExitAction<S, T> =
    Arc<dyn Fn(&Transition<S, T>) -> Result<(), ActionError> + Send + Sync>;

/// An entry action, optionally restricted to one causing trigger.
pub(crate) struct EntryHook<S: StateKey, T: TriggerKey> {
    filter: Option<T>,
    action: EntryAction<S, T>,
}

impl<S: StateKey, T: TriggerKey> EntryHook<S, T> {
    fn applies_to(&self, trigger: &T) -> bool {
        self.filter.as_ref().is_none_or(|wanted| wanted == trigger)
    }
}

impl<S: StateKey, T: TriggerKey> Clone for EntryHook<S, T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

/// Everything the machine knows about one state.
///
/// A representation owns the state's behaviour table, its entry and exit
/// actions, and its position in the substate hierarchy. Hierarchy links are
/// held by state identity rather than by reference, so representations can
/// be cloned wholesale when a machine is cloned. Cloning deep-copies every
/// table while sharing the action handles themselves.
pub(crate) struct StateRepresentation<S: StateKey, T: TriggerKey> {
    state: S,
    behaviours: HashMap<T, Vec<TriggerBehaviour<S, T>>>,
    entry_hooks: Vec<EntryHook<S, T>>,
    exit_actions: Vec<ExitAction<S, T>>,
    superstate: Option<S>,
    substates: HashSet<S>,
}

impl<S: StateKey, T: TriggerKey> StateRepresentation<S, T> {
    pub(crate) fn new(state: S) -> Self {
        Self {
            state,
            behaviours: HashMap::new(),
            entry_hooks: Vec::new(),
            exit_actions: Vec::new(),
            superstate: None,
            substates: HashSet::new(),
        }
    }

    pub(crate) fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn superstate(&self) -> Option<&S> {
        self.superstate.as_ref()
    }

    pub(crate) fn set_superstate(&mut self, superstate: S) {
        self.superstate = Some(superstate);
    }

    pub(crate) fn add_substate(&mut self, substate: S) {
        self.substates.insert(substate);
    }

    pub(crate) fn behaviours(&self) -> &HashMap<T, Vec<TriggerBehaviour<S, T>>> {
        &self.behaviours
    }

    /// Append a behaviour for `trigger`, rejecting a second behaviour that
    /// would match unconditionally alongside an existing one.
    pub(crate) fn add_behaviour(
        &mut self,
        trigger: T,
        behaviour: TriggerBehaviour<S, T>,
    ) -> Result<(), ConfigurationError> {
        let existing = self.behaviours.entry(trigger.clone()).or_default();
        if behaviour.always_matches() && existing.iter().any(TriggerBehaviour::always_matches) {
            return Err(ConfigurationError::AmbiguousBehaviour {
                state: format!("{:?}", self.state),
                trigger: format!("{trigger:?}"),
            });
        }
        existing.push(behaviour);
        Ok(())
    }

    /// Append a behaviour that can never match unconditionally, so no
    /// ambiguity check is needed.
    pub(crate) fn push_behaviour(&mut self, trigger: T, behaviour: TriggerBehaviour<S, T>) {
        self.behaviours.entry(trigger).or_default().push(behaviour);
    }

    pub(crate) fn add_entry_hook(&mut self, filter: Option<T>, action: EntryAction<S, T>) {
        self.entry_hooks.push(EntryHook { filter, action });
    }

    pub(crate) fn add_exit_action(&mut self, action: ExitAction<S, T>) {
        self.exit_actions.push(action);
    }

    /// First behaviour for `trigger` whose guard accepts `args`, scanning in
    /// declaration order.
    pub(crate) fn find_local(
        &self,
        trigger: &T,
        args: &TriggerArgs,
    ) -> Option<&TriggerBehaviour<S, T>> {
        self.behaviours
            .get(trigger)?
            .iter()
            .find(|behaviour| behaviour.matches(args))
    }

    /// Run the entry actions that apply to this transition, in declaration
    /// order. The first failure stops the walk.
    pub(crate) fn run_entry_hooks(
        &self,
        transition: &Transition<S, T>,
        args: &TriggerArgs,
    ) -> Result<(), FireError> {
        for hook in &self.entry_hooks {
            if hook.applies_to(&transition.trigger) {
                (hook.action)(transition, args)
                    .map_err(|error| FireError::action(transition, error))?;
            }
        }
        Ok(())
    }

    /// Run the exit actions in declaration order; the first failure stops the
    /// walk.
    pub(crate) fn run_exit_actions(&self, transition: &Transition<S, T>) -> Result<(), FireError> {
        for action in &self.exit_actions {
            action(transition).map_err(|error| FireError::action(transition, error))?;
        }
        Ok(())
    }
}

impl<S: StateKey, T: TriggerKey> Clone for StateRepresentation<S, T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            behaviours: self.behaviours.clone(),
            entry_hooks: self.entry_hooks.clone(),
            exit_actions: self.exit_actions.clone(),
            superstate: self.superstate.clone(),
            substates: self.substates.clone(),
        }
    }
}
