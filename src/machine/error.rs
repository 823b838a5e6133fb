//! Errors raised while configuring or driving a state machine.

use crate::core::Transition;
use std::fmt::Debug;
use thiserror::Error;

/// Error type returned by entry, exit, and internal transition actions.
///
/// Actions report failure with any boxed error; the machine wraps it in
/// [`FireError::Action`] together with the transition being executed.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while declaring machine configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "state '{state}' already has an always-matching behaviour for trigger '{trigger}'; \
         only guarded behaviours may coexist"
    )]
    AmbiguousBehaviour { state: String, trigger: String },

    #[error("parameters for trigger '{trigger}' have already been registered")]
    TriggerAlreadyParameterized { trigger: String },

    #[error("making '{state}' a substate of '{superstate}' would create a containment cycle")]
    SubstateCycle { state: String, superstate: String },

    #[error("state '{state}' is already a substate of '{current}' and cannot be re-parented to '{requested}'")]
    SuperstateConflict {
        state: String,
        current: String,
        requested: String,
    },
}

/// Errors that can occur when a trigger is fired.
#[derive(Debug, Error)]
pub enum FireError {
    #[error("no valid leaving transitions are permitted from state '{state}' for trigger '{trigger}'")]
    InvalidTransition { state: String, trigger: String },

    #[error("trigger '{trigger}' expects arguments ({expected}) but was fired with ({supplied})")]
    ArgumentMismatch {
        trigger: String,
        expected: String,
        supplied: String,
    },

    #[error("action failed while handling '{trigger}' from '{source}' to '{destination}': {error}")]
    Action {
        source: String,
        destination: String,
        trigger: String,
        #[source]
        error: ActionError,
    },
}

impl FireError {
    pub(crate) fn invalid_transition<S: Debug, T: Debug>(state: &S, trigger: &T) -> Self {
        FireError::InvalidTransition {
            state: format!("{state:?}"),
            trigger: format!("{trigger:?}"),
        }
    }

    pub(crate) fn action<S: Debug, T: Debug>(
        transition: &Transition<S, T>,
        error: ActionError,
    ) -> Self {
        FireError::Action {
            source: format!("{:?}", transition.source),
            destination: format!("{:?}", transition.destination),
            trigger: format!("{:?}", transition.trigger),
            error,
        }
    }
}
