//! Fluent API for declaring machine configuration.
//!
//! Configuration is declared one state at a time: `StateMachine::configure`
//! hands out a [`StateConfiguration`] that records permitted triggers,
//! guards, entry/exit actions, and hierarchy links directly on the machine.
//! Conflicting declarations are rejected when they are made, never at fire
//! time.

mod config;

pub use config::StateConfiguration;
