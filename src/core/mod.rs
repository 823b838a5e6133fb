//! Core value types shared across the crate.
//!
//! This module contains the pure data layer of the library:
//! - State and trigger key requirements via the `StateKey`/`TriggerKey` traits
//! - Guard predicates for transition control
//! - Immutable transition records
//! - Typed trigger arguments and their runtime representation
//!
//! Nothing in this module mutates machine state; everything here is a value
//! the machine layer orchestrates.

mod args;
mod guard;
mod state;
mod transition;

pub use args::{ArgDescriptor, ArgSet, TriggerArgs, TriggerWithArgs};
pub use guard::{Guard, IntoGuard};
pub use state::{StateKey, TriggerKey};
pub use transition::Transition;
