//! Statecraft: hierarchical, trigger-driven state machines
//!
//! Statecraft models a machine as plain state and trigger values plus a
//! configuration declared one state at a time. States may be nested, so that
//! a substate inherits the trigger behaviours of its superstates; triggers
//! may be guarded, carry typed arguments, pick their destination at fire
//! time, or run internal actions without leaving the state. Configuration
//! mistakes are rejected when they are declared, never at fire time.
//!
//! # Core Concepts
//!
//! - **States and triggers**: any `Clone + Eq + Hash + Debug` value; see
//!   [`StateKey`] and [`TriggerKey`]
//! - **Behaviours**: per-state responses to a trigger, declared through
//!   [`StateConfiguration`]
//! - **Guards**: pure predicates over the fired arguments that select
//!   between behaviours
//! - **Hierarchy**: `substate_of` nests states; entry and exit actions run
//!   along the chain in hierarchical order
//! - **Sequencing**: [`SequentialActionQueue`] serializes work from many
//!   threads into one in-order worker
//!
//! # Example
//!
//! ```rust
//! use statecraft::StateMachine;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Power {
//!     Off,
//!     On,
//! }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Flip {
//!     Toggle,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut machine = StateMachine::new(Power::Off);
//! machine.configure(Power::Off).permit(Flip::Toggle, Power::On)?;
//! machine.configure(Power::On).permit(Flip::Toggle, Power::Off)?;
//!
//! machine.fire(Flip::Toggle)?;
//! assert_eq!(machine.state(), Power::On);
//!
//! machine.fire(Flip::Toggle)?;
//! assert_eq!(machine.state(), Power::Off);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod machine;
pub mod queue;

// Re-export commonly used types
pub use crate::builder::StateConfiguration;
pub use crate::core::{
    ArgDescriptor, ArgSet, Guard, IntoGuard, StateKey, Transition, TriggerArgs, TriggerKey,
    TriggerWithArgs,
};
pub use crate::machine::{
    ActionError, ConfigurationError, FireError, MachineSnapshot, StateMachine,
};
pub use crate::queue::SequentialActionQueue;
