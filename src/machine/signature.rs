//! Registered argument signatures for parameterized triggers.

use crate::core::{ArgDescriptor, ArgSet, TriggerArgs, TriggerKey};
use crate::machine::error::FireError;

/// The argument signature a trigger was registered with.
///
/// Stored by the machine when `set_trigger_parameters` runs; every
/// subsequent fire of the trigger is validated against it. Validation checks
/// arity and the `TypeId` of each slot, which catches a typed fire handle
/// that was registered on a different machine with different types.
#[derive(Clone, Debug)]
pub(crate) struct TriggerSignature<T: TriggerKey> {
    trigger: T,
    descriptors: Vec<ArgDescriptor>,
}

impl<T: TriggerKey> TriggerSignature<T> {
    pub(crate) fn of<A: ArgSet>(trigger: T) -> Self {
        Self {
            trigger,
            descriptors: A::descriptors(),
        }
    }

    pub(crate) fn validate(&self, args: &TriggerArgs) -> Result<(), FireError> {
        let matches = args.len() == self.descriptors.len()
            && self
                .descriptors
                .iter()
                .enumerate()
                .all(|(index, descriptor)| args.type_id_at(index) == Some(descriptor.type_id()));

        if matches {
            Ok(())
        } else {
            Err(FireError::ArgumentMismatch {
                trigger: format!("{:?}", self.trigger),
                expected: self
                    .descriptors
                    .iter()
                    .map(ArgDescriptor::type_name)
                    .collect::<Vec<_>>()
                    .join(", "),
                supplied: args.type_names().join(", "),
            })
        }
    }
}
