//! Typed trigger arguments.
//!
//! Triggers may carry up to three typed arguments. The statically typed
//! surface is the [`ArgSet`] tuple trait together with [`TriggerWithArgs`],
//! the handle returned by `StateMachine::set_trigger_parameters`. At fire
//! time the tuple is erased into a [`TriggerArgs`] bag so that guards,
//! dynamic destination selectors, and entry actions can share one runtime
//! representation; each slot keeps a type tag so the machine can verify
//! supplied arguments against the registered signature.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

/// Describes one argument slot of a registered trigger signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgDescriptor {
    type_id: TypeId,
    type_name: &'static str,
}

impl ArgDescriptor {
    pub(crate) fn of<V: Any>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
        }
    }

    /// The `TypeId` of the expected argument type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The diagnostic name of the expected argument type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

struct ArgCell {
    value: Box<dyn Any + Send>,
    type_id: TypeId,
    type_name: &'static str,
}

/// Type-erased bag of arguments supplied when a trigger is fired.
///
/// Guards, dynamic destination selectors, and trigger-filtered entry actions
/// all receive a reference to the bag. Values are recovered by index with
/// [`get`](TriggerArgs::get); the lookup returns `None` when the index is out
/// of range or the requested type does not match the stored value.
///
/// # Example
///
/// ```rust
/// use statecraft::{ArgSet, TriggerArgs};
///
/// let args = ("Joe".to_string(), 3u32).into_args();
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get::<String>(0).map(String::as_str), Some("Joe"));
/// assert_eq!(args.get::<u32>(1), Some(&3));
/// assert!(args.get::<u32>(0).is_none());
///
/// let empty = TriggerArgs::empty();
/// assert!(empty.is_empty());
/// ```
pub struct TriggerArgs {
    cells: Vec<ArgCell>,
}

impl TriggerArgs {
    /// The argument bag carried by a plain, parameterless fire.
    pub fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Number of arguments supplied.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Recover the argument at `index` as type `V`.
    ///
    /// Returns `None` when the index is out of range or the stored value is
    /// not a `V`.
    pub fn get<V: Any>(&self, index: usize) -> Option<&V> {
        self.cells.get(index)?.value.downcast_ref::<V>()
    }

    pub(crate) fn push<V: Any + Send>(&mut self, value: V) {
        self.cells.push(ArgCell {
            value: Box::new(value),
            type_id: TypeId::of::<V>(),
            type_name: type_name::<V>(),
        });
    }

    pub(crate) fn type_id_at(&self, index: usize) -> Option<TypeId> {
        self.cells.get(index).map(|cell| cell.type_id)
    }

    pub(crate) fn type_names(&self) -> Vec<&'static str> {
        self.cells.iter().map(|cell| cell.type_name).collect()
    }
}

impl Default for TriggerArgs {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for TriggerArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.cells.iter().map(|cell| cell.type_name))
            .finish()
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for () {}
    impl<A0> Sealed for (A0,) {}
    impl<A0, A1> Sealed for (A0, A1) {}
    impl<A0, A1, A2> Sealed for (A0, A1, A2) {}
}

/// Tuple of argument types a trigger can be registered with.
///
/// Implemented for tuples of zero to three `Send + 'static` elements: `()`,
/// `(A0,)`, `(A0, A1)`, and `(A0, A1, A2)`. The trait is sealed; wider
/// argument lists are represented by grouping values into a struct and
/// registering a single-element tuple.
pub trait ArgSet: sealed::Sealed + Send + 'static {
    /// One descriptor per argument slot, in positional order.
    fn descriptors() -> Vec<ArgDescriptor>;

    /// Erase the tuple into the runtime argument bag.
    fn into_args(self) -> TriggerArgs;
}

impl ArgSet for () {
    fn descriptors() -> Vec<ArgDescriptor> {
        Vec::new()
    }

    fn into_args(self) -> TriggerArgs {
        TriggerArgs::empty()
    }
}

impl<A0: Any + Send> ArgSet for (A0,) {
    fn descriptors() -> Vec<ArgDescriptor> {
        vec![ArgDescriptor::of::<A0>()]
    }

    fn into_args(self) -> TriggerArgs {
        let mut args = TriggerArgs::empty();
        args.push(self.0);
        args
    }
}

impl<A0: Any + Send, A1: Any + Send> ArgSet for (A0, A1) {
    fn descriptors() -> Vec<ArgDescriptor> {
        vec![ArgDescriptor::of::<A0>(), ArgDescriptor::of::<A1>()]
    }

    fn into_args(self) -> TriggerArgs {
        let mut args = TriggerArgs::empty();
        args.push(self.0);
        args.push(self.1);
        args
    }
}

impl<A0: Any + Send, A1: Any + Send, A2: Any + Send> ArgSet for (A0, A1, A2) {
    fn descriptors() -> Vec<ArgDescriptor> {
        vec![
            ArgDescriptor::of::<A0>(),
            ArgDescriptor::of::<A1>(),
            ArgDescriptor::of::<A2>(),
        ]
    }

    fn into_args(self) -> TriggerArgs {
        let mut args = TriggerArgs::empty();
        args.push(self.0);
        args.push(self.1);
        args.push(self.2);
        args
    }
}

/// Handle for firing a trigger together with its registered arguments.
///
/// Obtained from `StateMachine::set_trigger_parameters`, which records the
/// argument signature for the trigger and hands back this typed wrapper. The
/// wrapper pins the argument tuple type at the call site, so supplying the
/// wrong number or type of arguments to `fire_with` fails to compile.
///
/// # Example
///
/// ```rust
/// use statecraft::StateMachine;
///
/// let mut machine = StateMachine::new("open");
/// let assign = machine
///     .set_trigger_parameters::<(String,)>("assign")
///     .unwrap();
/// machine
///     .configure("open")
///     .permit("assign", "assigned")
///     .unwrap();
///
/// machine.fire_with(&assign, ("Joe".to_string(),)).unwrap();
/// assert_eq!(machine.state(), "assigned");
/// ```
pub struct TriggerWithArgs<T, A> {
    trigger: T,
    _args: PhantomData<fn(A)>,
}

impl<T, A> TriggerWithArgs<T, A> {
    pub(crate) fn new(trigger: T) -> Self {
        Self {
            trigger,
            _args: PhantomData,
        }
    }

    /// The underlying trigger value.
    pub fn trigger(&self) -> &T {
        &self.trigger
    }
}

impl<T: Clone, A> Clone for TriggerWithArgs<T, A> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger.clone(),
            _args: PhantomData,
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for TriggerWithArgs<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerWithArgs")
            .field("trigger", &self.trigger)
            .finish()
    }
}
