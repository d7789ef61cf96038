use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use derivative::Derivative;
use crate::binding::Binding;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::hook::{connect, Disconnect};
use crate::lifetime::Lifetime;
use crate::state_cell::{StateCell, NOTIFY_VALUE};

/// A mutable reactive value.
///
/// Setting a value equal to the current one does nothing. Setting a different value notifies every
/// subscriber synchronously, before [State::set] returns.
///
/// Clones share the same underlying value. The value is freed when the last clone,
/// and the last [Binding] reading it, is dropped.
///
/// Only the top-level value is tracked: mutating something inside it behind the state's back
/// (e.g. through a `RefCell`) isn't noticed.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct State<T>(Rc<StateCell<T>>);

impl<T: Clone + PartialEq + 'static> State<T> {
    pub fn new(init: T) -> Self {
        State(Rc::new(StateCell::new(init)))
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        self.0.get()
    }

    /// Write a new value. If it equals the current one, nothing happens.
    ///
    /// Returns the failures of subscribers (and of anything they updated in turn).
    /// A failing subscriber doesn't stop the others.
    pub fn set(&self, value: T) -> Result<()> {
        self.0.set(value)
    }

    /// Set to a value computed from the current one.
    pub fn modify(&self, modify: impl FnOnce(&T) -> T) -> Result<()> {
        let next = modify(&self.get());
        self.set(next)
    }

    /// A read-only view which mirrors this state.
    ///
    /// Hand this out instead of the state itself to expose the value without granting write access.
    pub fn binding(&self) -> Binding<T> {
        Binding::from_state(self)
    }

    /// A read-only view of this state with `transform` applied.
    pub fn map<R: 'static>(&self, transform: impl Fn(T) -> R + 'static) -> Binding<R> {
        self.binding().map(transform)
    }

    /// Run `callback` with the new value whenever it changes, until disconnected.
    pub fn subscribe(&self, callback: impl Fn(T) + 'static) -> Disconnect {
        let cell = Rc::downgrade(&self.0);
        let id = self.0.connect_value(Rc::new(move |_| {
            if let Some(cell) = cell.upgrade() {
                callback(cell.get());
            }
            Ok(())
        }));
        let emitter: Rc<dyn Emitter> = self.0.clone();
        Disconnect::new(Rc::downgrade(&emitter), id)
    }

    /// Like [State::subscribe], but also disconnects when `lifetime` is destroyed.
    ///
    /// Fails if `lifetime` is already destroyed.
    pub fn subscribe_scoped(&self, lifetime: &(impl Lifetime + ?Sized), callback: impl Fn(T) + 'static) -> Result<Disconnect> {
        let cell = Rc::downgrade(&self.0);
        let emitter: Rc<dyn Emitter> = self.0.clone();
        connect(Some(lifetime.destroy_notify()), &emitter, NOTIFY_VALUE, Rc::new(move |_| {
            if let Some(cell) = cell.upgrade() {
                callback(cell.get());
            }
            Ok(())
        }))
    }

    /// Number of handlers connected to this state's changes.
    pub fn subscriber_count(&self) -> usize {
        self.0.handler_count()
    }

    pub(crate) fn cell(&self) -> &Rc<StateCell<T>> {
        &self.0
    }
}

impl<T> Debug for State<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "State<{}>", std::any::type_name::<T>())
    }
}
