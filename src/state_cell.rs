use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use crate::emitter::{Emitter, Handler, HandlerId};
use crate::error::{Error, Result};
use crate::lifetime::{DestroyNotify, Lifetime};
use crate::misc::handlers::Handlers;
use crate::value::Value;

pub(crate) const VALUE: &str = "value";
pub(crate) const NOTIFY_VALUE: &str = "notify::value";

/// The single-field record a cell stores its value in.
///
/// Every accepted value gets a fresh allocation, so the cell's stored [Value::Object] changes
/// identity on every change even when `T` itself is shared.
pub(crate) struct Wrapped<T>(pub(crate) T);

/// Private observable box behind a [State](crate::State). Exposes one property, `value`.
pub(crate) struct StateCell<T> {
    value: RefCell<Rc<Wrapped<T>>>,
    handlers: Handlers,
    destroy: DestroyNotify
}

impl<T: Clone + PartialEq + 'static> StateCell<T> {
    pub(crate) fn new(init: T) -> Self {
        StateCell {
            value: RefCell::new(Rc::new(Wrapped(init))),
            handlers: Handlers::new(),
            destroy: DestroyNotify::new()
        }
    }

    pub(crate) fn get(&self) -> T {
        self.value.borrow().0.clone()
    }

    /// Store `value` and notify, unless it equals the current one.
    pub(crate) fn set(&self, value: T) -> Result<()> {
        if self.value.borrow().0 == value {
            return Ok(())
        }
        self.store(Rc::new(Wrapped(value)))
    }

    /// Store an already-wrapped value, same gate as [StateCell::set].
    fn set_wrapped(&self, wrapped: Rc<Wrapped<T>>) -> Result<()> {
        if self.value.borrow().0 == wrapped.0 {
            return Ok(())
        }
        self.store(wrapped)
    }

    fn store(&self, wrapped: Rc<Wrapped<T>>) -> Result<()> {
        let old = self.value.replace(wrapped);
        // The old value may own something which re-enters on drop
        drop(old);
        self.handlers.emit(NOTIFY_VALUE, &[])
    }

    /// Connect directly, bypassing signal validation.
    pub(crate) fn connect_value(&self, handler: Handler) -> HandlerId {
        self.handlers.connect(NOTIFY_VALUE, handler)
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<T: Clone + PartialEq + 'static> Emitter for StateCell<T> {
    fn type_name(&self) -> &str {
        "State"
    }

    fn has_property(&self, name: &str) -> bool {
        name == VALUE
    }

    fn property(&self, name: &str) -> Result<Value> {
        if name != VALUE {
            return Err(Error::no_property(self.type_name(), name))
        }
        let wrapped: Rc<dyn Any> = self.value.borrow().clone();
        Ok(Value::Object(wrapped))
    }

    fn set_property(&self, name: &str, value: Value) -> Result<()> {
        if name != VALUE {
            return Err(Error::no_property(self.type_name(), name))
        }
        self.set_wrapped(value.downcast::<Wrapped<T>>()?)
    }

    fn has_signal(&self, signal: &str) -> bool {
        signal == "notify" || signal == NOTIFY_VALUE
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<HandlerId> {
        Ok(self.handlers.connect(signal, handler))
    }

    fn disconnect(&self, id: HandlerId) -> bool {
        self.handlers.disconnect(id)
    }
}

impl<T> Lifetime for StateCell<T> {
    fn destroy_notify(&self) -> &DestroyNotify {
        &self.destroy
    }
}

impl<T> Drop for StateCell<T> {
    fn drop(&mut self) {
        self.destroy.fire();
        self.handlers.clear();
    }
}
