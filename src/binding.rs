use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use derivative::Derivative;
use crate::emitter::{property_reader, Emitter, EmitterKind, PropertyReader};
use crate::error::{Error, Result};
use crate::hook::{connect, Disconnect};
use crate::lifetime::{DestroyNotify, Lifetime};
use crate::names::kebabify;
use crate::state::State;
use crate::state_cell::{Wrapped, NOTIFY_VALUE, VALUE};
use crate::value::{FromValue, Value};

/// A read-only, lazily-evaluated view of one property of an emitter, with a chain of transforms.
///
/// A binding holds no value: every [Binding::get] re-reads the property and re-applies the whole
/// chain. [Binding::map] returns a new binding and leaves the original untouched, so
/// `b.map(f).map(g)` behaves exactly like `b.map(|x| g(f(x)))`.
///
/// A binding never writes to or destroys its emitter.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Binding<T> {
    emitter: Rc<dyn Emitter>,
    property: Rc<str>,
    signal: Rc<str>,
    kind: EmitterKind,
    read: PropertyReader,
    transform: Rc<dyn Fn(Value) -> Result<T>>
}

impl<T: 'static> Binding<T> {
    /// Bind to `property` of `emitter`.
    ///
    /// Fails immediately if the emitter has no such property, or doesn't announce its changes.
    pub fn bind<E: Emitter + 'static>(emitter: &Rc<E>, property: &str) -> Result<Self> where T: FromValue {
        Self::new(emitter.clone(), property, Rc::new(T::from_value))
    }

    /// Bind to a [State]. Equivalent to [State::binding].
    pub fn from_state(state: &State<T>) -> Self where T: Clone + PartialEq {
        Binding {
            emitter: state.cell().clone(),
            property: Rc::from(VALUE),
            signal: Rc::from(NOTIFY_VALUE),
            kind: EmitterKind::Object,
            read: property_reader(EmitterKind::Object),
            transform: Rc::new(|value: Value| Ok(value.downcast::<Wrapped<T>>()?.0.clone()))
        }
    }

    fn new(emitter: Rc<dyn Emitter>, property: &str, transform: Rc<dyn Fn(Value) -> Result<T>>) -> Result<Self> {
        let property = kebabify(property);
        if !emitter.has_property(&property) {
            return Err(Error::no_property(emitter.type_name(), &property))
        }
        let kind = emitter.kind();
        let signal = kind.change_signal(&property);
        if !emitter.has_signal(&signal) {
            return Err(Error::no_signal(emitter.type_name(), &signal))
        }
        Ok(Binding {
            emitter,
            property: Rc::from(property),
            signal: Rc::from(signal),
            kind,
            read: property_reader(kind),
            transform
        })
    }

    /// A new binding which applies `transform` after this one's transforms.
    ///
    /// `transform` should be pure. If it panics, the panic reaches whoever called [Binding::get]
    /// or caused the notification.
    pub fn map<U: 'static>(&self, transform: impl Fn(T) -> U + 'static) -> Binding<U> {
        let inner = Rc::clone(&self.transform);
        self.with_transform(Rc::new(move |value| inner(value).map(&transform)))
    }

    /// Like [Binding::map] for a transform which can fail. The failure surfaces as [Error::Transform].
    pub fn try_map<U: 'static, E: Into<Box<dyn std::error::Error>>>(&self, transform: impl Fn(T) -> Result<U, E> + 'static) -> Binding<U> {
        self.and_then(move |value| transform(value).map_err(|error| Error::Transform(error.into())))
    }

    pub(crate) fn and_then<U: 'static>(&self, transform: impl Fn(T) -> Result<U> + 'static) -> Binding<U> {
        let inner = Rc::clone(&self.transform);
        self.with_transform(Rc::new(move |value| inner(value).and_then(&transform)))
    }

    fn with_transform<U>(&self, transform: Rc<dyn Fn(Value) -> Result<U>>) -> Binding<U> {
        Binding {
            emitter: Rc::clone(&self.emitter),
            property: Rc::clone(&self.property),
            signal: Rc::clone(&self.signal),
            kind: self.kind,
            read: self.read,
            transform
        }
    }

    /// Read the property and apply every transform.
    pub fn get(&self) -> Result<T> {
        (self.transform)((self.read)(&*self.emitter, &self.property)?)
    }

    /// Run `callback` with the freshly transformed value whenever the property changes.
    pub fn subscribe(&self, callback: impl Fn(T) + 'static) -> Result<Disconnect> {
        self.watch(None, move |value| {
            callback(value);
            Ok(())
        })
    }

    /// Like [Binding::subscribe], but also disconnects when `lifetime` is destroyed.
    pub fn subscribe_scoped(&self, lifetime: &(impl Lifetime + ?Sized), callback: impl Fn(T) + 'static) -> Result<Disconnect> {
        self.watch(Some(lifetime.destroy_notify()), move |value| {
            callback(value);
            Ok(())
        })
    }

    /// Subscribe with a callback which can fail; its failure is returned from whatever triggered the change.
    pub(crate) fn watch(&self, lifetime: Option<&DestroyNotify>, callback: impl Fn(T) -> Result<()> + 'static) -> Result<Disconnect> {
        // The handler lives inside the emitter, so it must not own it
        let emitter = Rc::downgrade(&self.emitter);
        let property = Rc::clone(&self.property);
        let read = self.read;
        let transform = Rc::clone(&self.transform);
        connect(lifetime, &self.emitter, &self.signal, Rc::new(move |_| {
            let Some(emitter) = emitter.upgrade() else {
                return Ok(())
            };
            let value = transform(read(&*emitter, &property)?)?;
            callback(value)
        }))
    }

    /// The kebab-case name of the bound property.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The signal this binding listens to.
    pub fn signal(&self) -> &str {
        &self.signal
    }

    pub fn kind(&self) -> EmitterKind {
        self.kind
    }
}

impl<T> Debug for Binding<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Binding<{}>({}.{})", std::any::type_name::<T>(), self.emitter.type_name(), self.property)
    }
}
