use std::rc::Rc;
use crate::error::{Error, Result};
use crate::names::{changed_signal, getter_name, kebabify, notify_signal, setter_name};
use crate::value::Value;

/// Callback connected to a signal. Receives whatever arguments the signal carries.
pub type Handler = Rc<dyn Fn(&[Value]) -> Result<()>>;

/// A named method exposed by an emitter, e.g. a `get_<property>` accessor.
pub type Method = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// Identifies a connected [Handler] on one emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub(crate) u64);

/// How an emitter announces property changes.
///
/// Decided once when a [Binding](crate::Binding) is created, never re-probed on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterKind {
    /// Announces `notify::<property>` and may expose `get_`/`set_` accessors.
    Object,
    /// A settings store: keys are read directly and announce `changed::<key>`.
    Settings
}

/// The capability the reactive core needs from anything it binds to: named properties you can
/// read and write, and signals you can connect to.
///
/// Names passed in are already kebab-case. Use [read_property] and [write_property] instead of
/// calling `property` and `set_property` directly, they apply the accessor conventions.
pub trait Emitter {
    fn kind(&self) -> EmitterKind {
        EmitterKind::Object
    }

    /// Used in error messages and logs.
    fn type_name(&self) -> &str;

    fn has_property(&self, name: &str) -> bool;

    /// Direct field read.
    fn property(&self, name: &str) -> Result<Value>;

    /// Direct field write. Announces the change if the value differs.
    fn set_property(&self, name: &str, value: Value) -> Result<()>;

    /// Look up a method by name.
    fn method(&self, _name: &str) -> Option<Method> {
        None
    }

    /// Whether `signal` (with or without a `::detail`) can be connected to.
    fn has_signal(&self, signal: &str) -> bool;

    fn connect(&self, signal: &str, handler: Handler) -> Result<HandlerId>;

    /// Returns whether the handler was still connected.
    fn disconnect(&self, id: HandlerId) -> bool;
}

impl EmitterKind {
    /// The signal announced when `property` changes on an emitter of this kind.
    pub fn change_signal(self, property: &str) -> String {
        match self {
            EmitterKind::Object => notify_signal(property),
            EmitterKind::Settings => changed_signal(property)
        }
    }
}

/// Reads an already-normalised property name off an emitter of a particular kind.
pub type PropertyReader = fn(&dyn Emitter, &str) -> Result<Value>;

/// Read `name`, preferring a `get_<name>` accessor over the field itself.
///
/// Settings stores don't have accessors, their keys are always read directly.
pub fn read_property(emitter: &dyn Emitter, name: &str) -> Result<Value> {
    property_reader(emitter.kind())(emitter, &kebabify(name))
}

/// Pick the read convention for an emitter kind.
pub(crate) fn property_reader(kind: EmitterKind) -> PropertyReader {
    match kind {
        EmitterKind::Object => read_accessor_or_field,
        EmitterKind::Settings => read_key
    }
}

fn read_accessor_or_field(emitter: &dyn Emitter, name: &str) -> Result<Value> {
    match emitter.method(&getter_name(name)) {
        Some(getter) => getter(&[]),
        None => read_key(emitter, name)
    }
}

fn read_key(emitter: &dyn Emitter, name: &str) -> Result<Value> {
    if !emitter.has_property(name) {
        return Err(Error::no_property(emitter.type_name(), name))
    }
    emitter.property(name)
}

/// Write `name`, preferring a `set_<name>` mutator over direct assignment.
pub fn write_property(emitter: &dyn Emitter, name: &str, value: Value) -> Result<()> {
    let name = kebabify(name);
    if !emitter.has_property(&name) {
        return Err(Error::no_property(emitter.type_name(), &name))
    }
    match emitter.method(&setter_name(&name)) {
        Some(setter) => setter(&[value]).map(|_| ()),
        None => emitter.set_property(&name, value)
    }
}
