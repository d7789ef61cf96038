use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Debug, Formatter};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use crate::emitter::{read_property, write_property, Emitter, Handler, HandlerId, Method};
use crate::error::{Error, Result};
use crate::lifetime::{DestroyNotify, Lifetime};
use crate::misc::handlers::Handlers;
use crate::names::{getter_name, kebabify, setter_name, split_detail};
use crate::value::{FromValue, Value};

type MethodImpl = Rc<dyn Fn(&Object, &[Value]) -> Result<Value>>;

/// An in-memory object with declared properties and signals, the reference [Emitter].
///
/// Writing a property stores it and announces `notify::<property>` if the value changed.
/// Adapters over a real toolkit implement [Emitter] the same way.
pub struct Object {
    type_name: String,
    this: Weak<Object>,
    properties: RefCell<BTreeMap<String, Property>>,
    methods: HashMap<String, MethodImpl>,
    signals: BTreeSet<String>,
    handlers: Handlers,
    lifetime: DestroyNotify
}

struct Property {
    value: Value,
    writable: bool
}

/// Declares an [Object]'s properties, accessors and signals.
pub struct ObjectBuilder {
    type_name: String,
    properties: BTreeMap<String, Property>,
    methods: HashMap<String, MethodImpl>,
    signals: BTreeSet<String>
}

impl ObjectBuilder {
    /// A read-write property with an initial value.
    pub fn property(mut self, name: &str, init: impl Into<Value>) -> Self {
        self.properties.insert(kebabify(name), Property {
            value: init.into(),
            writable: true
        });
        self
    }

    /// A property which can only change through [Object::set_internal] or a `set_` method.
    pub fn read_only(mut self, name: &str, init: impl Into<Value>) -> Self {
        self.properties.insert(kebabify(name), Property {
            value: init.into(),
            writable: false
        });
        self
    }

    /// A read-write property with `get_<name>` and `set_<name>` methods which simply forward to the
    /// stored value, like a declared property with generated accessors.
    pub fn property_with_accessors(self, name: &str, init: impl Into<Value>) -> Self {
        let name = kebabify(name);
        let get_name = name.clone();
        let set_name = name.clone();
        self.property(&name, init)
            .method(&getter_name(&name), move |object, _| object.field(&get_name))
            .method(&setter_name(&name), move |object, args| {
                let value = args.first().cloned().unwrap_or_default();
                object.set_internal(&set_name, value)?;
                Ok(Value::None)
            })
    }

    /// A method other code can look up by name, e.g. a `get_<property>` accessor computing
    /// the property's value.
    pub fn method(mut self, name: &str, method: impl Fn(&Object, &[Value]) -> Result<Value> + 'static) -> Self {
        self.methods.insert(name.to_string(), Rc::new(method));
        self
    }

    /// A custom signal, announced with [Object::emit].
    pub fn signal(mut self, name: &str) -> Self {
        self.signals.insert(kebabify(name));
        self
    }

    pub fn build(self) -> Rc<Object> {
        let ObjectBuilder { type_name, properties, methods, signals } = self;
        log::trace!("new {} with {} properties and {} signals", type_name, properties.len(), signals.len());
        Rc::new_cyclic(|this| Object {
            type_name,
            this: this.clone(),
            properties: RefCell::new(properties),
            methods,
            signals,
            handlers: Handlers::new(),
            lifetime: DestroyNotify::new()
        })
    }
}

impl Object {
    pub fn builder(type_name: &str) -> ObjectBuilder {
        ObjectBuilder {
            type_name: type_name.to_string(),
            properties: BTreeMap::new(),
            methods: HashMap::new(),
            signals: BTreeSet::new()
        }
    }

    /// Read a property, through its `get_` accessor if there is one.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        T::from_value(read_property(self, name)?)
    }

    /// Write a property, through its `set_` accessor if there is one.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        write_property(self, name, value.into())
    }

    /// Read the stored value, bypassing accessors.
    pub fn field(&self, name: &str) -> Result<Value> {
        let name = kebabify(name);
        match self.properties.borrow().get(&name) {
            None => Err(Error::no_property(&self.type_name, &name)),
            Some(property) => Ok(property.value.clone())
        }
    }

    /// Store a value bypassing accessors and the read-only flag, and announce it if it changed.
    pub fn set_internal(&self, name: &str, value: Value) -> Result<()> {
        let name = kebabify(name);
        let old = {
            let mut properties = self.properties.borrow_mut();
            let Some(property) = properties.get_mut(&name) else {
                return Err(Error::no_property(&self.type_name, &name))
            };
            if property.value == value {
                return Ok(())
            }
            std::mem::replace(&mut property.value, value)
        };
        drop(old);
        self.notify(&name)
    }

    /// Announce that `property` changed.
    pub fn notify(&self, property: &str) -> Result<()> {
        let property = kebabify(property);
        if !self.has_property(&property) {
            return Err(Error::no_property(&self.type_name, &property))
        }
        self.handlers.emit(&format!("notify::{}", property), &[Value::Str(property.clone())])
    }

    /// Announce a custom signal.
    pub fn emit(&self, signal: &str, args: &[Value]) -> Result<()> {
        let signal = kebabify(signal);
        if !self.signals.contains(&signal) {
            return Err(Error::no_signal(&self.type_name, &signal))
        }
        self.handlers.emit(&signal, args)
    }

    /// End every subscription scoped to this object and drop every handler connected to it.
    pub fn destroy(&self) {
        if !self.lifetime.is_destroyed() {
            log::debug!("destroying {}", self.type_name);
        }
        self.lifetime.fire();
        self.handlers.clear();
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifetime.is_destroyed()
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Emitter for Object {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn has_property(&self, name: &str) -> bool {
        self.properties.borrow().contains_key(name)
    }

    fn property(&self, name: &str) -> Result<Value> {
        self.field(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<()> {
        let writable = self.properties.borrow().get(name).map(|property| property.writable);
        match writable {
            None => Err(Error::no_property(&self.type_name, name)),
            Some(false) => Err(Error::InvalidUsage(format!("{}.{} is read-only", self.type_name, name))),
            Some(true) => self.set_internal(name, value)
        }
    }

    fn method(&self, name: &str) -> Option<Method> {
        let method = Rc::clone(self.methods.get(name)?);
        let this = self.this.clone();
        let type_name = self.type_name.clone();
        Some(Rc::new(move |args| match this.upgrade() {
            Some(object) => method(&object, args),
            None => Err(Error::InvalidUsage(format!("calling a method on a dropped {}", type_name)))
        }))
    }

    fn has_signal(&self, signal: &str) -> bool {
        match split_detail(signal) {
            ("notify", None) => true,
            ("notify", Some(property)) => self.has_property(property),
            (name, None) => self.signals.contains(name),
            (_, Some(_)) => false
        }
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<HandlerId> {
        if self.is_destroyed() {
            return Err(Error::InvalidUsage(format!("connecting {} on a destroyed {}", signal, self.type_name)))
        }
        Ok(self.handlers.connect(signal, handler))
    }

    fn disconnect(&self, id: HandlerId) -> bool {
        self.handlers.disconnect(id)
    }
}

impl Lifetime for Object {
    fn destroy_notify(&self) -> &DestroyNotify {
        &self.lifetime
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let properties = self.properties.borrow();
        let mut debug = f.debug_struct(&self.type_name);
        for (name, property) in properties.iter() {
            debug.field(name, &property.value);
        }
        debug.finish()
    }
}
