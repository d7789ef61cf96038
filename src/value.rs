use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use crate::error::{Error, Result};

/// A dynamically-typed property value, the payload every [Emitter](crate::Emitter) reads and writes.
///
/// Scalars compare by value. [Value::Object] compares by identity of the shared allocation,
/// which is what lets a state cell announce a change whenever it stores a fresh wrapper.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Object(Rc<dyn Any>)
}

/// Conversion out of a [Value].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

/// Conversion into a [Value].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl Value {
    /// Box an arbitrary value; it will compare by identity.
    pub fn object<T: 'static>(value: T) -> Self {
        Value::Object(Rc::new(value))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Object(_) => "object"
        }
    }

    /// Downcast the boxed payload of an [Value::Object].
    pub fn downcast<T: 'static>(self) -> Result<Rc<T>> {
        let found = self.type_name();
        match self {
            Value::Object(object) => object.downcast::<T>().map_err(|_| Error::Type {
                expected: std::any::type_name::<T>(),
                found
            }),
            _ => Err(Error::Type {
                expected: std::any::type_name::<T>(),
                found
            })
        }
    }

    fn mismatch<T>(&self) -> Error {
        Error::Type {
            expected: std::any::type_name::<T>(),
            found: self.type_name()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(x) => write!(f, "Bool({:?})", x),
            Value::Int(x) => write!(f, "Int({:?})", x),
            Value::Double(x) => write!(f, "Double({:?})", x),
            Value::Str(x) => write!(f, "Str({:?})", x),
            Value::Object(x) => write!(f, "Object({:p})", Rc::as_ptr(x))
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

// region conversions boilerplate

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(x) => Ok(x),
            other => Err(other.mismatch::<bool>())
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(x) => Ok(x),
            other => Err(other.mismatch::<i64>())
        }
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(x) => i32::try_from(x).map_err(|_| Value::Int(x).mismatch::<i32>()),
            other => Err(other.mismatch::<i32>())
        }
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(x) => u32::try_from(x).map_err(|_| Value::Int(x).mismatch::<u32>()),
            other => Err(other.mismatch::<u32>())
        }
    }
}

impl ToValue for u32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Double(x) => Ok(x),
            // Ints widen silently, like a double property accepting an integer literal
            Value::Int(x) => Ok(x as f64),
            other => Err(other.mismatch::<f64>())
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(x) => Ok(x),
            other => Err(other.mismatch::<String>())
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

macro_rules! value_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(x: $t) -> Self {
                x.to_value()
            }
        })*
    }
}

value_from!(bool, i32, i64, u32, f64, String, &str);

// endregion
