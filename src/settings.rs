use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use heck::ToShoutySnakeCase;
use crate::emitter::{Emitter, EmitterKind, Handler, HandlerId};
use crate::error::{Error, Result};
use crate::lifetime::{DestroyNotify, Lifetime};
use crate::misc::handlers::Handlers;
use crate::names::{changed_signal, kebabify, split_detail};
use crate::value::{FromValue, Value};

/// A typed key-value settings store.
///
/// Every key is declared up front with a default, which also fixes its type. Changing a key
/// announces `changed::<key>` with the key name as the only argument. Bindings onto a store read
/// keys directly and listen to `changed::` instead of `notify::`.
pub struct Settings {
    schema_id: String,
    keys: RefCell<BTreeMap<String, Key>>,
    handlers: Handlers,
    lifetime: DestroyNotify
}

struct Key {
    value: Value,
    default: Value
}

/// Declares the keys of a [Settings] store.
pub struct SettingsBuilder {
    schema_id: String,
    keys: BTreeMap<String, Value>,
    env_prefix: Option<String>
}

impl SettingsBuilder {
    pub fn key(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.keys.insert(kebabify(name), default.into());
        self
    }

    /// Seed keys from environment variables named `<prefix><KEY_NAME>`, e.g. `APP_FONT_SIZE` for
    /// `font-size` with prefix `APP_`. Values are parsed according to the key's default.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    pub fn build(self) -> Rc<Settings> {
        let SettingsBuilder { schema_id, keys, env_prefix } = self;
        let keys = keys.into_iter().map(|(name, default)| {
            let value = match &env_prefix {
                None => default.clone(),
                Some(prefix) => env_override(prefix, &name, &default).unwrap_or_else(|| default.clone())
            };
            (name, Key { value, default })
        }).collect();
        Rc::new(Settings {
            schema_id,
            keys: RefCell::new(keys),
            handlers: Handlers::new(),
            lifetime: DestroyNotify::new()
        })
    }
}

fn env_var_name(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key.to_shouty_snake_case())
}

fn env_override(prefix: &str, key: &str, default: &Value) -> Option<Value> {
    let var = env_var_name(prefix, key);
    let raw = std::env::var(&var).ok()?;
    let parsed = match default {
        Value::Bool(_) => match raw.trim() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None
        },
        Value::Int(_) => raw.trim().parse().ok().map(Value::Int),
        Value::Double(_) => raw.trim().parse().ok().map(Value::Double),
        Value::Str(_) => Some(Value::Str(raw.clone())),
        Value::None | Value::Object(_) => None
    };
    if parsed.is_none() {
        log::warn!("ignoring {}={:?}: not a valid {}", var, raw, default.type_name());
    }
    parsed
}

impl Settings {
    pub fn builder(schema_id: &str) -> SettingsBuilder {
        SettingsBuilder {
            schema_id: schema_id.to_string(),
            keys: BTreeMap::new(),
            env_prefix: None
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    pub fn value(&self, key: &str) -> Result<Value> {
        let key = kebabify(key);
        match self.keys.borrow().get(&key) {
            None => Err(Error::no_property(&self.schema_id, &key)),
            Some(entry) => Ok(entry.value.clone())
        }
    }

    /// Read a key converted to `T`.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        T::from_value(self.value(key)?)
    }

    /// Change a key. The value must have the same type as the key's default.
    pub fn set_value(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let key = kebabify(key);
        let value = value.into();
        {
            let mut keys = self.keys.borrow_mut();
            let Some(entry) = keys.get_mut(&key) else {
                return Err(Error::no_property(&self.schema_id, &key))
            };
            if entry.default.type_name() != value.type_name() {
                return Err(Error::Type {
                    expected: entry.default.type_name(),
                    found: value.type_name()
                })
            }
            if entry.value == value {
                return Ok(())
            }
            entry.value = value;
        }
        self.handlers.emit(&changed_signal(&key), &[Value::Str(key.clone())])
    }

    /// Restore a key's default.
    pub fn reset(&self, key: &str) -> Result<()> {
        let default = {
            let key = kebabify(key);
            match self.keys.borrow().get(&key) {
                None => return Err(Error::no_property(&self.schema_id, &key)),
                Some(entry) => entry.default.clone()
            }
        };
        self.set_value(key, default)
    }

    pub fn is_default(&self, key: &str) -> Result<bool> {
        let key = kebabify(key);
        match self.keys.borrow().get(&key) {
            None => Err(Error::no_property(&self.schema_id, &key)),
            Some(entry) => Ok(entry.value == entry.default)
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.borrow().keys().cloned().collect()
    }
}

impl Emitter for Settings {
    fn kind(&self) -> EmitterKind {
        EmitterKind::Settings
    }

    fn type_name(&self) -> &str {
        &self.schema_id
    }

    fn has_property(&self, name: &str) -> bool {
        self.keys.borrow().contains_key(name)
    }

    fn property(&self, name: &str) -> Result<Value> {
        self.value(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<()> {
        self.set_value(name, value)
    }

    fn has_signal(&self, signal: &str) -> bool {
        match split_detail(signal) {
            ("changed", None) => true,
            ("changed", Some(key)) => self.has_property(key),
            _ => false
        }
    }

    fn connect(&self, signal: &str, handler: Handler) -> Result<HandlerId> {
        Ok(self.handlers.connect(signal, handler))
    }

    fn disconnect(&self, id: HandlerId) -> bool {
        self.handlers.disconnect(id)
    }
}

impl Lifetime for Settings {
    fn destroy_notify(&self) -> &DestroyNotify {
        &self.lifetime
    }
}

impl Drop for Settings {
    fn drop(&mut self) {
        self.lifetime.fire();
        self.handlers.clear();
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let keys = self.keys.borrow();
        let mut debug = f.debug_struct(&self.schema_id);
        for (name, key) in keys.iter() {
            debug.field(name, &key.value);
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_names() {
        assert_eq!(env_var_name("APP_", "font-size"), "APP_FONT_SIZE");
        assert_eq!(env_var_name("", "dark"), "DARK");
        assert_eq!(env_var_name("EDITOR_", "tab-width-2"), "EDITOR_TAB_WIDTH_2");
    }

    #[test]
    fn env_overrides_follow_default_type() {
        std::env::set_var("PROP_RX_UNIT_SCALE", "1.5");
        std::env::set_var("PROP_RX_UNIT_DARK", "1");
        std::env::set_var("PROP_RX_UNIT_COUNT", "many");
        let settings = Settings::builder("unit")
            .key("scale", 1.0)
            .key("dark", false)
            .key("count", 3)
            .key("name", "x")
            .env_prefix("PROP_RX_UNIT_")
            .build();
        assert_eq!(settings.get::<f64>("scale").unwrap(), 1.5);
        assert!(settings.get::<bool>("dark").unwrap());
        assert_eq!(settings.get::<i64>("count").unwrap(), 3);
        assert_eq!(settings.get::<String>("name").unwrap(), "x");
        assert!(!settings.is_default("scale").unwrap());
    }
}
