//! Reactive state and one-way property bindings over observable objects.
//!
//! A [State] is a mutable value which notifies its subscribers when it changes. A [Binding] is a
//! read-only view of one property of an [Emitter] (a [State], an [Object], a [Settings] store, or
//! any type implementing the trait) with a chain of pure transforms. You can:
//!
//! - [sync] a binding into a property of another emitter, so the property follows the binding
//! - [derive] a new state from several bindings, recomputed from all of them whenever any changes
//! - [observe] signals into a state through reducers
//! - [hook] a raw callback onto a signal for as long as some [Lifetime] lives
//!
//! Everything is single-threaded and synchronous: by the time [State::set] returns, every
//! subscriber, synced property and derived state downstream has been updated.
//!
//! Subscriptions never keep their emitter or their target alive. They end when the target's
//! lifetime ends, or when you call [Disconnect::disconnect]; dropping a [Disconnect] does nothing.
//!
//! Property and signal names go through [names::kebabify], so `iconName`, `icon_name` and
//! `icon-name` are the same property.

pub(crate) mod misc;
pub(crate) mod error;
pub mod names;
pub(crate) mod value;
pub(crate) mod emitter;
pub(crate) mod lifetime;
pub(crate) mod hook;
pub(crate) mod state_cell;
pub(crate) mod state;
pub(crate) mod binding;
pub(crate) mod sync;
pub(crate) mod derive;
pub(crate) mod observe;
pub(crate) mod object;
pub(crate) mod settings;

pub use error::*;
pub use value::*;
pub use emitter::{read_property, write_property, Emitter, EmitterKind, Handler, HandlerId, Method, PropertyReader};
pub use lifetime::{DestroyNotify, Lifetime, NotifyId};
pub use hook::{hook, Disconnect};
pub use state::*;
pub use binding::*;
pub use sync::*;
pub use derive::*;
pub use observe::*;
pub use object::*;
pub use settings::*;
