use std::cell::{Cell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};
use crate::emitter::{Emitter, Handler, HandlerId};
use crate::error::{Error, Result};
use crate::lifetime::{DestroyNotify, Lifetime, NotifyId, WeakDestroyNotify};
use crate::names::kebabify;
use crate::value::Value;

/// Ends a subscription.
///
/// Calling [Disconnect::disconnect] more than once, or after the subscription's lifetime was
/// destroyed, does nothing. Dropping the handle does *not* disconnect: a subscription lasts until
/// it's disconnected or its lifetime ends.
#[derive(Clone)]
pub struct Disconnect(Rc<RefCell<Option<Link>>>);

struct Link {
    emitter: Weak<dyn Emitter>,
    id: HandlerId,
    lifetime: Option<(WeakDestroyNotify, NotifyId)>
}

/// Connect `callback` to `signal` on `emitter` for as long as `lifetime` lives.
///
/// When `lifetime` is destroyed the handler is disconnected automatically and the returned
/// [Disconnect] becomes a no-op. Fails immediately if `emitter` has no such signal or `lifetime`
/// is already destroyed.
pub fn hook<E: Emitter + 'static>(
    lifetime: &(impl Lifetime + ?Sized),
    emitter: &Rc<E>,
    signal: &str,
    callback: impl Fn(&[Value]) -> Result<()> + 'static
) -> Result<Disconnect> {
    let emitter: Rc<dyn Emitter> = emitter.clone();
    connect(Some(lifetime.destroy_notify()), &emitter, signal, Rc::new(callback))
}

/// Connect `handler`, optionally scoped to `lifetime`. Shared by every subscribing operation.
pub(crate) fn connect(
    lifetime: Option<&DestroyNotify>,
    emitter: &Rc<dyn Emitter>,
    signal: &str,
    handler: Handler
) -> Result<Disconnect> {
    if lifetime.is_some_and(|lifetime| lifetime.is_destroyed()) {
        return Err(Error::InvalidUsage(format!("hooking {} on {} to a destroyed lifetime", signal, emitter.type_name())))
    }
    let signal = kebabify(signal);
    if !emitter.has_signal(&signal) {
        return Err(Error::no_signal(emitter.type_name(), &signal))
    }

    let Some(lifetime) = lifetime else {
        let id = emitter.connect(&signal, handler)?;
        return Ok(Disconnect::new(Rc::downgrade(emitter), id))
    };

    // Dropping the handler unregisters its teardown callback
    let guard = Rc::new(LifetimeGuard {
        lifetime: lifetime.downgrade(),
        notify_id: Cell::new(None)
    });
    let guarded = Rc::clone(&guard);
    let id = emitter.connect(&signal, Rc::new(move |args| {
        let _guard = &guarded;
        handler(args)
    }))?;
    let disconnect = Disconnect::new(Rc::downgrade(emitter), id);

    let teardown = Rc::clone(&disconnect.0);
    let notify_id = lifetime.add(move || {
        let link = teardown.borrow_mut().take();
        if let Some(link) = link {
            log::debug!("lifetime ended, releasing handler {:?}", link.id);
            link.release();
        }
    });
    guard.notify_id.set(notify_id);
    if let (Some(notify_id), Some(link)) = (notify_id, disconnect.0.borrow_mut().as_mut()) {
        link.lifetime = Some((lifetime.downgrade(), notify_id));
    }
    Ok(disconnect)
}

/// Unregisters a handler's teardown callback once the handler itself is dropped, e.g. because
/// its emitter was destroyed first.
struct LifetimeGuard {
    lifetime: WeakDestroyNotify,
    notify_id: Cell<Option<NotifyId>>
}

impl Drop for LifetimeGuard {
    fn drop(&mut self) {
        if let Some(notify_id) = self.notify_id.take() {
            self.lifetime.remove(notify_id);
        }
    }
}

impl Link {
    fn release(self) {
        if let Some(emitter) = self.emitter.upgrade() {
            emitter.disconnect(self.id);
        }
        if let Some((lifetime, notify_id)) = self.lifetime {
            lifetime.remove(notify_id);
        }
    }
}

impl Disconnect {
    /// Unscoped handle for a handler already connected to `emitter`.
    pub(crate) fn new(emitter: Weak<dyn Emitter>, id: HandlerId) -> Self {
        Disconnect(Rc::new(RefCell::new(Some(Link {
            emitter,
            id,
            lifetime: None
        }))))
    }

    pub fn disconnect(&self) {
        let link = self.0.borrow_mut().take();
        if let Some(link) = link {
            link.release();
        }
    }

    /// False once disconnected, explicitly or because the lifetime ended.
    pub fn is_connected(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl Debug for Disconnect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disconnect")
            .field("connected", &self.is_connected())
            .finish()
    }
}
