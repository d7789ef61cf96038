use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

/// Something whose destruction can end subscriptions.
///
/// Pass one to [hook](crate::hook) or `subscribe_scoped` and the subscription is released,
/// exactly once, when the lifetime is destroyed.
pub trait Lifetime {
    fn destroy_notify(&self) -> &DestroyNotify;
}

/// Identifies a callback registered on a [DestroyNotify].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotifyId(u64);

/// One-shot callbacks which run when their owner is destroyed.
///
/// An owner calls [DestroyNotify::fire] from its explicit `destroy` and from its `Drop`;
/// only the first call does anything. Dropping the notify itself fires it too.
#[derive(Default)]
pub struct DestroyNotify(Rc<RefCell<NotifyState>>);

#[derive(Clone)]
pub(crate) struct WeakDestroyNotify(Weak<RefCell<NotifyState>>);

#[derive(Default)]
struct NotifyState {
    destroyed: bool,
    next_id: u64,
    // Ids only grow, so key order is registration order
    callbacks: BTreeMap<NotifyId, Box<dyn FnOnce()>>
}

impl DestroyNotify {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` on destruction. Returns `None` if already destroyed, the callback is dropped.
    pub fn add(&self, callback: impl FnOnce() + 'static) -> Option<NotifyId> {
        let mut state = self.0.borrow_mut();
        if state.destroyed {
            return None
        }
        state.next_id += 1;
        let id = NotifyId(state.next_id);
        state.callbacks.insert(id, Box::new(callback));
        Some(id)
    }

    /// Unregister a callback. Returns whether it was still pending.
    pub fn remove(&self, id: NotifyId) -> bool {
        remove_callback(&self.0, id)
    }

    /// Mark destroyed and run every pending callback, in registration order.
    pub fn fire(&self) {
        let callbacks = {
            let mut state = self.0.borrow_mut();
            if state.destroyed {
                return
            }
            state.destroyed = true;
            std::mem::take(&mut state.callbacks)
        };
        log::debug!("lifetime destroyed, running {} teardown callbacks", callbacks.len());
        for (_, callback) in callbacks {
            callback();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.borrow().destroyed
    }

    /// Number of callbacks still waiting for destruction.
    pub fn pending(&self) -> usize {
        self.0.borrow().callbacks.len()
    }

    pub(crate) fn downgrade(&self) -> WeakDestroyNotify {
        WeakDestroyNotify(Rc::downgrade(&self.0))
    }
}

impl WeakDestroyNotify {
    pub(crate) fn remove(&self, id: NotifyId) -> bool {
        match self.0.upgrade() {
            None => false,
            Some(state) => remove_callback(&state, id)
        }
    }
}

fn remove_callback(state: &RefCell<NotifyState>, id: NotifyId) -> bool {
    let removed = state.borrow_mut().callbacks.remove(&id);
    // Dropped outside the borrow, the callback may own something which re-enters
    removed.is_some()
}

impl Drop for DestroyNotify {
    fn drop(&mut self) {
        self.fire();
    }
}

impl Lifetime for DestroyNotify {
    fn destroy_notify(&self) -> &DestroyNotify {
        self
    }
}

impl Debug for DestroyNotify {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("DestroyNotify")
            .field("destroyed", &state.destroyed)
            .field("pending", &state.callbacks.len())
            .finish()
    }
}
