//! Per-emitter table of connected signal handlers.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use crate::emitter::{Handler, HandlerId};
use crate::error::{Error, Result};
use crate::names::split_detail;
use crate::value::Value;

#[derive(Default)]
pub(crate) struct Handlers {
    next_id: Cell<u64>,
    // Ids only grow, so key order is connection order
    entries: RefCell<BTreeMap<HandlerId, Entry>>
}

struct Entry {
    signal: String,
    handler: Handler
}

impl Handlers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connect(&self, signal: &str, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.entries.borrow_mut().insert(id, Entry {
            signal: signal.to_string(),
            handler
        });
        log::trace!("connected handler {} to {}", id.0, signal);
        id
    }

    pub(crate) fn disconnect(&self, id: HandlerId) -> bool {
        let removed = self.entries.borrow_mut().remove(&id);
        // Dropped outside the borrow: the handler may own something whose teardown re-enters us
        match removed {
            None => false,
            Some(entry) => {
                log::trace!("disconnected handler {} from {}", id.0, entry.signal);
                drop(entry);
                true
            }
        }
    }

    pub(crate) fn is_connected(&self, id: HandlerId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    pub(crate) fn clear(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        drop(entries);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Run every handler connected to `signal`, or to its undetailed name.
    ///
    /// Handlers are snapshotted first, so they may connect and disconnect freely.
    /// A handler disconnected by an earlier one in the same wave is skipped.
    /// Every handler runs even if an earlier one fails.
    pub(crate) fn emit(&self, signal: &str, args: &[Value]) -> Result<()> {
        let (name, _) = split_detail(signal);
        let snapshot = self.entries.borrow()
            .iter()
            .filter(|(_, entry)| entry.signal == signal || entry.signal == name)
            .map(|(id, entry)| (*id, Rc::clone(&entry.handler)))
            .collect::<Vec<_>>();
        log::trace!("emitting {} to {} handlers", signal, snapshot.len());

        let mut errors = Vec::new();
        for (id, handler) in snapshot {
            if !self.is_connected(id) {
                continue
            }
            if let Err(error) = handler(args) {
                errors.push(error);
            }
        }
        if errors.len() > 1 {
            log::warn!("{} handlers of {} failed", errors.len(), signal);
        }
        Error::collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(count: &Rc<Cell<u32>>) -> Handler {
        let count = count.clone();
        Rc::new(move |_| {
            count.set(count.get() + 1);
            Ok(())
        })
    }

    #[test]
    fn detail_and_bare_signal_both_fire() {
        let handlers = Handlers::new();
        let detailed = Rc::new(Cell::new(0));
        let bare = Rc::new(Cell::new(0));
        let other = Rc::new(Cell::new(0));
        handlers.connect("notify::label", counter(&detailed));
        handlers.connect("notify", counter(&bare));
        handlers.connect("notify::visible", counter(&other));
        handlers.emit("notify::label", &[]).unwrap();
        assert_eq!((detailed.get(), bare.get(), other.get()), (1, 1, 0));
    }

    #[test]
    fn failing_handler_does_not_stop_siblings() {
        let handlers = Handlers::new();
        let count = Rc::new(Cell::new(0));
        handlers.connect("clicked", Rc::new(|_| Err(Error::InvalidUsage("first".into()))));
        handlers.connect("clicked", counter(&count));
        handlers.connect("clicked", Rc::new(|_| Err(Error::InvalidUsage("third".into()))));
        let result = handlers.emit("clicked", &[]);
        assert_eq!(count.get(), 1);
        assert!(matches!(result, Err(Error::Handlers(errors)) if errors.len() == 2));
    }

    #[test]
    fn disconnected_mid_wave_is_skipped() {
        let handlers = Rc::new(Handlers::new());
        let count = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(None));
        let handlers2 = handlers.clone();
        let second2 = second.clone();
        handlers.connect("clicked", Rc::new(move |_| {
            if let Some(id) = second2.get() {
                handlers2.disconnect(id);
            }
            Ok(())
        }));
        second.set(Some(handlers.connect("clicked", counter(&count))));
        handlers.emit("clicked", &[]).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(handlers.len(), 1);
        // break the Rc cycle through the first handler
        handlers.clear();
    }
}
